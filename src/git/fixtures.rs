//! In-memory commit builders for unit tests.

use chrono::{TimeZone, Utc};

use super::{ChangeKind, Commit, FileChange};

/// A commit touching `paths`, each with two additions and one deletion.
pub fn commit(message: &str, author: &str, paths: &[&str]) -> Commit {
    let id = format!("{:040x}", fxhash(message));
    Commit {
        short_id: id[..7].to_string(),
        id,
        message: message.to_string(),
        author: author.to_string(),
        email: format!("{}@example.com", author.to_lowercase().replace(' ', ".")),
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        changes: paths
            .iter()
            .map(|path| FileChange {
                path: path.to_string(),
                kind: ChangeKind::Modified,
                additions: 2,
                deletions: 1,
                diff: format!("--- a/{path}\n+++ b/{path}\n-old\n+new\n+more\n"),
            })
            .collect(),
        is_merge: false,
    }
}

fn fxhash(s: &str) -> u128 {
    s.bytes()
        .fold(0xcbf2_9ce4_8422_2325_u128, |h, b| (h ^ u128::from(b)).wrapping_mul(0x100_0000_01b3))
}
