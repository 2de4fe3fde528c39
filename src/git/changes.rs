//! Per-commit file changes from tree-to-tree diffs.

use git2::{Delta, DiffFindOptions, DiffOptions, Patch, Repository};
use tracing::debug;

use crate::error::GitError;

use super::commits::{ChangeKind, FileChange};

/// Diff text beyond this many characters is dropped.
pub const MAX_DIFF_CHARS: usize = 30_000;

/// Diff `commit` against its first parent, or the empty tree for a root
/// commit, with rename and copy detection.
pub fn file_changes(repo: &Repository, commit: &git2::Commit) -> Result<Vec<FileChange>, GitError> {
    let new_tree = commit.tree().map_err(GitError::ParseCommit)?;
    let old_tree = if commit.parent_count() == 0 {
        None
    } else {
        let parent = commit.parent(0).map_err(GitError::ParseCommit)?;
        Some(parent.tree().map_err(GitError::ParseCommit)?)
    };

    let mut opts = DiffOptions::new();
    opts.ignore_submodules(true);
    let mut diff = repo
        .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    let mut find = DiffFindOptions::new();
    find.renames(true).copies(true);
    diff.find_similar(Some(&mut find))
        .map_err(GitError::DiffFailed)?;

    let mut changes = Vec::with_capacity(diff.deltas().len());
    for (idx, delta) in diff.deltas().enumerate() {
        let Some(kind) = change_kind(delta.status()) else {
            continue;
        };
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (additions, deletions, text) = match Patch::from_diff(&diff, idx)
            .map_err(GitError::DiffFailed)?
        {
            Some(mut patch) => {
                let (_, additions, deletions) =
                    patch.line_stats().map_err(GitError::DiffFailed)?;
                let buf = patch.to_buf().map_err(GitError::DiffFailed)?;
                let text = truncate_chars(&String::from_utf8_lossy(&buf), MAX_DIFF_CHARS);
                (additions, deletions, text)
            }
            None => {
                debug!(path = %path, "no textual patch for delta");
                (0, 0, String::new())
            }
        };

        changes.push(FileChange {
            path,
            kind,
            additions,
            deletions,
            diff: text,
        });
    }

    Ok(changes)
}

fn change_kind(status: Delta) -> Option<ChangeKind> {
    match status {
        Delta::Added | Delta::Untracked => Some(ChangeKind::Added),
        Delta::Deleted => Some(ChangeKind::Deleted),
        Delta::Renamed => Some(ChangeKind::Renamed),
        Delta::Copied => Some(ChangeKind::Copied),
        Delta::Modified | Delta::Typechange => Some(ChangeKind::Modified),
        Delta::Unmodified | Delta::Ignored | Delta::Unreadable | Delta::Conflicted => None,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_change_kind_mapping() {
        assert_eq!(change_kind(Delta::Added), Some(ChangeKind::Added));
        assert_eq!(change_kind(Delta::Renamed), Some(ChangeKind::Renamed));
        assert_eq!(change_kind(Delta::Unmodified), None);
    }
}
