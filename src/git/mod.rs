//! Git operations using git2-rs.

pub mod analyzer;
pub mod changes;
pub mod commits;
pub mod range;

#[cfg(test)]
pub(crate) mod fixtures;

pub use analyzer::GitAnalyzer;
pub use changes::MAX_DIFF_CHARS;
pub use commits::{ChangeKind, Commit, CommitType, FileChange, parse_commit_message};
pub use range::{CommitRange, resolve_range, resolve_reference};
