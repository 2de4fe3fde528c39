//! Commit records and conventional commit parsing.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use git2::Repository;
use serde::{Deserialize, Serialize};

use crate::error::GitError;

use super::changes::file_changes;

/// Length of the abbreviated commit id.
pub const SHORT_ID_LEN: usize = 7;

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
}

impl CommitType {
    /// Conventional prefix, e.g. `feat`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Refactor => "refactor",
            Self::Perf => "perf",
            Self::Test => "test",
            Self::Build => "build",
            Self::Ci => "ci",
            Self::Chore => "chore",
        }
    }

    /// Heading used when commits are grouped by type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Feat => "Features",
            Self::Fix => "Bug Fixes",
            Self::Docs => "Documentation",
            Self::Style => "Styling",
            Self::Refactor => "Refactoring",
            Self::Perf => "Performance",
            Self::Test => "Tests",
            Self::Build => "Build",
            Self::Ci => "CI",
            Self::Chore => "Chores",
        }
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" | "feature" => Ok(Self::Feat),
            "fix" | "bugfix" => Ok(Self::Fix),
            "docs" | "doc" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "perf" => Ok(Self::Perf),
            "test" | "tests" => Ok(Self::Test),
            "build" => Ok(Self::Build),
            "ci" => Ok(Self::Ci),
            "chore" => Ok(Self::Chore),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// How a file was touched by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADD",
            Self::Modified => "MODIFY",
            Self::Deleted => "DELETE",
            Self::Renamed => "RENAME",
            Self::Copied => "COPY",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
    pub additions: usize,
    pub deletions: usize,
    /// Unified diff text, possibly truncated.
    pub diff: String,
}

/// A commit with its file-level changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub message: String,
    pub author: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<FileChange>,
    pub is_merge: bool,
}

impl Commit {
    /// Build a record from a git2 commit, diffing against its first parent.
    pub fn from_git2_commit(repo: &Repository, commit: &git2::Commit) -> Result<Self, GitError> {
        let id = commit.id().to_string();
        let seconds = commit.time().seconds();
        let timestamp = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| GitError::InvalidTimestamp {
                hash: id.clone(),
                seconds,
            })?;

        let author = commit.author();
        let is_merge = commit.parent_count() > 1;
        let changes = if is_merge {
            Vec::new()
        } else {
            file_changes(repo, commit)?
        };

        Ok(Self {
            short_id: id.chars().take(SHORT_ID_LEN).collect(),
            id,
            message: commit.message().unwrap_or("").trim_end().to_string(),
            author: author.name().unwrap_or("unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
            timestamp,
            changes,
            is_merge,
        })
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn commit_type(&self) -> Option<CommitType> {
        parse_commit_message(&self.message).0
    }

    pub fn is_breaking(&self) -> bool {
        parse_commit_message(&self.message).2
    }

    pub fn additions(&self) -> usize {
        self.changes.iter().map(|c| c.additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.changes.iter().map(|c| c.deletions).sum()
    }
}

static CONVENTIONAL_RE: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"^(\w+)(?:\(([^)]+)\))?(!)?\s*:\s*").expect("valid regex")
});

/// Parse a conventional commit message.
/// Returns (commit_type, scope, breaking).
pub fn parse_commit_message(message: &str) -> (Option<CommitType>, Option<String>, bool) {
    let first_line = message.lines().next().unwrap_or("");

    // Check for BREAKING CHANGE in footer
    let breaking_in_footer =
        message.contains("BREAKING CHANGE:") || message.contains("BREAKING-CHANGE:");

    if let Some(caps) = CONVENTIONAL_RE.captures(first_line) {
        let type_str = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let scope = caps.get(2).map(|m| m.as_str().to_string());
        let breaking_mark = caps.get(3).is_some();

        let commit_type = type_str.parse::<CommitType>().ok();
        let breaking = breaking_mark || breaking_in_footer;

        return (commit_type, scope, breaking);
    }

    (None, None, breaking_in_footer)
}
