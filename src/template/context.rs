//! Assemble a render [`Context`] from commit records.
//!
//! Shape of the context:
//!
//! ```text
//! title, date, datetime, group_by_type, has_breaking
//! commits[]  { id, short_id, subject, body, message, author, email, date,
//!              type, scope, breaking, additions, deletions,
//!              files[] { path, kind, additions, deletions } }
//! groups[]   { name, type, commits[] }      (conventional type order, then "Other")
//! authors[]  distinct author names
//! files[]    distinct changed paths
//! stats      { count, authors, files, additions, deletions }
//! ```

use chrono::{Local, NaiveDateTime};
use indexmap::{IndexMap, IndexSet};

use crate::git::{Commit, CommitType, FileChange, parse_commit_message};
use crate::locale::Locale;

use super::value::{Context, Value};

/// Heading of the group holding non-conventional commits.
pub const OTHER_GROUP: &str = "Other";

const TYPE_ORDER: &[CommitType] = &[
    CommitType::Feat,
    CommitType::Fix,
    CommitType::Perf,
    CommitType::Refactor,
    CommitType::Docs,
    CommitType::Test,
    CommitType::Build,
    CommitType::Ci,
    CommitType::Style,
    CommitType::Chore,
];

/// Build the context for `commits` stamped with the current local time.
pub fn build_context(
    commits: &[Commit],
    title: Option<&str>,
    group_by_type: bool,
    locale: Locale,
) -> Context {
    build_context_at(commits, title, group_by_type, locale, Local::now().naive_local())
}

/// Build the context for `commits` stamped with `now`.
pub fn build_context_at(
    commits: &[Commit],
    title: Option<&str>,
    group_by_type: bool,
    locale: Locale,
    now: NaiveDateTime,
) -> Context {
    let title = title
        .map(str::to_string)
        .unwrap_or_else(|| locale.messages().default_pr_title().to_string());

    let authors: IndexSet<&str> = commits.iter().map(|c| c.author.as_str()).collect();
    let files: IndexSet<&str> = commits
        .iter()
        .flat_map(|c| c.changes.iter().map(|f| f.path.as_str()))
        .collect();
    let additions: usize = commits.iter().map(Commit::additions).sum();
    let deletions: usize = commits.iter().map(Commit::deletions).sum();

    let stats = Context::new()
        .with("count", commits.len())
        .with("authors", authors.len())
        .with("files", files.len())
        .with("additions", additions)
        .with("deletions", deletions);

    Context::new()
        .with("title", title)
        .with("date", now.format("%Y-%m-%d").to_string())
        .with("datetime", now.format("%Y-%m-%dT%H:%M:%S").to_string())
        .with("group_by_type", group_by_type)
        .with("has_breaking", commits.iter().any(Commit::is_breaking))
        .with("commits", Value::List(commits.iter().map(commit_value).collect()))
        .with("groups", group_values(commits))
        .with("authors", authors.into_iter().collect::<Vec<_>>())
        .with("files", files.into_iter().collect::<Vec<_>>())
        .with("stats", stats)
}

fn commit_value(commit: &Commit) -> Value {
    let (commit_type, scope, breaking) = parse_commit_message(&commit.message);
    let body = commit
        .message
        .split_once('\n')
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");

    Value::Map(
        Context::new()
            .with("id", commit.id.as_str())
            .with("short_id", commit.short_id.as_str())
            .with("subject", commit.subject())
            .with("body", body)
            .with("message", commit.message.as_str())
            .with("author", commit.author.as_str())
            .with("email", commit.email.as_str())
            .with("date", commit.timestamp.format("%Y-%m-%d").to_string())
            .with("type", commit_type.map(|t| t.as_str()))
            .with("scope", scope)
            .with("breaking", breaking)
            .with("additions", commit.additions())
            .with("deletions", commit.deletions())
            .with("files", Value::List(commit.changes.iter().map(file_value).collect())),
    )
}

fn file_value(change: &FileChange) -> Value {
    Value::Map(
        Context::new()
            .with("path", change.path.as_str())
            .with("kind", change.kind.as_str())
            .with("additions", change.additions)
            .with("deletions", change.deletions),
    )
}

/// Commits bucketed by conventional type; empty groups are omitted.
fn group_values(commits: &[Commit]) -> Value {
    let mut buckets: IndexMap<Option<CommitType>, Vec<Value>> = TYPE_ORDER
        .iter()
        .map(|t| (Some(*t), Vec::new()))
        .chain(std::iter::once((None, Vec::new())))
        .collect();

    for commit in commits {
        if let Some(bucket) = buckets.get_mut(&commit.commit_type()) {
            bucket.push(commit_value(commit));
        }
    }

    Value::List(
        buckets
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(commit_type, items)| {
                let name = commit_type.map_or(OTHER_GROUP, |t| t.label());
                Value::Map(
                    Context::new()
                        .with("name", name)
                        .with("type", commit_type.map(|t| t.as_str()))
                        .with("commits", Value::List(items)),
                )
            })
            .collect(),
    )
}
