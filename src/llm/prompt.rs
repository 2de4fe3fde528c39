//! Prompt construction for summaries, PR drafts and changelogs.

use std::fmt::Write;

use crate::git::Commit;
use crate::locale::Locale;

use super::diff::{change_summary, condense};

/// Build the prompt asking for a concise summary of `commits`.
pub fn build_summary_prompt(commits: &[Commit], locale: Locale) -> String {
    format!(
        "Please analyze the following git commits and provide a concise summary.
Focus on the main changes, new features, and important fixes.
Format the summary in a clear and structured way.

{}

{}",
        language_instruction(locale),
        format_commits(commits)
    )
}

/// Build the prompt asking for a pull request description.
pub fn build_pr_prompt(commits: &[Commit], title: Option<&str>, locale: Locale) -> String {
    let title_line = title
        .map(|t| format!("PR Title: {}\n", sanitize_for_prompt(t)))
        .unwrap_or_default();

    format!(
        "Please generate a PR description based on the following git commits.
{title_line}
Focus on:
1. Changes made
2. Impact of changes
3. Testing done
4. Additional notes

{}

Commits:
{}",
        language_instruction(locale),
        format_commits(commits)
    )
}

/// Build the prompt asking for a Markdown changelog.
pub fn build_changelog_prompt(commits: &[Commit], group_by_type: bool, locale: Locale) -> String {
    let grouping = if group_by_type {
        "Group the changes by type (feature, bugfix, documentation, refactoring, etc.)"
    } else {
        "List the changes in chronological order"
    };

    format!(
        "Please generate a changelog based on the following git commits.

{}

{grouping}

{}

Format the changelog in Markdown.",
        format_commits(commits),
        language_instruction(locale)
    )
}

fn language_instruction(locale: Locale) -> String {
    format!(
        "IMPORTANT: Please provide the response in {} language.",
        locale.language_name()
    )
}

/// Render commits as plain text blocks separated by blank lines.
pub fn format_commits(commits: &[Commit]) -> String {
    commits
        .iter()
        .map(format_commit)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_commit(commit: &Commit) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Commit: {}", commit.short_id);
    let _ = writeln!(out, "Author: {} ({})", commit.author, commit.email);
    let _ = writeln!(out, "Date: {}", commit.timestamp.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Message: {}", sanitize_for_prompt(&commit.message));

    if !commit.changes.is_empty() {
        out.push_str("Changed files:\n");
        for change in &commit.changes {
            let _ = writeln!(
                out,
                "- {} ({}, +{}, -{})",
                change.path, change.kind, change.additions, change.deletions
            );
            let condensed = condense(&change.diff);
            if !condensed.is_empty() {
                let _ = writeln!(out, "  {}:", change_summary(&change.diff));
                for line in sanitize_for_prompt(&condensed).lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
        }
    }

    out.trim_end().to_string()
}

/// Sanitize commit text before passing it to a model to prevent prompt injection.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("```", "'''")
        .replace("##", "//")
        .lines()
        .take(50)
        .collect::<Vec<_>>()
        .join("\n")
}
