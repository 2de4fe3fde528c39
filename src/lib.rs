//! commit-chronicle - turn recent git history into summaries, PR descriptions,
//! and changelogs.
//!
//! # Overview
//!
//! Commits are read with git2 and either rendered through a Markdown
//! template (generic `{{for}}`/`{{if}}` templates or GitHub PR/issue
//! templates) or handed to the Claude / Codex CLI for a written summary.

pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod locale;
pub mod template;

// Re-export commonly used types
pub use config::UserConfig;
pub use error::{ConfigError, GitError, ProviderError, TemplateError};
pub use git::{Commit, CommitType, FileChange, GitAnalyzer};
pub use llm::{LlmError, LlmRouter, Provider, Summarizer};
pub use locale::Locale;
pub use template::{Context, Value, render, render_github_template};
