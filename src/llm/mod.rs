//! LLM provider routing and prompt construction.

pub mod diff;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod router;
pub mod subprocess;
pub mod summarizer;

pub use prompt::{build_changelog_prompt, build_pr_prompt, build_summary_prompt};
pub use provider::{CliExecutor, CliOptions, Provider, ProviderExecutor};
pub use router::{LlmCompletion, LlmError, LlmProviderError, LlmRouter, ProviderSelection};
pub use summarizer::{LlmSummarizer, Summarizer, pr_document};
