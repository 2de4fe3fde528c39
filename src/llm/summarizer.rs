//! High-level document generation over the provider router.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::git::Commit;
use crate::locale::Locale;
use crate::template::render_github_template;

use super::prompt::{build_changelog_prompt, build_pr_prompt, build_summary_prompt};
use super::provider::ProviderExecutor;
use super::router::{LlmError, LlmRouter};

/// Produces prose documents from a set of commits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send {
    async fn summarize(&mut self, commits: &[Commit]) -> Result<String, LlmError>;

    async fn pr_draft(
        &mut self,
        commits: &[Commit],
        title: Option<String>,
    ) -> Result<String, LlmError>;

    async fn changelog(
        &mut self,
        commits: &[Commit],
        group_by_type: bool,
    ) -> Result<String, LlmError>;
}

/// [`Summarizer`] backed by the LLM router.
pub struct LlmSummarizer<E> {
    router: LlmRouter<E>,
    locale: Locale,
}

impl<E: ProviderExecutor> LlmSummarizer<E> {
    pub fn new(router: LlmRouter<E>, locale: Locale) -> Self {
        Self { router, locale }
    }

    async fn complete(&mut self, prompt: String) -> Result<String, LlmError> {
        let completion = self.router.generate(&prompt).await?;
        if let Some(err) = &completion.primary_error {
            info!("Used {} after primary failed: {}", completion.provider, err);
        }
        Ok(completion.output)
    }
}

#[async_trait]
impl<E: ProviderExecutor> Summarizer for LlmSummarizer<E> {
    async fn summarize(&mut self, commits: &[Commit]) -> Result<String, LlmError> {
        let prompt = build_summary_prompt(commits, self.locale);
        self.complete(prompt).await
    }

    async fn pr_draft(
        &mut self,
        commits: &[Commit],
        title: Option<String>,
    ) -> Result<String, LlmError> {
        let prompt = build_pr_prompt(commits, title.as_deref(), self.locale);
        self.complete(prompt).await
    }

    async fn changelog(
        &mut self,
        commits: &[Commit],
        group_by_type: bool,
    ) -> Result<String, LlmError> {
        let prompt = build_changelog_prompt(commits, group_by_type, self.locale);
        self.complete(prompt).await
    }
}

/// Build a PR description: fill `template` when the repository has one,
/// otherwise ask the summarizer for a draft.
pub async fn pr_document<S: Summarizer + ?Sized>(
    summarizer: &mut S,
    commits: &[Commit],
    title: Option<&str>,
    template: Option<&str>,
    locale: Locale,
) -> Result<String, LlmError> {
    match template {
        Some(template) => {
            debug!("filling repository PR template");
            Ok(render_github_template(template, commits, title, locale))
        }
        None => summarizer.pr_draft(commits, title.map(str::to_string)).await,
    }
}
