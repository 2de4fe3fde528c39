//! Provider selection and fallback orchestration.

use std::fmt;

use tracing::{info, warn};

use crate::error::ProviderError;

use super::provider::{CliExecutor, Provider, ProviderExecutor, generate_with_retry};

/// Primary + fallback selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSelection {
    pub primary: Provider,
    pub fallback: Provider,
}

impl ProviderSelection {
    pub fn from_primary(primary: Provider) -> Self {
        let fallback = match primary {
            Provider::Claude => Provider::Codex,
            Provider::Codex => Provider::Claude,
        };
        Self { primary, fallback }
    }
}

impl Default for ProviderSelection {
    fn default() -> Self {
        ProviderSelection::from_primary(Provider::Claude)
    }
}

/// A provider failure tagged with the provider that produced it.
#[derive(Debug)]
pub struct LlmProviderError {
    pub provider: Provider,
    pub error: ProviderError,
}

impl LlmProviderError {
    pub fn new(provider: Provider, error: ProviderError) -> Self {
        Self { provider, error }
    }

    pub fn summary(&self) -> String {
        let p = self.provider;
        match &self.error {
            ProviderError::NotInstalled(_) => format!("{p} CLI not found"),
            ProviderError::ExecutionFailed(_) => format!("{p} CLI reported an error"),
            ProviderError::SpawnFailed(_) => format!("Failed to start {p} CLI"),
            ProviderError::Timeout(secs) => format!("{p} timed out after {secs}s"),
            ProviderError::NonZeroExit { code, .. } => format!("{p} CLI exited with code {code}"),
            ProviderError::EmptyResponse => format!("{p} returned an empty response"),
            ProviderError::RetriesExhausted(_) => format!("{p} failed after retries"),
        }
    }

    pub fn detail(&self) -> String {
        format!("{}: {}", self.provider, self.error)
    }
}

impl fmt::Display for LlmProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for LlmProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// LLM orchestration error.
#[derive(Debug)]
pub enum LlmError {
    AllProvidersFailed {
        primary: Provider,
        primary_error: LlmProviderError,
        fallback: Provider,
        fallback_error: LlmProviderError,
    },
}

impl LlmError {
    pub fn summary(&self) -> String {
        match self {
            LlmError::AllProvidersFailed {
                primary,
                primary_error,
                fallback,
                fallback_error,
            } => format!(
                "Both LLM providers failed. {} error: {}. {} error: {}.",
                primary,
                primary_error.summary(),
                fallback,
                fallback_error.summary()
            ),
        }
    }

    pub fn detailed(&self) -> String {
        match self {
            LlmError::AllProvidersFailed {
                primary_error,
                fallback_error,
                ..
            } => format!(
                "Both LLM providers failed. {}. {}.",
                primary_error.detail(),
                fallback_error.detail()
            ),
        }
    }

    pub fn primary_error(&self) -> &LlmProviderError {
        match self {
            LlmError::AllProvidersFailed { primary_error, .. } => primary_error,
        }
    }

    pub fn fallback_error(&self) -> &LlmProviderError {
        match self {
            LlmError::AllProvidersFailed { fallback_error, .. } => fallback_error,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for LlmError {}

/// Successful generation with metadata.
#[derive(Debug)]
pub struct LlmCompletion {
    pub output: String,
    pub provider: Provider,
    pub primary_error: Option<LlmProviderError>,
}

/// Provider router with fallback and stickiness.
///
/// When the primary fails and the fallback succeeds, the two swap so later
/// calls go to the provider that last worked.
pub struct LlmRouter<E = CliExecutor> {
    primary: Provider,
    fallback: Provider,
    executor: E,
}

impl LlmRouter<CliExecutor> {
    pub fn new(selection: ProviderSelection, executor: CliExecutor) -> Self {
        Self::with_executor(selection, executor)
    }
}

impl<E: ProviderExecutor> LlmRouter<E> {
    pub fn with_executor(selection: ProviderSelection, executor: E) -> Self {
        Self {
            primary: selection.primary,
            fallback: selection.fallback,
            executor,
        }
    }

    pub fn primary(&self) -> Provider {
        self.primary
    }

    pub fn fallback(&self) -> Provider {
        self.fallback
    }

    pub async fn generate(&mut self, prompt: &str) -> Result<LlmCompletion, LlmError> {
        let primary = self.primary;
        let fallback = self.fallback;

        let primary_error = match generate_with_retry(&self.executor, primary, prompt).await {
            Ok(output) => {
                return Ok(LlmCompletion {
                    output,
                    provider: primary,
                    primary_error: None,
                });
            }
            Err(e) => LlmProviderError::new(primary, e),
        };

        warn!(
            error = %primary_error.detail(),
            "{} failed, falling back to {}", primary, fallback
        );

        match generate_with_retry(&self.executor, fallback, prompt).await {
            Ok(output) => {
                info!("{} succeeded; using it as primary from now on", fallback);
                self.primary = fallback;
                self.fallback = primary;
                Ok(LlmCompletion {
                    output,
                    provider: fallback,
                    primary_error: Some(primary_error),
                })
            }
            Err(e) => Err(LlmError::AllProvidersFailed {
                primary,
                primary_error,
                fallback,
                fallback_error: LlmProviderError::new(fallback, e),
            }),
        }
    }
}
