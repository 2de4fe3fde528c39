//! Provider identity, the executor seam, and response unwrapping.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

use super::retry::retry_with_backoff;
use super::subprocess::run_cli;

/// Supported LLM providers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Claude,
    Codex,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::Codex => "Codex",
        }
    }

    /// Executable name on `PATH`.
    pub fn binary(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::Codex => "codex",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            Provider::Claude => "npm install -g @anthropic-ai/claude-code",
            Provider::Codex => "npm install -g @openai/codex",
        }
    }

    pub fn timeout_env_var(&self) -> &'static str {
        match self {
            Provider::Claude => "CHRONICLE_CLAUDE_TIMEOUT",
            Provider::Codex => "CHRONICLE_CODEX_TIMEOUT",
        }
    }

    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::Codex => "CODEX_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" => Ok(Provider::Claude),
            "codex" => Ok(Provider::Codex),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Options forwarded to every provider CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Trait for executing a prompt against a provider.
///
/// This abstraction allows mocking the provider subprocesses in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderExecutor: Send + Sync {
    /// Run the prompt once and return the provider's raw output.
    async fn run(&self, provider: Provider, prompt: &str) -> Result<String, ProviderError>;
}

/// Executor that calls the real provider CLIs.
#[derive(Debug, Clone, Default)]
pub struct CliExecutor {
    options: CliOptions,
}

impl CliExecutor {
    pub fn new(options: CliOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ProviderExecutor for CliExecutor {
    async fn run(&self, provider: Provider, prompt: &str) -> Result<String, ProviderError> {
        run_cli(provider, prompt, &self.options).await
    }
}

/// Generate a text response with retry logic.
///
/// Makes up to 3 attempts with exponential backoff. Each attempt runs the
/// executor and unwraps the provider's output into plain text.
pub async fn generate_with_retry<E: ProviderExecutor + ?Sized>(
    executor: &E,
    provider: Provider,
    prompt: &str,
) -> Result<String, ProviderError> {
    retry_with_backoff(
        || async {
            let raw = executor.run(provider, prompt).await?;
            parse_response(provider, &raw)
        },
        |e| ProviderError::RetriesExhausted(Box::new(e)),
    )
    .await
}

/// Claude CLI JSON envelope when using --output-format json
#[derive(Deserialize)]
struct ClaudeCliResponse {
    result: String,
    #[serde(default)]
    is_error: bool,
}

/// Turn raw CLI output into the generated text.
///
/// Claude's JSON envelope is unwrapped when present; anything else is taken
/// as the text itself.
pub fn parse_response(provider: Provider, raw: &str) -> Result<String, ProviderError> {
    let text = match provider {
        Provider::Claude => match serde_json::from_str::<ClaudeCliResponse>(raw) {
            Ok(envelope) if envelope.is_error => {
                return Err(ProviderError::ExecutionFailed(envelope.result));
            }
            Ok(envelope) => envelope.result,
            Err(_) => raw.to_string(),
        },
        Provider::Codex => raw.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Claude".parse::<Provider>(), Ok(Provider::Claude));
        assert_eq!("codex".parse::<Provider>(), Ok(Provider::Codex));
        assert!("gpt".parse::<Provider>().is_err());
    }

    #[test]
    fn test_parse_claude_envelope() {
        let raw = r#"{"type":"result","is_error":false,"result":"  ## Summary\nAll good  "}"#;
        assert_eq!(
            parse_response(Provider::Claude, raw).unwrap(),
            "## Summary\nAll good"
        );
    }

    #[test]
    fn test_parse_claude_envelope_error() {
        let raw = r#"{"is_error":true,"result":"credit balance too low"}"#;
        let err = parse_response(Provider::Claude, raw).unwrap_err();
        assert!(matches!(err, ProviderError::ExecutionFailed(msg) if msg.contains("credit")));
    }

    #[test]
    fn test_parse_claude_plain_text_fallback() {
        assert_eq!(parse_response(Provider::Claude, "plain").unwrap(), "plain");
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(matches!(
            parse_response(Provider::Codex, "  \n"),
            Err(ProviderError::EmptyResponse)
        ));
        assert!(matches!(
            parse_response(Provider::Claude, r#"{"result":""}"#),
            Err(ProviderError::EmptyResponse)
        ));
    }

    // ============================================
    // Retry Behavior Tests (using mocked executor)
    // ============================================

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_preserves_last_error() {
        let mut mock = MockProviderExecutor::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        mock.expect_run().times(3).returning(move |_, _| {
            match calls_clone.fetch_add(1, Ordering::SeqCst) {
                0 => Err(ProviderError::Timeout(30)),
                1 => Err(ProviderError::NonZeroExit {
                    code: 1,
                    stderr: "error".to_string(),
                }),
                _ => Err(ProviderError::ExecutionFailed("final error".to_string())),
            }
        });

        let result = generate_with_retry(&mock, Provider::Codex, "prompt").await;
        match result {
            Err(ProviderError::RetriesExhausted(inner)) => {
                assert!(matches!(*inner, ProviderError::ExecutionFailed(_)));
            }
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_output_is_retried() {
        let mut mock = MockProviderExecutor::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        mock.expect_run().times(2).returning(move |_, _| {
            if calls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(String::new())
            } else {
                Ok("summary text".to_string())
            }
        });

        let result = generate_with_retry(&mock, Provider::Codex, "prompt").await;
        assert_eq!(result.unwrap(), "summary text");
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_unwraps_envelope() {
        let mut mock = MockProviderExecutor::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _| Ok(r#"{"result":"done","is_error":false}"#.to_string()));

        let result = generate_with_retry(&mock, Provider::Claude, "prompt").await;
        assert_eq!(result.unwrap(), "done");
    }
}
