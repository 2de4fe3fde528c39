//! Provider CLI spawning.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ProviderError;

use super::provider::{CliOptions, Provider};

/// Default timeout for provider subprocess execution (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Get the configured timeout for `provider`.
///
/// Reads the provider's timeout environment variable if set, otherwise uses
/// the default of 300 seconds. An unparseable value is logged and ignored.
fn get_timeout(provider: Provider) -> Duration {
    let var = provider.timeout_env_var();
    match env::var(var) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    var, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Check that the provider's CLI is on `PATH`.
///
/// Uses the `which` crate for cross-platform executable detection.
pub fn check_installed(provider: Provider) -> Result<(), ProviderError> {
    which::which(provider.binary())
        .map(|_| ())
        .map_err(|_| ProviderError::NotInstalled(provider))
}

/// Build the command line for one prompt.
///
/// Claude: `claude -p <prompt> --output-format json [--model M]`.
/// Codex: `codex exec [--model M] <prompt>`.
fn build_command(provider: Provider, prompt: &str, options: &CliOptions) -> Command {
    let mut cmd = Command::new(provider.binary());
    match provider {
        Provider::Claude => {
            cmd.arg("-p").arg(prompt).arg("--output-format").arg("json");
            if let Some(model) = &options.model {
                cmd.arg("--model").arg(model);
            }
        }
        Provider::Codex => {
            cmd.arg("exec");
            if let Some(model) = &options.model {
                cmd.arg("--model").arg(model);
            }
            cmd.arg(prompt);
        }
    }
    if let Some(key) = &options.api_key {
        cmd.env(provider.api_key_env_var(), key);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run the provider CLI with a prompt and return its raw stdout.
///
/// Returns `ProviderError::Timeout` if the process outlives the configured
/// timeout.
pub async fn run_cli(
    provider: Provider,
    prompt: &str,
    options: &CliOptions,
) -> Result<String, ProviderError> {
    check_installed(provider)?;

    let timeout_duration = get_timeout(provider);
    let timeout_secs = timeout_duration.as_secs();
    debug!(%provider, prompt_len = prompt.len(), timeout_secs, "spawning provider CLI");

    let output = timeout(timeout_duration, build_command(provider, prompt, options).output())
        .await
        .map_err(|_| ProviderError::Timeout(timeout_secs))?
        .map_err(ProviderError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(ProviderError::NonZeroExit { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
