//! Persisted user configuration.
//!
//! Stored as pretty-printed JSON at `~/.commit-chronicle/config.json`, or at
//! the path named by `CHRONICLE_CONFIG`.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::llm::Provider;
use crate::locale::Locale;

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "CHRONICLE_CONFIG";

const CONFIG_DIR: &str = ".commit-chronicle";
const CONFIG_FILE: &str = "config.json";

/// Settings remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Location of the config file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
        .ok_or(ConfigError::NoHomeDirectory)
}

impl UserConfig {
    /// Load the stored config; any failure yields the defaults.
    pub fn load() -> Self {
        let loaded = config_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring stored config: {}", e);
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default location and return the path written.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write atomically to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_failed = |source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        fs::create_dir_all(parent).map_err(write_failed)?;
        let mut temp = NamedTempFile::new_in(parent).map_err(write_failed)?;
        temp.write_all(json.as_bytes()).map_err(write_failed)?;
        temp.write_all(b"\n").map_err(write_failed)?;
        temp.as_file().sync_all().map_err(write_failed)?;
        temp.persist(path).map_err(|e| write_failed(e.error))?;

        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Replace the stored config with the defaults.
    pub fn reset() -> Result<PathBuf, ConfigError> {
        Self::default().save()
    }

    /// Apply `overrides` on top of `self`; only values that are set win.
    pub fn merge(mut self, overrides: UserConfig) -> Self {
        if overrides.provider.is_some() {
            self.provider = overrides.provider;
        }
        if overrides.model.is_some() {
            self.model = overrides.model;
        }
        if overrides.locale.is_some() {
            self.locale = overrides.locale;
        }
        if overrides.api_key.is_some() {
            self.api_key = overrides.api_key;
        }
        self
    }

    pub fn provider_or_default(&self) -> Provider {
        self.provider.unwrap_or_default()
    }

    pub fn locale_or_default(&self) -> Locale {
        self.locale.unwrap_or_default()
    }
}

impl fmt::Display for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not_set = self.locale_or_default().messages().not_set();
        let show = |value: Option<String>| value.unwrap_or_else(|| not_set.to_string());

        writeln!(f, "provider: {}", show(self.provider.map(|p| p.to_string())))?;
        writeln!(f, "model:    {}", show(self.model.clone()))?;
        writeln!(f, "locale:   {}", show(self.locale.map(|l| l.to_string())))?;
        write!(f, "api_key:  {}", show(self.api_key.as_ref().map(|_| "***".to_string())))
    }
}
