//! Client configuration
//!
//! Precedence, lowest to highest: built-in defaults, optional YAML file,
//! environment variables / command-line flags.

use crate::error::{AdvisorError, AdvisorResult};
use crate::state::FileStateStore;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_MAX_CREDITS: u32 = 18;

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub api_url: String,
    pub state_file: PathBuf,
    pub max_credits: u32,
}

/// Optional keys of the YAML config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub state_file: Option<PathBuf>,
    pub max_credits: Option<u32>,
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub state_file: Option<PathBuf>,
    pub max_credits: Option<u32>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_file: FileStateStore::default_path()
                .unwrap_or_else(|_| PathBuf::from(".curricraft").join("state.json")),
            max_credits: DEFAULT_MAX_CREDITS,
        }
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> AdvisorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdvisorError::Validation(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl AdvisorConfig {
    /// Resolve defaults, then the config file (if any), then overrides
    pub fn resolve(config_file: Option<&Path>, overrides: ConfigOverrides) -> AdvisorResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_file {
            config.apply(ConfigFile::load(path)?.into());
        }
        config.apply(overrides);

        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, layer: ConfigOverrides) {
        if let Some(api_url) = layer.api_url {
            self.api_url = api_url;
        }
        if let Some(state_file) = layer.state_file {
            self.state_file = state_file;
        }
        if let Some(max_credits) = layer.max_credits {
            self.max_credits = max_credits;
        }
    }

    pub fn validate(&self) -> AdvisorResult<()> {
        if self.max_credits == 0 {
            return Err(AdvisorError::Validation(
                "max_credits must be greater than zero".to_string(),
            ));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(AdvisorError::Validation(format!(
                "api_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        Ok(())
    }
}

impl From<ConfigFile> for ConfigOverrides {
    fn from(file: ConfigFile) -> Self {
        Self {
            api_url: file.api_url,
            state_file: file.state_file,
            max_credits: file.max_credits,
        }
    }
}
