//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/edgedict/edgedict.toml`
//! 3. Environment variables: `EDGEDICT_*` prefix
//!
//! The API token is not part of the settings. It is passed on the command
//! line and combined with the settings into a [`ClientConfig`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Production Fastly API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.fastly.com";

/// Unified configuration for the edge dictionary tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the configuration API
    pub api_endpoint: String,
    /// Request timeout in seconds (default: transport default)
    pub timeout_secs: Option<u64>,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            user_agent: concat!("edgedict/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api_endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Everything needed to construct an API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub token: String,
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

/// Get the XDG config directory for edgedict.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "edgedict").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("edgedict.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api_endpoint: overlay
                .api_endpoint
                .clone()
                .unwrap_or_else(|| self.api_endpoint.clone()),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
            user_agent: overlay
                .user_agent
                .clone()
                .unwrap_or_else(|| self.user_agent.clone()),
        }
    }

    /// Load settings from defaults, the global config file and the environment.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), None)
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - TOML file to merge over the defaults, if it exists
    /// * `env` - Environment to read `EDGEDICT_*` overrides from (default: process env)
    pub fn load_from(
        config_file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env)?;

        if current.timeout_secs == Some(0) {
            return Err(ApplicationError::Config {
                message: "timeout_secs must be greater than zero".into(),
            });
        }
        Ok(current)
    }

    /// Apply EDGEDICT_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("EDGEDICT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("api_endpoint") {
            settings.api_endpoint = val;
        }
        match config.get::<u64>("timeout_secs") {
            Ok(val) => settings.timeout_secs = Some(val),
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        if let Ok(val) = config.get_string("user_agent") {
            settings.user_agent = val;
        }

        Ok(settings)
    }

    /// Client configuration for `token` using these settings.
    pub fn client_config(&self, token: &str) -> ClientConfig {
        ClientConfig {
            token: token.to_string(),
            endpoint: self.api_endpoint.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
