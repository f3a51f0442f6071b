use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::api::{DEFAULT_API_URL, DEFAULT_USER_AGENT};
use crate::git::{DEFAULT_BRANCH, DEFAULT_REMOTE};
use crate::paths::config_file;

/// Settings loaded from `config.toml`.
///
/// Every key is optional; missing keys keep their defaults.
///
/// Example TOML:
/// ```toml
/// api_url    = "https://github.example.com/api/v3"
/// user_agent = "ghops"
/// remote     = "origin"
/// branch     = "main"
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub user_agent: String,
    pub remote: String,
    pub branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

/// Load `config.toml` from the ghops config directory.
///
/// A missing file yields [`Config::default`].
///
/// # Errors
/// - Returns an error if the config directory cannot be determined.
/// - Returns an error if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_file()?)
}

/// Load configuration from an explicit path. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let txt = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let cfg: Config =
        toml::from_str(&txt).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(cfg)
}
