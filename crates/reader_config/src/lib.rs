//! Configuration management for the Reader MCP server
//!
//! Settings come from an optional TOML file, then the environment. The
//! access token is only ever read from the environment.

use reader_common::{ReaderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Token variables, checked in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["READER_ACCESS_TOKEN", "ACCESS_TOKEN"];

/// Overrides `[api] base_url`
pub const BASE_URL_ENV: &str = "READER_API_BASE_URL";

/// Reader API access token. `Debug` never prints the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolved from the environment, never from TOML
    #[serde(skip)]
    pub access_token: AccessToken,

    /// Upstream API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// MCP settings
    #[serde(default)]
    pub mcp: McpConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Upstream API configuration ([api])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Token check endpoint, only used when `verify_token` is on
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub verify_token: bool,
}

fn default_base_url() -> String {
    "https://readwise.io/api/v3".to_string()
}
fn default_auth_url() -> String {
    "https://readwise.io/api/v2/auth/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_url: default_auth_url(),
            timeout_secs: default_timeout_secs(),
            verify_token: false,
        }
    }
}

/// How tool results are rendered back to the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON, failures become JSON-RPC errors
    #[default]
    Json,
    /// Plain-text summary, failures become error text
    Text,
}

impl FromStr for OutputFormat {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            other => Err(ReaderError::ConfigError(format!(
                "Unknown output format '{}', expected 'json' or 'text'",
                other
            ))),
        }
    }
}

/// MCP configuration ([mcp])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default)]
    pub output: OutputFormat,

    #[serde(default = "default_server_name")]
    pub server_name: String,
}

fn default_server_name() -> String {
    "reader-api".to_string()
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            server_name: default_server_name(),
        }
    }
}

/// Logging configuration ([log])
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from an optional TOML file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.api.base_url = url;
        }

        config.access_token = resolve_token(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. The token is never taken from the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReaderError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ReaderError::ConfigError(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ReaderError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("base_url", &self.api.base_url), ("auth_url", &self.api.auth_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ReaderError::ConfigError(format!(
                    "{} must start with http:// or https://",
                    name
                )));
            }
        }
        if self.api.timeout_secs == 0 {
            return Err(ReaderError::ConfigError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout for upstream calls
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

fn resolve_token<F>(lookup: &F) -> Result<AccessToken>
where
    F: Fn(&str) -> Option<String>,
{
    TOKEN_ENV_VARS
        .iter()
        .find_map(|var| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
        .map(AccessToken::new)
        .ok_or_else(|| ReaderError::MissingToken {
            var: TOKEN_ENV_VARS.join(" or "),
        })
}
