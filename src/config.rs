//! Configuration parsing and validation for imgrelay.

use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Root configuration structure.
///
/// Every section has defaults, so a missing config file yields a fully
/// working process; the model catalog itself is compiled in and the file
/// only tunes infrastructure around it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Upstream image API configuration.
///
/// The URLs default to the production endpoints; they are overridable so
/// tests can point the catalog at mock servers.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Outbound call budget for relay POSTs, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Budget for catbox uploads, which move whole images.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
    /// User agent presented to the upstream APIs.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_magicstudio_url")]
    pub magicstudio_url: String,
    #[serde(default = "default_creart_url")]
    pub creart_url: String,
    #[serde(default = "default_pollinations_url")]
    pub pollinations_url: String,
    #[serde(default = "default_catbox_url")]
    pub catbox_url: String,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_upload_timeout_secs() -> u64 {
    300
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_magicstudio_url() -> String {
    "https://ai-api.magicstudio.com/api/ai-art-generator".to_string()
}

fn default_creart_url() -> String {
    "https://api.creartai.com/api/v1/text2image".to_string()
}

fn default_pollinations_url() -> String {
    "https://image.pollinations.ai".to_string()
}

fn default_catbox_url() -> String {
    "https://catbox.moe/user/api.php".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
            user_agent: default_user_agent(),
            magicstudio_url: default_magicstudio_url(),
            creart_url: default_creart_url(),
            pollinations_url: default_pollinations_url(),
            catbox_url: default_catbox_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::parse_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::info!(
                path = %path.as_ref().display(),
                "No config file found, using defaults"
            );
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "upstream.timeout_secs must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("magicstudio_url", &self.upstream.magicstudio_url),
            ("creart_url", &self.upstream.creart_url),
            ("pollinations_url", &self.upstream.pollinations_url),
            ("catbox_url", &self.upstream.catbox_url),
        ] {
            let url = Url::parse(value).map_err(|e| {
                ConfigError::Validation(format!("Invalid upstream.{}: {}", name, e))
            })?;
            if url.cannot_be_a_base() {
                return Err(ConfigError::Validation(format!(
                    "Invalid upstream.{}: not a base URL",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
