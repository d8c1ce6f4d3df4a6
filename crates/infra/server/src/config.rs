//! Server configuration.

use multiauth_core::MultiAuthError;
use multiauth_passcode::PasscodeConfig;
use serde::{Deserialize, Serialize};

/// Server-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Log level.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Address to bind, as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured log level.
    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("unknown log level '{}'", self.log_level)))
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Passcode issuing settings.
    pub passcodes: PasscodeConfig,
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    parse_config(&content)
}

/// Parses configuration from TOML text. Missing sections use defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: toml::Value =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    // Parse server config
    let server: ServerConfig = config
        .get("server")
        .map(|v| toml::Value::try_into(v.clone()))
        .transpose()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?
        .unwrap_or_default();

    // Parse passcode config
    let passcodes: PasscodeConfig = config
        .get("passcodes")
        .map(|v| toml::Value::try_into(v.clone()))
        .transpose()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?
        .unwrap_or_default();

    if passcodes.default_duration_ms <= 0 {
        return Err(ConfigError::InvalidValue(
            "passcodes.default_duration_ms must be positive".to_string(),
        ));
    }
    if passcodes.max_length == 0 {
        return Err(ConfigError::InvalidValue(
            "passcodes.max_length must be at least 1".to_string(),
        ));
    }
    server.log_level()?;

    Ok(AppConfig { server, passcodes })
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for MultiAuthError {
    fn from(err: ConfigError) -> Self {
        MultiAuthError::config(err.to_string())
    }
}
