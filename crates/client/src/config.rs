//! Client configuration.
//!
//! Read from a camelCase JSON file:
//!
//! ```json
//! { "apiEndpoint": "https://example.com/api/v4/", "connectTimeoutSecs": 10 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors while loading a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the collector API. A trailing `/` is added when missing.
    pub api_endpoint: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Total time limit per request; unlimited when absent.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Send login and registration payloads gzip-compressed.
    #[serde(default)]
    pub compress_credentials: bool,
}

fn default_user_agent() -> String {
    format!("uploader/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Configuration with defaults for everything but the endpoint.
    pub fn new(api_endpoint: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: None,
            compress_credentials: false,
        }
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), endpoint = %config.api_endpoint, "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("apiEndpoint must not be empty".into()));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "connectTimeoutSecs must be positive".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "requestTimeoutSecs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: ClientConfig =
            serde_json::from_str(r#"{"apiEndpoint":"https://example.com/api"}"#).unwrap();
        assert_eq!(cfg, ClientConfig::new("https://example.com/api"));
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(30));
        assert!(cfg.request_timeout().is_none());
        assert!(cfg.user_agent.starts_with("uploader/"));
    }

    #[test]
    fn camel_case_fields() {
        let cfg: ClientConfig = serde_json::from_str(
            r#"{"apiEndpoint":"https://e/","userAgent":"ua","connectTimeoutSecs":5,
                "requestTimeoutSecs":60,"compressCredentials":true}"#,
        )
        .unwrap();
        assert_eq!(cfg.user_agent, "ua");
        assert_eq!(cfg.connect_timeout_secs, 5);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(60)));
        assert!(cfg.compress_credentials);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        assert!(serde_json::from_str::<ClientConfig>("{}").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"apiEndpoint":"http://localhost:8080/api/v4"}}"#).unwrap();
        let cfg = ClientConfig::load(f.path()).unwrap();
        assert_eq!(cfg.api_endpoint, "http://localhost:8080/api/v4");
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"apiEndpoint":" ","connectTimeoutSecs":1}}"#).unwrap();
        assert!(matches!(
            ClientConfig::load(f.path()),
            Err(ConfigError::Invalid(_))
        ));

        let cfg = ClientConfig {
            connect_timeout_secs: 0,
            ..ClientConfig::new("http://e")
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ClientConfig::load(&dir.path().join("none.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
