//! Client configuration

use super::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Deployment the client talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Explicit configuration handed to [`FolioClient`](super::FolioClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.folio.example`
    pub base_url: String,

    #[serde(default)]
    pub environment: Environment,

    /// Per-request timeout in seconds (0 disables it)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for the token refresh call in seconds (0 disables it)
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,

    /// Where the user is sent when the session cannot be recovered
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_refresh_timeout_secs() -> u64 {
    15
}

fn default_sign_in_path() -> String {
    "/".to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            environment: Environment::default(),
            timeout_secs: default_timeout_secs(),
            refresh_timeout_secs: default_refresh_timeout_secs(),
            sign_in_path: default_sign_in_path(),
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        (self.refresh_timeout_secs > 0).then(|| Duration::from_secs(self.refresh_timeout_secs))
    }

    /// Check the configuration and return the base URL without a trailing slash
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the base URL is empty, not
    /// http(s), or not https in production.
    pub fn validate(&self) -> Result<String, ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        match (url.scheme(), self.environment) {
            ("https", _) | ("http", Environment::Development) => {}
            ("http", Environment::Production) => {
                return Err(ClientError::Configuration(
                    "production requires an https base_url".into(),
                ));
            }
            (scheme, _) => {
                return Err(ClientError::Configuration(format!(
                    "unsupported scheme '{scheme}'"
                )));
            }
        }

        if !self.sign_in_path.starts_with('/') {
            return Err(ClientError::Configuration(
                "sign_in_path must start with '/'".into(),
            ));
        }

        Ok(self.base_url.trim_end_matches('/').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("http://localhost:3000/");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.validate().unwrap(), "http://localhost:3000");
    }

    #[test]
    fn test_production_requires_https() {
        let config =
            ClientConfig::new("http://api.example.com").with_environment(Environment::Production);
        assert!(matches!(config.validate(), Err(ClientError::Configuration(_))));

        let config =
            ClientConfig::new("https://api.example.com").with_environment(Environment::Production);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_and_odd_urls() {
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("ftp://files.example.com").validate().is_err());
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(
            ClientConfig::new("http://localhost")
                .with_sign_in_path("login")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut config = ClientConfig::new("http://localhost");
        config.refresh_timeout_secs = 0;
        assert!(config.refresh_timeout().is_none());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url":"https://api.example.com","environment":"production"}"#,
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.sign_in_path, "/");
        assert_eq!(config.refresh_timeout_secs, 15);
    }
}
