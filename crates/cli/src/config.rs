//! CLI configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file, then `FOLIO_*` environment variables (`FOLIO_CLIENT__BASE_URL`,
//! `FOLIO_SESSION_FILE`, ...).

use ::config::{Config, Environment, File};
use anyhow::{Context, Result};
use folio_http::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default API root for local development
const DEFAULT_BASE_URL: &str = "http://localhost:3333";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Where session tokens are persisted (defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,

    /// API client settings
    pub client: ClientConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::new(DEFAULT_BASE_URL),
            session_file: None,
        }
    }
}

impl CliConfig {
    /// Load configuration with defaults, an optional file and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ClientConfig::new(DEFAULT_BASE_URL);

        let mut builder = Config::builder()
            .set_default("client.base_url", defaults.base_url)?
            .set_default("client.environment", defaults.environment.to_string())?
            .set_default("client.timeout_secs", defaults.timeout_secs)?
            .set_default("client.refresh_timeout_secs", defaults.refresh_timeout_secs)?
            .set_default("client.sign_in_path", defaults.sign_in_path)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        } else if let Some(path) = default_config_path().filter(|p| p.exists()) {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("FOLIO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("failed to load configuration")?;

        Ok(settings.try_deserialize()?)
    }

    /// Session file to use, falling back to the platform data directory
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(|| {
            folio_http::client::credentials::FileStorage::default_path()
                .unwrap_or_else(|| PathBuf::from("folio-session.json"))
        })
    }
}

/// `<config dir>/folio/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
}

/// Save configuration to a TOML file
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized or written
pub fn save_config(config: &CliConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Generate a default configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn generate_default_config(path: &Path) -> Result<()> {
    save_config(&CliConfig::default(), path)
}
