//! # quire-config
//!
//! Layered configuration loading for Quire using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Deployment environment variables (`CF_ACCOUNT_ID`, `R2_ACCESS_KEY`,
//!    `R2_SECRET_KEY`, `R2_BUCKET`, `API_BASE_URL`)
//! 2. Environment variables (`QUIRE_*` prefix, `__` as separator)
//! 3. Project-level `quire.toml`
//! 4. User-level `~/.config/quire/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QUIRE_R2__BUCKET_NAME` -> `r2.bucket_name`,
//! `QUIRE_SYNC__CONCURRENCY` -> `sync.concurrency`, etc. The deployment names
//! used by CI secrets are mapped onto the `r2` section directly.
//!
//! The config is built once by the binary and passed by reference; no other
//! crate reads the environment.
//!
//! # Usage
//!
//! ```no_run
//! use quire_config::QuireConfig;
//!
//! let config = QuireConfig::load_with_dotenv().expect("config");
//! config.validate_for_sync().expect("credentials present");
//! ```

mod content;
mod d1;
mod error;
mod r2;
mod sync;

pub use content::ContentConfig;
pub use d1::D1Config;
pub use error::ConfigError;
pub use r2::R2Config;
pub use sync::SyncConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Deployment variable names and the config keys they fill.
const DEPLOYMENT_ENV: [(&str, &str); 5] = [
    ("CF_ACCOUNT_ID", "r2.account_id"),
    ("R2_ACCESS_KEY", "r2.access_key_id"),
    ("R2_SECRET_KEY", "r2.secret_access_key"),
    ("R2_BUCKET", "r2.bucket_name"),
    ("API_BASE_URL", "r2.api_base_url"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuireConfig {
    #[serde(default)]
    pub r2: R2Config,
    #[serde(default)]
    pub d1: D1Config,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl QuireConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source cannot be parsed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from("quire.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Prefixed environment variables
        figment = figment.merge(Env::prefixed("QUIRE_").split("__"));

        // Layer 4: Deployment secrets (highest priority)
        figment.merge(Self::deployment_env())
    }

    /// Fail fast when anything a sync run needs is missing or malformed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] for the first absent credential
    /// and [`ConfigError::InvalidValue`] for unusable values.
    pub fn validate_for_sync(&self) -> Result<(), ConfigError> {
        if let Some((setting, env)) = self.r2.missing_fields().first() {
            return Err(ConfigError::MissingSetting {
                setting: (*setting).to_string(),
                env: (*env).to_string(),
            });
        }
        self.validate_local()
    }

    /// Validation that does not involve credentials (local runs, schema output).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unusable values.
    pub fn validate_local(&self) -> Result<(), ConfigError> {
        self.content.validate_tables()?;
        for (field, value) in [
            ("sync.concurrency", self.sync.concurrency),
            ("sync.upload_concurrency", self.sync.upload_concurrency),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        for (field, value) in [
            ("sync.remote_timeout_secs", self.sync.remote_timeout_secs),
            ("sync.upload_timeout_secs", self.sync.upload_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1 second".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Copy safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            r2: self.r2.redacted(),
            ..self.clone()
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quire").join("config.toml"))
    }

    fn deployment_env() -> Env {
        let names: Vec<&str> = DEPLOYMENT_ENV.iter().map(|(name, _)| *name).collect();
        Env::raw()
            .only(&names)
            .map(|key| deployment_key(key.as_str()).into())
    }
}

fn deployment_key(env_name: &str) -> String {
    DEPLOYMENT_ENV
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(env_name))
        .map_or_else(|| env_name.to_ascii_lowercase(), |(_, key)| (*key).to_string())
}
