//! Configuration loading and validation.
//!
//! Everything is read from `WORKERY_MIGRATE_*` environment variables through
//! the `config` crate, one prefixed section per connection.

mod types;
mod validation;

pub use types::*;

use crate::error::{MigrateError, Result};
use config::{Environment, Map};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;

/// Prefix shared by every environment variable the tool reads.
pub const ENV_PREFIX: &str = "WORKERY_MIGRATE_";

const DEFAULT_STAGING_DIR: &str = "./static";

/// Variables read directly under [`ENV_PREFIX`].
#[derive(Debug, Default, Deserialize)]
struct Settings {
    staging_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment.
    pub fn from_source(vars: Map<String, String>) -> Result<Self> {
        Self::load(Some(vars))
    }

    /// Object store credential sets are optional as a whole: a set is loaded
    /// when its bucket variable is present and must then be complete.
    fn load(vars: Option<Map<String, String>>) -> Result<Self> {
        let settings: Settings = section("", &vars)?;
        let legacy_objects: ObjectStoreConfig = section("LEGACY_S3", &vars)?;
        let objects: ObjectStoreConfig = section("S3", &vars)?;

        let config = Config {
            source: section("POSTGRES", &vars)?,
            target: section("MONGODB", &vars)?,
            legacy_objects: Some(legacy_objects).filter(|s| !s.bucket.is_empty()),
            objects: Some(objects).filter(|s| !s.bucket.is_empty()),
            staging_dir: settings
                .staging_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR)),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Legacy object store credentials, required by attachment commands.
    pub fn require_legacy_objects(&self) -> Result<&ObjectStoreConfig> {
        self.legacy_objects.as_ref().ok_or_else(|| {
            MigrateError::Config(format!("{}LEGACY_S3_BUCKET_NAME is required", ENV_PREFIX))
        })
    }

    /// New object store credentials, required by the upload phase.
    pub fn require_objects(&self) -> Result<&ObjectStoreConfig> {
        self.objects
            .as_ref()
            .ok_or_else(|| MigrateError::Config(format!("{}S3_BUCKET_NAME is required", ENV_PREFIX)))
    }
}

/// Deserialize the variables under `WORKERY_MIGRATE_<name>_`.
fn section<T: DeserializeOwned>(name: &str, vars: &Option<Map<String, String>>) -> Result<T> {
    let prefix = format!("{}{}", ENV_PREFIX, name);
    config::Config::builder()
        .add_source(
            Environment::with_prefix(prefix.trim_end_matches('_'))
                .ignore_empty(true)
                .source(vars.clone()),
        )
        .build()
        .and_then(|c| c.try_deserialize::<T>())
        .map_err(|e| MigrateError::Config(e.to_string()))
}
