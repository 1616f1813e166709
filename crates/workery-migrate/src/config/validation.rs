//! Configuration validation.

use super::{Config, ObjectStoreConfig, ENV_PREFIX};
use crate::error::{MigrateError, Result};
use crate::source::identifier::validate_identifier;
use crate::source::tls::SslMode;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    let source = &config.source;
    required(&source.host, "POSTGRES_HOST")?;
    if source.port == 0 {
        return Err(missing("POSTGRES_PORT"));
    }
    required(&source.database, "POSTGRES_DATABASE_NAME")?;
    required(&source.user, "POSTGRES_USER")?;
    required(&source.password, "POSTGRES_PASSWORD")?;
    required(&source.public_schema, "POSTGRES_PUBLIC_SCHEMA_NAME")?;
    required(&source.london_schema, "POSTGRES_LONDON_SCHEMA_NAME")?;
    SslMode::parse(&config.source.ssl_mode)?;
    validate_identifier(&config.source.public_schema)?;
    validate_identifier(&config.source.london_schema)?;

    // Target validation
    required(&config.target.uri, "MONGODB_URI")?;
    required(&config.target.database, "MONGODB_DATABASE_NAME")?;
    if !config.target.uri.starts_with("mongodb://") && !config.target.uri.starts_with("mongodb+srv://")
    {
        return Err(MigrateError::Config(
            "target.uri must start with mongodb:// or mongodb+srv://".into(),
        ));
    }

    if let Some(store) = &config.legacy_objects {
        complete(store, "LEGACY_S3_")?;
    }
    if let Some(store) = &config.objects {
        complete(store, "S3_")?;
    }

    // The two object stores must not be the same bucket
    if let (Some(legacy), Some(new)) = (&config.legacy_objects, &config.objects) {
        if legacy.endpoint == new.endpoint && legacy.bucket == new.bucket {
            return Err(MigrateError::Config(
                "legacy and new object stores cannot be the same bucket".into(),
            ));
        }
    }

    Ok(())
}

fn missing(name: &str) -> MigrateError {
    MigrateError::Config(format!("{}{} is required", ENV_PREFIX, name))
}

fn required(value: &str, name: &str) -> Result<()> {
    if value.is_empty() {
        return Err(missing(name));
    }
    Ok(())
}

/// A credential set with a bucket must carry every other credential too.
fn complete(store: &ObjectStoreConfig, prefix: &str) -> Result<()> {
    required(&store.endpoint, &format!("{}ENDPOINT", prefix))?;
    required(&store.region, &format!("{}REGION", prefix))?;
    required(&store.access_key, &format!("{}ACCESS_KEY", prefix))?;
    required(&store.secret_key, &format!("{}SECRET_KEY", prefix))?;
    required(&store.bucket, &format!("{}BUCKET_NAME", prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ObjectStoreConfig, SourceConfig, TargetConfig};
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config {
            source: SourceConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "workery_legacy".to_string(),
                user: "workery".to_string(),
                password: "password".to_string(),
                ssl_mode: "disable".to_string(),
                public_schema: "public".to_string(),
                london_schema: "london".to_string(),
            },
            target: TargetConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "workery".to_string(),
            },
            legacy_objects: None,
            objects: None,
            staging_dir: PathBuf::from("./static"),
        }
    }

    fn bucket(name: &str) -> ObjectStoreConfig {
        ObjectStoreConfig {
            endpoint: "https://nyc3.example.com".to_string(),
            region: "nyc3".to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            bucket: name.to_string(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_values_name_the_variable() {
        let mut config = valid_config();
        config.source.port = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("WORKERY_MIGRATE_POSTGRES_PORT"));

        let mut config = valid_config();
        config.target.database = String::new();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("WORKERY_MIGRATE_MONGODB_DATABASE_NAME"));
    }

    #[test]
    fn test_incomplete_object_store() {
        let mut config = valid_config();
        let mut store = bucket("workery-v2");
        store.secret_key = String::new();
        config.objects = Some(store);
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("WORKERY_MIGRATE_S3_SECRET_KEY"));
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let mut config = valid_config();
        config.source.ssl_mode = "sometimes".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_wrong_target_scheme() {
        let mut config = valid_config();
        config.target.uri = "postgres://localhost".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_schema_with_null_byte() {
        let mut config = valid_config();
        config.source.london_schema = "lon\0don".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_same_bucket_rejected() {
        let mut config = valid_config();
        config.legacy_objects = Some(bucket("workery"));
        config.objects = Some(bucket("workery"));
        assert!(validate(&config).is_err());

        config.objects = Some(bucket("workery-v2"));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_source_config_debug_redacts_password() {
        let mut config = valid_config();
        config.source.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.source);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password_123"));
    }

    #[test]
    fn test_object_store_debug_redacts_secret() {
        let mut store = bucket("workery");
        store.secret_key = "super_secret_key_456".to_string();
        let debug_output = format!("{:?}", store);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key_456"));
    }
}
