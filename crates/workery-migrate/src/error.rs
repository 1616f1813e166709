//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
///
/// Every variant is fatal to the running subcommand. Soft misses (an
/// unresolvable audit user, an optional join-table entity) never become a
/// `MigrateError`; they are logged and the row is skipped.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (missing environment variable, bad value, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Legacy database connection or query error
    #[error("Legacy database error: {0}")]
    Source(#[from] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Legacy query did not start within its deadline
    #[error("Query on {table} timed out after {seconds}s")]
    Timeout { table: String, seconds: u64 },

    /// A legacy row could not be scanned into its record type
    #[error("Failed to scan row of {table}: {message}")]
    Scan { table: String, message: String },

    /// A reference that must exist by contract is absent
    #[error("{entity} with legacy ID# {legacy_id} not found")]
    NotFound { entity: String, legacy_id: i64 },

    /// The tenant being migrated has not been imported
    #[error("Tenant with schema name '{schema_name}' not found")]
    TenantNotFound { schema_name: String },

    /// Document store error
    #[error("Document store error: {0}")]
    Target(#[from] mongodb::error::Error),

    /// An update targeted a document that does not exist
    #[error("Document {id} not found in {collection}")]
    MissingDocument { collection: String, id: String },

    /// BSON serialization error
    #[error("BSON serialization error: {0}")]
    Serialize(#[from] bson::ser::Error),

    /// BSON deserialization error
    #[error("BSON deserialization error: {0}")]
    Deserialize(#[from] bson::de::Error),

    /// Object store error with the key involved
    #[error("Object store error for {key}: {message}")]
    ObjectStore { key: String, message: String },

    /// Password hashing error
    #[error("Password hashing error: {0}")]
    Password(String),

    /// IO error (staging directory, CSV export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Scan error
    pub fn scan(table: impl Into<String>, message: impl ToString) -> Self {
        MigrateError::Scan {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Create a NotFound error for a mandatory reference
    pub fn not_found(entity: impl Into<String>, legacy_id: i64) -> Self {
        MigrateError::NotFound {
            entity: entity.into(),
            legacy_id,
        }
    }

    /// Create an ObjectStore error
    pub fn object_store(key: impl Into<String>, message: impl ToString) -> Self {
        MigrateError::ObjectStore {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error.
    ///
    /// - 2: configuration or connection setup
    /// - 3: a mandatory reference was missing
    /// - 1: everything else
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Pool { .. } => 2,
            MigrateError::NotFound { .. } | MigrateError::TenantNotFound { .. } => 3,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_carries_legacy_id() {
        let err = MigrateError::not_found("Order", 100);
        assert_eq!(err.to_string(), "Order with legacy ID# 100 not found");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_tenant_not_found_is_lookup_failure() {
        let err = MigrateError::TenantNotFound {
            schema_name: "london".into(),
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("'london'"));
    }

    #[test]
    fn test_config_exit_code() {
        let err = MigrateError::Config("WORKERY_MIGRATE_MONGODB_URI is required".into());
        assert_eq!(err.exit_code(), 2);
        assert!(err.format_detailed().starts_with("Error: Configuration error"));
    }

    #[test]
    fn test_object_store_exit_code() {
        let err = MigrateError::object_store("media/a.pdf", "access denied");
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("media/a.pdf"));
    }
}
