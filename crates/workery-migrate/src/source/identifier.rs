//! Schema-name validation and quoting for the legacy queries.
//!
//! Schema names come from the environment and are spliced into query text,
//! so they are validated and quoted before use. Every other part of each
//! legacy query is a fixed string.

use crate::error::{MigrateError, Result};

/// PostgreSQL truncates identifiers at 63 bytes.
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validate an identifier for security issues.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a PostgreSQL identifier, doubling embedded double quotes.
pub fn quote_pg(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Qualified `"schema".table` name for a fixed legacy table.
pub fn qualified(schema: &str, table: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_pg(schema)?, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_pg() {
        assert_eq!(quote_pg("london").unwrap(), "\"london\"");
        assert_eq!(quote_pg("lon\"don").unwrap(), "\"lon\"\"don\"");
    }

    #[test]
    fn test_rejects_empty_and_null_byte() {
        assert!(quote_pg("").is_err());
        assert!(quote_pg("a\0b").is_err());
    }

    #[test]
    fn test_rejects_long_identifier() {
        let long = "x".repeat(64);
        assert!(validate_identifier(&long).is_err());
        assert!(validate_identifier(&"x".repeat(63)).is_ok());
    }

    #[test]
    fn test_qualified() {
        assert_eq!(
            qualified("london", "workery_customers").unwrap(),
            "\"london\".workery_customers"
        );
    }
}
