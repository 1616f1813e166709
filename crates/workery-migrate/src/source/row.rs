//! Scanning legacy rows into plain records.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

use crate::error::{MigrateError, Result};

/// A record materialised from one row of a fixed legacy projection.
pub trait FromLegacyRow: Sized {
    /// Legacy table name, used in logs and errors.
    const TABLE: &'static str;

    fn from_row(row: &Row) -> Result<Self>;
}

/// Typed column access that turns driver errors into scan errors.
///
/// Integer columns accept `int2`, `int4` and `int8`; timestamp columns
/// accept both `timestamptz` and `timestamp` (read as UTC).
pub struct RowReader<'a> {
    row: &'a Row,
    table: &'static str,
}

impl<'a> RowReader<'a> {
    pub fn new(row: &'a Row, table: &'static str) -> Self {
        Self { row, table }
    }

    fn get<T: FromSql<'a>>(&self, column: &str) -> Result<T> {
        self.row
            .try_get::<_, T>(column)
            .map_err(|e| MigrateError::scan(self.table, format!("{}: {}", column, e)))
    }

    /// Non-null integer column, typically the primary key.
    pub fn id(&self, column: &str) -> Result<i64> {
        self.opt_i64(column)?
            .ok_or_else(|| MigrateError::scan(self.table, format!("{}: unexpected NULL", column)))
    }

    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>> {
        if let Ok(v) = self.row.try_get::<_, Option<i64>>(column) {
            return Ok(v);
        }
        if let Ok(v) = self.row.try_get::<_, Option<i32>>(column) {
            return Ok(v.map(i64::from));
        }
        self.get::<Option<i16>>(column).map(|v| v.map(i64::from))
    }

    pub fn opt_string(&self, column: &str) -> Result<Option<String>> {
        self.get(column)
    }

    pub fn opt_bool(&self, column: &str) -> Result<Option<bool>> {
        self.get(column)
    }

    pub fn bool_or_false(&self, column: &str) -> Result<bool> {
        Ok(self.opt_bool(column)?.unwrap_or(false))
    }

    /// Projections cast numeric columns to `float8`.
    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>> {
        self.get(column)
    }

    pub fn opt_timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>> {
        if let Ok(v) = self.row.try_get::<_, Option<DateTime<Utc>>>(column) {
            return Ok(v);
        }
        self.get::<Option<NaiveDateTime>>(column)
            .map(|v| v.map(|naive| naive.and_utc()))
    }

    pub fn opt_date(&self, column: &str) -> Result<Option<NaiveDate>> {
        self.get(column)
    }

    /// Column stored as free text in some tables and integer code in others.
    pub fn text_or_code(&self, column: &str) -> Result<Option<TextOrCode>> {
        if let Ok(v) = self.row.try_get::<_, Option<String>>(column) {
            return Ok(v.map(TextOrCode::Text));
        }
        Ok(self.opt_i64(column)?.map(TextOrCode::Code))
    }
}

/// Value of a column whose legacy type differs between tables.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOrCode {
    Text(String),
    Code(i64),
}
