//! Reader for `workery_private_file_uploads`, the rows backing attachments.

use tokio_postgres::Row;

use crate::error::Result;

use super::common::{LegacyAudit, AUDIT_AT_COLUMNS};
use super::identifier::qualified;
use super::pool::LegacyPool;
use super::row::{FromLegacyRow, RowReader};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyPrivateFile {
    pub id: i64,
    /// Storage path as recorded by the legacy upload handler.
    pub data_file: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_archived: bool,
    pub customer_id: Option<i64>,
    pub associate_id: Option<i64>,
    pub work_order_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub audit: LegacyAudit,
}

impl LegacyPrivateFile {
    /// Last path segment of `data_file`, or `None` when there is nothing to match on.
    ///
    /// `.` and `..` are rejected: the name is joined onto the staging directory.
    pub fn basename(&self) -> Option<&str> {
        let path = self.data_file.as_deref()?;
        let name = path.rsplit('/').next().unwrap_or(path);
        match name {
            "" | "." | ".." => None,
            _ => Some(name),
        }
    }
}

impl FromLegacyRow for LegacyPrivateFile {
    const TABLE: &'static str = "workery_private_file_uploads";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            data_file: r.opt_string("data_file")?,
            title: r.opt_string("title")?,
            description: r.opt_string("description")?,
            is_archived: r.bool_or_false("is_archived")?,
            customer_id: r.opt_i64("customer_id")?,
            associate_id: r.opt_i64("associate_id")?,
            work_order_id: r.opt_i64("work_order_id")?,
            staff_id: r.opt_i64("staff_id")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_private_files(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyPrivateFile>> {
    let sql = format!(
        "SELECT id, data_file, title, description, is_archived, customer_id, associate_id, \
         work_order_id, staff_id, {} FROM {} ORDER BY id ASC",
        AUDIT_AT_COLUMNS,
        qualified(schema, LegacyPrivateFile::TABLE)?
    );
    pool.fetch_all(&sql).await
}
