//! Readers for the shared (public schema) tables: tenants, users, user groups.

use chrono::{DateTime, Utc};
use tokio_postgres::Row;

use crate::error::Result;

use super::common::{link_table, LegacyAddress};
use super::identifier::qualified;
use super::pool::LegacyPool;
use super::row::{FromLegacyRow, RowReader};

/// Row of `workery_franchises`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyTenant {
    pub id: i64,
    pub schema_name: String,
    pub name: Option<String>,
    pub alternate_name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub timezone_name: Option<String>,
    pub address: LegacyAddress,
    pub is_archived: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl FromLegacyRow for LegacyTenant {
    const TABLE: &'static str = "workery_franchises";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            schema_name: r.opt_string("schema_name")?.unwrap_or_default(),
            name: r.opt_string("name")?,
            alternate_name: r.opt_string("alternate_name")?,
            description: r.opt_string("description")?,
            url: r.opt_string("url")?,
            timezone_name: r.opt_string("timezone_name")?,
            address: LegacyAddress::read(&r)?,
            is_archived: r.bool_or_false("is_archived")?,
            created_at: r.opt_timestamp("created_at")?,
            last_modified_at: r.opt_timestamp("last_modified_at")?,
        })
    }
}

/// Franchises without an `is_archived` column are all active.
pub fn tenants_sql(schema: &str, columns: &[String]) -> Result<String> {
    let is_archived = if columns.iter().any(|c| c == "is_archived") {
        "is_archived"
    } else {
        "FALSE AS is_archived"
    };
    Ok(format!(
        "SELECT id, schema_name, name, alternate_name, description, url, timezone_name, \
         address_country, address_region, address_locality, postal_code, street_address, \
         street_address_extra, post_office_box_number, NULL::float8 AS elevation, \
         NULL::float8 AS latitude, NULL::float8 AS longitude, {}, \
         created AS created_at, last_modified AS last_modified_at \
         FROM {} ORDER BY id ASC",
        is_archived,
        qualified(schema, LegacyTenant::TABLE)?
    ))
}

pub async fn read_tenants(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyTenant>> {
    let columns = pool.columns(schema, LegacyTenant::TABLE).await?;
    pool.fetch_all(&tenants_sql(schema, &columns)?).await
}

/// Row of `workery_users`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyUser {
    pub id: i64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub date_joined: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub franchise_id: Option<i64>,
    pub was_email_activated: bool,
    pub timezone: Option<String>,
}

impl FromLegacyRow for LegacyUser {
    const TABLE: &'static str = "workery_users";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            email: r.opt_string("email")?,
            first_name: r.opt_string("first_name")?,
            last_name: r.opt_string("last_name")?,
            is_active: r.bool_or_false("is_active")?,
            date_joined: r.opt_timestamp("date_joined")?,
            last_login: r.opt_timestamp("last_login")?,
            franchise_id: r.opt_i64("franchise_id")?,
            was_email_activated: r.bool_or_false("was_email_activated")?,
            timezone: r.opt_string("timezone")?,
        })
    }
}

pub fn users_sql(schema: &str) -> Result<String> {
    Ok(format!(
        "SELECT id, email, first_name, last_name, is_active, date_joined, last_login, \
         franchise_id, was_email_activated, timezone \
         FROM {} ORDER BY id ASC",
        qualified(schema, LegacyUser::TABLE)?
    ))
}

pub async fn read_users(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyUser>> {
    pool.fetch_all(&users_sql(schema)?).await
}

link_table!(
    /// Row of `workery_users_groups`: owner is the user, member is the group (role).
    LegacyUserGroup,
    "workery_users_groups"
);

pub async fn read_user_groups(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyUserGroup>> {
    let sql = format!(
        "SELECT id, user_id AS owner_id, group_id AS member_id FROM {} ORDER BY id ASC",
        qualified(schema, "workery_users_groups")?
    );
    pool.fetch_all(&sql).await
}
