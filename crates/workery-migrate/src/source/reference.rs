//! Readers for the reference tables of the tenant schema.

use tokio_postgres::Row;

use crate::error::Result;

use super::common::{
    audit_projection, link_table, LegacyAudit, AUDIT_AT_COLUMNS, AUDIT_NO_IP_COLUMNS,
};
use super::identifier::qualified;
use super::pool::LegacyPool;
use super::row::{FromLegacyRow, RowReader};

/// Row of `workery_how_hear_about_us_items`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyHowHear {
    pub id: i64,
    pub text: Option<String>,
    pub sort_number: Option<i64>,
    pub is_for_associate: bool,
    pub is_for_customer: bool,
    pub is_for_partner: bool,
    pub is_for_staff: bool,
    pub is_archived: bool,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyHowHear {
    const TABLE: &'static str = "workery_how_hear_about_us_items";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            text: r.opt_string("text")?,
            sort_number: r.opt_i64("sort_number")?,
            is_for_associate: r.bool_or_false("is_for_associate")?,
            is_for_customer: r.bool_or_false("is_for_customer")?,
            is_for_partner: r.bool_or_false("is_for_partner")?,
            is_for_staff: r.bool_or_false("is_for_staff")?,
            is_archived: r.bool_or_false("is_archived")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_how_hear_items(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyHowHear>> {
    let audit = audit_projection(&pool.columns(schema, LegacyHowHear::TABLE).await?);
    let sql = format!(
        "SELECT id, text, sort_number, is_for_associate, is_for_customer, is_for_partner, \
         is_for_staff, is_archived, {} FROM {} ORDER BY id ASC",
        audit,
        qualified(schema, LegacyHowHear::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Row of any of the flat `text` / `description` lookup tables
/// (tags, vehicle types, insurance requirements).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyLookup {
    pub id: i64,
    pub text: Option<String>,
    pub description: Option<String>,
    pub is_archived: bool,
    pub audit: LegacyAudit,
}

impl LegacyLookup {
    fn read(row: &Row, table: &'static str) -> Result<Self> {
        let r = RowReader::new(row, table);
        Ok(Self {
            id: r.id("id")?,
            text: r.opt_string("text")?,
            description: r.opt_string("description")?,
            is_archived: r.bool_or_false("is_archived")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

fn lookup_sql(schema: &str, table: &str, columns: &[String]) -> Result<String> {
    Ok(format!(
        "SELECT id, text, description, is_archived, {} FROM {} ORDER BY id ASC",
        audit_projection(columns),
        qualified(schema, table)?
    ))
}

async fn read_lookup<T: FromLegacyRow>(pool: &LegacyPool, schema: &str) -> Result<Vec<T>> {
    let columns = pool.columns(schema, T::TABLE).await?;
    pool.fetch_all(&lookup_sql(schema, T::TABLE, &columns)?).await
}

/// Row of `workery_tags`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyTag(pub LegacyLookup);

impl FromLegacyRow for LegacyTag {
    const TABLE: &'static str = "workery_tags";

    fn from_row(row: &Row) -> Result<Self> {
        LegacyLookup::read(row, Self::TABLE).map(Self)
    }
}

pub async fn read_tags(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyTag>> {
    read_lookup(pool, schema).await
}

/// Row of `workery_vehicle_types`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyVehicleType(pub LegacyLookup);

impl FromLegacyRow for LegacyVehicleType {
    const TABLE: &'static str = "workery_vehicle_types";

    fn from_row(row: &Row) -> Result<Self> {
        LegacyLookup::read(row, Self::TABLE).map(Self)
    }
}

pub async fn read_vehicle_types(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyVehicleType>> {
    read_lookup(pool, schema).await
}

/// Row of `workery_insurance_requirements`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyInsuranceRequirement(pub LegacyLookup);

impl FromLegacyRow for LegacyInsuranceRequirement {
    const TABLE: &'static str = "workery_insurance_requirements";

    fn from_row(row: &Row) -> Result<Self> {
        LegacyLookup::read(row, Self::TABLE).map(Self)
    }
}

pub async fn read_insurance_requirements(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyInsuranceRequirement>> {
    read_lookup(pool, schema).await
}

/// Row of `workery_skill_sets`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacySkillSet {
    pub id: i64,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub is_archived: bool,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacySkillSet {
    const TABLE: &'static str = "workery_skill_sets";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            category: r.opt_string("category")?,
            sub_category: r.opt_string("sub_category")?,
            description: r.opt_string("description")?,
            is_archived: r.bool_or_false("is_archived")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_skill_sets(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacySkillSet>> {
    let audit = audit_projection(&pool.columns(schema, LegacySkillSet::TABLE).await?);
    let sql = format!(
        "SELECT id, category, sub_category, description, is_archived, {} FROM {} ORDER BY id ASC",
        audit,
        qualified(schema, LegacySkillSet::TABLE)?
    );
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_skill_sets_insurance_requirements`: skill set owns the requirement.
    LegacySkillSetInsuranceRequirement,
    "workery_skill_sets_insurance_requirements"
);

pub async fn read_skill_set_insurance_requirements(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacySkillSetInsuranceRequirement>> {
    let sql = format!(
        "SELECT id, skillset_id AS owner_id, insurancerequirement_id AS member_id \
         FROM {} ORDER BY id ASC",
        qualified(schema, "workery_skill_sets_insurance_requirements")?
    );
    pool.fetch_all(&sql).await
}

/// Row of `workery_work_order_service_fees`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyServiceFee {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub percentage: Option<f64>,
    pub is_archived: bool,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyServiceFee {
    const TABLE: &'static str = "workery_work_order_service_fees";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            title: r.opt_string("title")?,
            description: r.opt_string("description")?,
            percentage: r.opt_f64("percentage")?,
            is_archived: r.bool_or_false("is_archived")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_service_fees(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyServiceFee>> {
    let sql = format!(
        "SELECT id, title, description, percentage::float8 AS percentage, is_archived, {} \
         FROM {} ORDER BY id ASC",
        AUDIT_NO_IP_COLUMNS,
        qualified(schema, LegacyServiceFee::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Row of `workery_bulletin_board_items`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyBulletin {
    pub id: i64,
    pub text: Option<String>,
    pub is_archived: bool,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyBulletin {
    const TABLE: &'static str = "workery_bulletin_board_items";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            text: r.opt_string("text")?,
            is_archived: r.bool_or_false("is_archived")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_bulletins(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyBulletin>> {
    let sql = format!(
        "SELECT id, text, is_archived, {} FROM {} ORDER BY id ASC",
        AUDIT_AT_COLUMNS,
        qualified(schema, LegacyBulletin::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Row of `workery_comments`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyComment {
    pub id: i64,
    pub text: Option<String>,
    pub is_archived: bool,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyComment {
    const TABLE: &'static str = "workery_comments";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            text: r.opt_string("text")?,
            is_archived: r.bool_or_false("is_archived")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_comments(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyComment>> {
    let sql = format!(
        "SELECT id, text, is_archived, {} FROM {} ORDER BY id ASC",
        AUDIT_AT_COLUMNS,
        qualified(schema, LegacyComment::TABLE)?
    );
    pool.fetch_all(&sql).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_sql() {
        let columns = vec!["id".to_string(), "text".to_string()];
        let sql = lookup_sql("london", LegacyTag::TABLE, &columns).unwrap();
        assert!(sql.starts_with(
            "SELECT id, text, description, is_archived, NULL::timestamptz AS created_at"
        ));
        assert!(sql.ends_with("FROM \"london\".workery_tags ORDER BY id ASC"));
    }

    #[test]
    fn test_lookup_sql_projects_audit_columns() {
        let columns: Vec<String> = [
            "id",
            "created",
            "created_by_id",
            "last_modified",
            "last_modified_by_id",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        let sql = lookup_sql("london", LegacyVehicleType::TABLE, &columns).unwrap();
        assert!(sql.contains("created AS created_at, created_by_id,"));
        assert!(sql.contains("last_modified AS last_modified_at, last_modified_by_id,"));
    }
}
