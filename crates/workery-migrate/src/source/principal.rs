//! Readers for customers, associates, staff and their join tables.

use chrono::{DateTime, NaiveDate, Utc};
use tokio_postgres::Row;

use crate::error::Result;

use super::common::{
    link_table, LegacyAudit, LegacyPerson, ADDRESS_COLUMNS, AUDIT_COLUMNS, PERSON_COLUMNS,
};
use super::identifier::qualified;
use super::pool::LegacyPool;
use super::row::{FromLegacyRow, RowReader};

fn principal_sql(schema: &str, table: &str, extra_columns: &str) -> Result<String> {
    Ok(format!(
        "SELECT id, {}, {}, {}, {} FROM {} ORDER BY id ASC",
        PERSON_COLUMNS,
        ADDRESS_COLUMNS,
        AUDIT_COLUMNS,
        extra_columns,
        qualified(schema, table)?
    ))
}

fn link_sql(schema: &str, table: &str, owner: &str, member: &str) -> Result<String> {
    Ok(format!(
        "SELECT id, {} AS owner_id, {} AS member_id FROM {} ORDER BY id ASC",
        owner,
        member,
        qualified(schema, table)?
    ))
}

/// Row of `workery_customers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyCustomer {
    pub id: i64,
    pub person: LegacyPerson,
    pub type_of: Option<i64>,
    pub organization_name: Option<String>,
    pub is_ok_to_email: bool,
    pub is_ok_to_text: bool,
}

impl FromLegacyRow for LegacyCustomer {
    const TABLE: &'static str = "workery_customers";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            person: LegacyPerson::read(&r)?,
            type_of: r.opt_i64("type_of")?,
            organization_name: r.opt_string("organization_name")?,
            is_ok_to_email: r.bool_or_false("is_ok_to_email")?,
            is_ok_to_text: r.bool_or_false("is_ok_to_text")?,
        })
    }
}

pub fn customers_sql(schema: &str) -> Result<String> {
    principal_sql(
        schema,
        LegacyCustomer::TABLE,
        "type_of, organization_name, is_ok_to_email, is_ok_to_text",
    )
}

pub async fn read_customers(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyCustomer>> {
    pool.fetch_all(&customers_sql(schema)?).await
}

/// Row of `workery_associates`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyAssociate {
    pub id: i64,
    pub person: LegacyPerson,
    pub owner_id: Option<i64>,
    pub hourly_salary_desired: Option<i64>,
    pub service_fee_id: Option<i64>,
    pub wsib_number: Option<String>,
    pub police_check: Option<NaiveDate>,
    pub drivers_license_class: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_telephone: Option<String>,
}

impl FromLegacyRow for LegacyAssociate {
    const TABLE: &'static str = "workery_associates";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            person: LegacyPerson::read(&r)?,
            owner_id: r.opt_i64("owner_id")?,
            hourly_salary_desired: r.opt_i64("hourly_salary_desired")?,
            service_fee_id: r.opt_i64("service_fee_id")?,
            wsib_number: r.opt_string("wsib_number")?,
            police_check: r.opt_date("police_check")?,
            drivers_license_class: r.opt_string("drivers_license_class")?,
            emergency_contact_name: r.opt_string("emergency_contact_name")?,
            emergency_contact_telephone: r.opt_string("emergency_contact_telephone")?,
        })
    }
}

pub fn associates_sql(schema: &str) -> Result<String> {
    principal_sql(
        schema,
        LegacyAssociate::TABLE,
        "owner_id, hourly_salary_desired, service_fee_id, wsib_number, police_check, \
         drivers_license_class, emergency_contact_name, emergency_contact_telephone",
    )
}

pub async fn read_associates(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyAssociate>> {
    pool.fetch_all(&associates_sql(schema)?).await
}

/// Row of `workery_staff`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyStaff {
    pub id: i64,
    pub person: LegacyPerson,
    pub owner_id: Option<i64>,
    pub personal_email: Option<String>,
    pub police_check: Option<NaiveDate>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_telephone: Option<String>,
}

impl FromLegacyRow for LegacyStaff {
    const TABLE: &'static str = "workery_staff";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            person: LegacyPerson::read(&r)?,
            owner_id: r.opt_i64("owner_id")?,
            personal_email: r.opt_string("personal_email")?,
            police_check: r.opt_date("police_check")?,
            emergency_contact_name: r.opt_string("emergency_contact_name")?,
            emergency_contact_telephone: r.opt_string("emergency_contact_telephone")?,
        })
    }
}

pub async fn read_staff(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyStaff>> {
    let sql = principal_sql(
        schema,
        LegacyStaff::TABLE,
        "owner_id, personal_email, police_check, emergency_contact_name, \
         emergency_contact_telephone",
    )?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_customer_comments`: customer owns the comment.
    LegacyCustomerComment,
    "workery_customer_comments"
);

pub async fn read_customer_comments(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyCustomerComment>> {
    let sql = link_sql(schema, "workery_customer_comments", "about_id", "comment_id")?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_customers_tags`.
    LegacyCustomerTag,
    "workery_customers_tags"
);

pub async fn read_customer_tags(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyCustomerTag>> {
    let sql = link_sql(schema, "workery_customers_tags", "customer_id", "tag_id")?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_associate_comments`.
    LegacyAssociateComment,
    "workery_associate_comments"
);

pub async fn read_associate_comments(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyAssociateComment>> {
    let sql = link_sql(schema, "workery_associate_comments", "about_id", "comment_id")?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_associates_tags`.
    LegacyAssociateTag,
    "workery_associates_tags"
);

pub async fn read_associate_tags(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyAssociateTag>> {
    let sql = link_sql(schema, "workery_associates_tags", "associate_id", "tag_id")?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_associates_skill_sets`.
    LegacyAssociateSkillSet,
    "workery_associates_skill_sets"
);

pub async fn read_associate_skill_sets(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyAssociateSkillSet>> {
    let sql = link_sql(schema, "workery_associates_skill_sets", "associate_id", "skillset_id")?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_associates_vehicle_types`.
    LegacyAssociateVehicleType,
    "workery_associates_vehicle_types"
);

pub async fn read_associate_vehicle_types(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyAssociateVehicleType>> {
    let sql = link_sql(
        schema,
        "workery_associates_vehicle_types",
        "associate_id",
        "vehicletype_id",
    )?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_associates_insurance_requirements`.
    LegacyAssociateInsuranceRequirement,
    "workery_associates_insurance_requirements"
);

pub async fn read_associate_insurance_requirements(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyAssociateInsuranceRequirement>> {
    let sql = link_sql(
        schema,
        "workery_associates_insurance_requirements",
        "associate_id",
        "insurancerequirement_id",
    )?;
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_staff_comments`.
    LegacyStaffComment,
    "workery_staff_comments"
);

pub async fn read_staff_comments(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyStaffComment>> {
    let sql = link_sql(schema, "workery_staff_comments", "about_id", "comment_id")?;
    pool.fetch_all(&sql).await
}

/// Row of `workery_away_logs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyAwayLog {
    pub id: i64,
    pub associate_id: Option<i64>,
    pub reason: Option<i64>,
    pub reason_other: Option<String>,
    pub until_further_notice: Option<bool>,
    pub until_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub was_deleted: bool,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyAwayLog {
    const TABLE: &'static str = "workery_away_logs";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            associate_id: r.opt_i64("associate_id")?,
            reason: r.opt_i64("reason")?,
            reason_other: r.opt_string("reason_other")?,
            until_further_notice: r.opt_bool("until_further_notice")?,
            until_date: r.opt_date("until_date")?,
            start_date: r.opt_date("start_date")?,
            was_deleted: r.bool_or_false("was_deleted")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_away_logs(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyAwayLog>> {
    let sql = format!(
        "SELECT id, associate_id, reason, reason_other, until_further_notice, until_date, \
         start_date, was_deleted, created AS created_at, created_by_id, NULL::text AS created_from, \
         last_modified AS last_modified_at, last_modified_by_id, \
         NULL::text AS last_modified_from FROM {} ORDER BY id ASC",
        qualified(schema, LegacyAwayLog::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Associate lifecycle flags joined with the activity of its login user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyAssociateStatus {
    pub id: i64,
    pub state: Option<String>,
    pub is_archived: bool,
    pub owner_is_active: Option<bool>,
    pub owner_last_login: Option<DateTime<Utc>>,
}

impl FromLegacyRow for LegacyAssociateStatus {
    const TABLE: &'static str = "workery_associates";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            state: r.opt_string("state")?,
            is_archived: r.bool_or_false("is_archived")?,
            owner_is_active: r.opt_bool("owner_is_active")?,
            owner_last_login: r.opt_timestamp("owner_last_login")?,
        })
    }
}

pub async fn read_associate_statuses(
    pool: &LegacyPool,
    schema: &str,
    public_schema: &str,
) -> Result<Vec<LegacyAssociateStatus>> {
    let sql = format!(
        "SELECT a.id, a.state, a.is_archived, u.is_active AS owner_is_active, \
         u.last_login AS owner_last_login \
         FROM {} a LEFT JOIN {} u ON u.id = a.owner_id ORDER BY a.id ASC",
        qualified(schema, LegacyAssociateStatus::TABLE)?,
        qualified(public_schema, "workery_users")?
    );
    pool.fetch_all(&sql).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customers_sql_projects_shared_groups() {
        let sql = customers_sql("london").unwrap();
        assert!(sql.starts_with("SELECT id, given_name, last_name, email"));
        assert!(sql.contains("latitude::float8 AS latitude"));
        assert!(sql.contains("created AS created_at"));
        assert!(sql.contains("organization_name"));
        assert!(sql.ends_with("FROM \"london\".workery_customers ORDER BY id ASC"));
    }

    #[test]
    fn test_link_sql_aliases_foreign_keys() {
        let sql = link_sql("london", "workery_customers_tags", "customer_id", "tag_id").unwrap();
        assert_eq!(
            sql,
            "SELECT id, customer_id AS owner_id, tag_id AS member_id \
             FROM \"london\".workery_customers_tags ORDER BY id ASC"
        );
    }

    #[test]
    fn test_associates_sql_includes_service_fee() {
        let sql = associates_sql("london").unwrap();
        assert!(sql.contains("service_fee_id"));
        assert!(sql.contains("hourly_salary_desired"));
    }
}
