//! Readers for work orders, their join tables, task items and activity sheets.

use chrono::NaiveDate;
use tokio_postgres::Row;

use crate::error::Result;

use super::common::{
    link_table, LegacyAudit, AUDIT_AT_COLUMNS, AUDIT_COLUMNS, AUDIT_NO_IP_COLUMNS,
};
use super::identifier::qualified;
use super::pool::LegacyPool;
use super::row::{FromLegacyRow, RowReader};

/// Row of `workery_work_orders`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyOrder {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub associate_id: Option<i64>,
    pub description: Option<String>,
    pub assignment_date: Option<NaiveDate>,
    pub is_ongoing: bool,
    pub is_home_support_service: bool,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub hours: Option<f64>,
    pub type_of: Option<i64>,
    pub closing_reason: Option<i64>,
    pub closing_reason_other: Option<String>,
    pub state: Option<String>,
    pub visits: Option<i64>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_quote_amount: Option<f64>,
    pub invoice_labour_amount: Option<f64>,
    pub invoice_material_amount: Option<f64>,
    pub invoice_tax_amount: Option<f64>,
    pub invoice_total_amount: Option<f64>,
    pub invoice_service_fee_amount: Option<f64>,
    pub invoice_service_fee_payment_date: Option<NaiveDate>,
    pub invoice_actual_service_fee_amount_paid: Option<f64>,
    pub invoice_balance_owing_amount: Option<f64>,
    pub invoice_service_fee_id: Option<i64>,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyOrder {
    const TABLE: &'static str = "workery_work_orders";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            customer_id: r.opt_i64("customer_id")?,
            associate_id: r.opt_i64("associate_id")?,
            description: r.opt_string("description")?,
            assignment_date: r.opt_date("assignment_date")?,
            is_ongoing: r.bool_or_false("is_ongoing")?,
            is_home_support_service: r.bool_or_false("is_home_support_service")?,
            start_date: r.opt_date("start_date")?,
            completion_date: r.opt_date("completion_date")?,
            hours: r.opt_f64("hours")?,
            type_of: r.opt_i64("type_of")?,
            closing_reason: r.opt_i64("closing_reason")?,
            closing_reason_other: r.opt_string("closing_reason_other")?,
            state: r.opt_string("state")?,
            visits: r.opt_i64("visits")?,
            invoice_date: r.opt_date("invoice_date")?,
            invoice_quote_amount: r.opt_f64("invoice_quote_amount")?,
            invoice_labour_amount: r.opt_f64("invoice_labour_amount")?,
            invoice_material_amount: r.opt_f64("invoice_material_amount")?,
            invoice_tax_amount: r.opt_f64("invoice_tax_amount")?,
            invoice_total_amount: r.opt_f64("invoice_total_amount")?,
            invoice_service_fee_amount: r.opt_f64("invoice_service_fee_amount")?,
            invoice_service_fee_payment_date: r.opt_date("invoice_service_fee_payment_date")?,
            invoice_actual_service_fee_amount_paid: r
                .opt_f64("invoice_actual_service_fee_amount_paid")?,
            invoice_balance_owing_amount: r.opt_f64("invoice_balance_owing_amount")?,
            invoice_service_fee_id: r.opt_i64("invoice_service_fee_id")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub fn orders_sql(schema: &str) -> Result<String> {
    Ok(format!(
        "SELECT id, customer_id, associate_id, description, assignment_date, is_ongoing, \
         is_home_support_service, start_date, completion_date, hours::float8 AS hours, type_of, \
         closing_reason, closing_reason_other, state, visits, invoice_date, \
         invoice_quote_amount::float8 AS invoice_quote_amount, \
         invoice_labour_amount::float8 AS invoice_labour_amount, \
         invoice_material_amount::float8 AS invoice_material_amount, \
         invoice_tax_amount::float8 AS invoice_tax_amount, \
         invoice_total_amount::float8 AS invoice_total_amount, \
         invoice_service_fee_amount::float8 AS invoice_service_fee_amount, \
         invoice_service_fee_payment_date, \
         invoice_actual_service_fee_amount_paid::float8 AS invoice_actual_service_fee_amount_paid, \
         invoice_balance_owing_amount::float8 AS invoice_balance_owing_amount, \
         invoice_service_fee_id, {} FROM {} ORDER BY id ASC",
        AUDIT_COLUMNS,
        qualified(schema, LegacyOrder::TABLE)?
    ))
}

pub async fn read_orders(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyOrder>> {
    pool.fetch_all(&orders_sql(schema)?).await
}

link_table!(
    /// Row of `workery_work_order_comments`.
    LegacyOrderComment,
    "workery_work_order_comments"
);

pub async fn read_order_comments(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyOrderComment>> {
    let sql = format!(
        "SELECT id, about_id AS owner_id, comment_id AS member_id FROM {} ORDER BY id ASC",
        qualified(schema, LegacyOrderComment::TABLE)?
    );
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_work_orders_tags`.
    LegacyOrderTag,
    "workery_work_orders_tags"
);

pub async fn read_order_tags(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyOrderTag>> {
    let sql = format!(
        "SELECT id, workorder_id AS owner_id, tag_id AS member_id FROM {} ORDER BY id ASC",
        qualified(schema, LegacyOrderTag::TABLE)?
    );
    pool.fetch_all(&sql).await
}

link_table!(
    /// Row of `workery_work_orders_skill_sets`.
    LegacyOrderSkillSet,
    "workery_work_orders_skill_sets"
);

pub async fn read_order_skill_sets(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyOrderSkillSet>> {
    let sql = format!(
        "SELECT id, workorder_id AS owner_id, skillset_id AS member_id FROM {} ORDER BY id ASC",
        qualified(schema, LegacyOrderSkillSet::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Row of `workery_work_order_invoices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyOrderInvoice {
    pub id: i64,
    pub order_id: Option<i64>,
    pub invoice_id: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub associate_name: Option<String>,
    pub associate_telephone: Option<String>,
    pub client_name: Option<String>,
    pub client_address: Option<String>,
    pub client_telephone: Option<String>,
    pub client_email: Option<String>,
    pub sub_total_amount: Option<f64>,
    pub tax_amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub deposit_amount: Option<f64>,
    pub amount_due: Option<f64>,
    pub payment_amount: Option<f64>,
    pub payment_date: Option<NaiveDate>,
    pub is_cash: bool,
    pub is_cheque: bool,
    pub is_debit: bool,
    pub is_credit: bool,
    pub is_other: bool,
    pub client_signature: Option<String>,
    pub associate_sign_date: Option<NaiveDate>,
    pub associate_signature: Option<String>,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyOrderInvoice {
    const TABLE: &'static str = "workery_work_order_invoices";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            order_id: r.opt_i64("order_id")?,
            invoice_id: r.opt_string("invoice_id")?,
            invoice_date: r.opt_date("invoice_date")?,
            associate_name: r.opt_string("associate_name")?,
            associate_telephone: r.opt_string("associate_telephone")?,
            client_name: r.opt_string("client_name")?,
            client_address: r.opt_string("client_address")?,
            client_telephone: r.opt_string("client_telephone")?,
            client_email: r.opt_string("client_email")?,
            sub_total_amount: r.opt_f64("sub_total")?,
            tax_amount: r.opt_f64("tax")?,
            total_amount: r.opt_f64("total")?,
            deposit_amount: r.opt_f64("deposit")?,
            amount_due: r.opt_f64("amount_due")?,
            payment_amount: r.opt_f64("payment_amount")?,
            payment_date: r.opt_date("payment_date")?,
            is_cash: r.bool_or_false("is_cash")?,
            is_cheque: r.bool_or_false("is_cheque")?,
            is_debit: r.bool_or_false("is_debit")?,
            is_credit: r.bool_or_false("is_credit")?,
            is_other: r.bool_or_false("is_other")?,
            client_signature: r.opt_string("client_signature")?,
            associate_sign_date: r.opt_date("associate_sign_date")?,
            associate_signature: r.opt_string("associate_signature")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_order_invoices(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyOrderInvoice>> {
    let sql = format!(
        "SELECT id, order_id, invoice_id, invoice_date, associate_name, associate_telephone, \
         client_name, client_address, client_telephone, client_email, \
         sub_total::float8 AS sub_total, tax::float8 AS tax, total::float8 AS total, \
         deposit::float8 AS deposit, amount_due::float8 AS amount_due, \
         payment_amount::float8 AS payment_amount, payment_date, \
         is_cash, is_cheque, is_debit, is_credit, is_other, \
         client_signature, associate_sign_date, associate_signature, {} \
         FROM {} ORDER BY id ASC",
        AUDIT_AT_COLUMNS,
        qualified(schema, LegacyOrderInvoice::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Row of `workery_work_order_deposits`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyOrderDeposit {
    pub id: i64,
    pub order_id: Option<i64>,
    pub paid_at: Option<NaiveDate>,
    pub deposit_method: Option<i64>,
    pub paid_to: Option<i64>,
    pub paid_for: Option<i64>,
    pub amount: Option<f64>,
    pub is_archived: bool,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyOrderDeposit {
    const TABLE: &'static str = "workery_work_order_deposits";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            order_id: r.opt_i64("order_id")?,
            paid_at: r.opt_date("paid_at")?,
            deposit_method: r.opt_i64("deposit_method")?,
            paid_to: r.opt_i64("paid_to")?,
            paid_for: r.opt_i64("paid_for")?,
            amount: r.opt_f64("amount")?,
            is_archived: r.bool_or_false("is_archived")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_order_deposits(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyOrderDeposit>> {
    let sql = format!(
        "SELECT id, order_id, paid_at, deposit_method, paid_to, paid_for, \
         amount::float8 AS amount, is_archived, {} FROM {} ORDER BY id ASC",
        AUDIT_AT_COLUMNS,
        qualified(schema, LegacyOrderDeposit::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Row of `workery_task_items`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyTaskItem {
    pub id: i64,
    pub job_id: Option<i64>,
    pub type_of: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_closed: bool,
    pub was_postponed: bool,
    pub closing_reason: Option<i64>,
    pub closing_reason_other: Option<String>,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyTaskItem {
    const TABLE: &'static str = "workery_task_items";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            job_id: r.opt_i64("job_id")?,
            type_of: r.opt_i64("type_of")?,
            title: r.opt_string("title")?,
            description: r.opt_string("description")?,
            due_date: r.opt_date("due_date")?,
            is_closed: r.bool_or_false("is_closed")?,
            was_postponed: r.bool_or_false("was_postponed")?,
            closing_reason: r.opt_i64("closing_reason")?,
            closing_reason_other: r.opt_string("closing_reason_other")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_task_items(pool: &LegacyPool, schema: &str) -> Result<Vec<LegacyTaskItem>> {
    let sql = format!(
        "SELECT id, job_id, type_of, title, description, due_date, is_closed, was_postponed, \
         closing_reason, closing_reason_other, {} FROM {} ORDER BY id ASC",
        AUDIT_NO_IP_COLUMNS,
        qualified(schema, LegacyTaskItem::TABLE)?
    );
    pool.fetch_all(&sql).await
}

/// Row of `workery_activity_sheet_items`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyActivitySheet {
    pub id: i64,
    pub job_id: Option<i64>,
    pub associate_id: Option<i64>,
    pub comment: Option<String>,
    pub state: Option<String>,
    pub audit: LegacyAudit,
}

impl FromLegacyRow for LegacyActivitySheet {
    const TABLE: &'static str = "workery_activity_sheet_items";

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(row, Self::TABLE);
        Ok(Self {
            id: r.id("id")?,
            job_id: r.opt_i64("job_id")?,
            associate_id: r.opt_i64("associate_id")?,
            comment: r.opt_string("comment")?,
            state: r.opt_string("state")?,
            audit: LegacyAudit::read(&r)?,
        })
    }
}

pub async fn read_activity_sheets(
    pool: &LegacyPool,
    schema: &str,
) -> Result<Vec<LegacyActivitySheet>> {
    // Activity sheets are append-only and carry no modification columns.
    let sql = format!(
        "SELECT id, job_id, associate_id, comment, state, created_at, created_by_id, \
         created_from, NULL::timestamptz AS last_modified_at, NULL::int8 AS last_modified_by_id, \
         NULL::text AS last_modified_from FROM {} ORDER BY id ASC",
        qualified(schema, LegacyActivitySheet::TABLE)?
    );
    pool.fetch_all(&sql).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_sql_casts_money_columns() {
        let sql = orders_sql("london").unwrap();
        assert!(sql.contains("invoice_total_amount::float8 AS invoice_total_amount"));
        assert!(sql.contains("created AS created_at"));
        assert!(sql.ends_with("FROM \"london\".workery_work_orders ORDER BY id ASC"));
    }

    #[test]
    fn test_orders_sql_quotes_schema() {
        let sql = orders_sql("lon\"don").unwrap();
        assert!(sql.contains("FROM \"lon\"\"don\".workery_work_orders"));
        assert!(orders_sql("").is_err());
    }
}
