use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::{entity, Associate, Audit, Comment, Customer, Gender, Phone, SkillSet, Status, Tag};

/// Work order lifecycle state as observed at migration time.
///
/// `completed_and_unpaid` and `completed_but_unpaid` are the same state;
/// documents always carry the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Declined,
    Pending,
    Cancelled,
    Ongoing,
    InProgress,
    #[serde(alias = "completed_and_unpaid")]
    CompletedButUnpaid,
    CompletedAndPaid,
    Archived,
}

impl OrderStatus {
    /// Map a legacy state label. Unknown or missing labels become `Archived`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("new") => OrderStatus::New,
            Some("declined") => OrderStatus::Declined,
            Some("pending") => OrderStatus::Pending,
            Some("cancelled") => OrderStatus::Cancelled,
            Some("ongoing") => OrderStatus::Ongoing,
            Some("in_progress") => OrderStatus::InProgress,
            Some("completed_and_unpaid") | Some("completed_but_unpaid") => {
                OrderStatus::CompletedButUnpaid
            }
            Some("completed_and_paid") => OrderStatus::CompletedAndPaid,
            Some("archived") => OrderStatus::Archived,
            _ => OrderStatus::Archived,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Archived | OrderStatus::CompletedAndPaid)
    }
}

/// Copy of a customer or associate as it looked when the order was migrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySnapshot {
    pub id: ObjectId,
    pub name: String,
    pub lexical_name: String,
    pub gender: Option<Gender>,
    pub birthdate: Option<DateTime>,
    pub email: String,
    pub phone: Option<Phone>,
    pub other_phone: Option<Phone>,
    pub full_address: String,
    pub full_address_url: String,
    pub tags: Vec<Tag>,
}

impl From<&Customer> for PartySnapshot {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            lexical_name: c.lexical_name.clone(),
            gender: c.gender.clone(),
            birthdate: c.birthdate,
            email: c.email.clone(),
            phone: c.phone.clone(),
            other_phone: c.other_phone.clone(),
            full_address: c.address.full_address_without_postal_code.clone(),
            full_address_url: c.address.full_address_url.clone(),
            tags: c.tags.clone(),
        }
    }
}

impl From<&Associate> for PartySnapshot {
    fn from(a: &Associate) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            lexical_name: a.lexical_name.clone(),
            gender: a.gender.clone(),
            birthdate: a.birthdate,
            email: a.email.clone(),
            phone: a.phone.clone(),
            other_phone: a.other_phone.clone(),
            full_address: a.address.full_address_without_postal_code.clone(),
            full_address_url: a.address.full_address_url.clone(),
            tags: a.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInvoice {
    pub id: ObjectId,
    pub public_id: i64,
    pub invoice_id: String,
    pub invoice_date: Option<DateTime>,
    pub associate_name: String,
    pub associate_telephone: String,
    pub client_name: String,
    pub client_address: String,
    pub client_telephone: String,
    pub client_email: String,
    pub sub_total_amount: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub deposit_amount: f64,
    pub amount_due: f64,
    pub payment_amount: f64,
    pub payment_date: Option<DateTime>,
    pub is_cash: bool,
    pub is_cheque: bool,
    pub is_debit: bool,
    pub is_credit: bool,
    pub is_other: bool,
    pub client_signature: String,
    pub associate_sign_date: Option<DateTime>,
    pub associate_signature: String,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDeposit {
    pub id: ObjectId,
    pub public_id: i64,
    pub paid_at: Option<DateTime>,
    pub deposit_method: i64,
    pub paid_to: i64,
    pub paid_for: i64,
    pub amount: f64,
    pub status: Status,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub customer_id: ObjectId,
    pub customer: PartySnapshot,
    pub associate_id: ObjectId,
    pub associate: Option<PartySnapshot>,
    pub description: String,
    pub assignment_date: Option<DateTime>,
    pub is_ongoing: bool,
    pub is_home_support_service: bool,
    pub start_date: Option<DateTime>,
    pub completion_date: Option<DateTime>,
    pub hours: f64,
    #[serde(rename = "type")]
    pub type_of: i64,
    pub status: OrderStatus,
    pub closing_reason: i64,
    pub closing_reason_other: String,
    pub visits: i64,
    pub invoice_date: Option<DateTime>,
    pub invoice_quote_amount: f64,
    pub invoice_labour_amount: f64,
    pub invoice_material_amount: f64,
    pub invoice_tax_amount: f64,
    pub invoice_total_amount: f64,
    pub invoice_service_fee_amount: f64,
    pub invoice_service_fee_payment_date: Option<DateTime>,
    pub invoice_actual_service_fee_amount_paid: f64,
    pub invoice_balance_owing_amount: f64,
    pub invoice_service_fee_id: ObjectId,
    pub invoice_service_fee_name: String,
    pub invoice_service_fee_percentage: f64,
    pub latest_pending_task_id: ObjectId,
    pub latest_pending_task_title: String,
    pub latest_pending_task_description: String,
    pub latest_pending_task_due_date: Option<DateTime>,
    pub latest_pending_task_type: i64,
    pub tags: Vec<Tag>,
    pub skill_sets: Vec<SkillSet>,
    pub comments: Vec<Comment>,
    pub deposits: Vec<OrderDeposit>,
    pub invoices: Vec<OrderInvoice>,
    pub audit: Audit,
}

entity!(Order, "orders", "Order", CACHED = true);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub order_id: ObjectId,
    #[serde(rename = "type")]
    pub type_of: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime>,
    pub is_closed: bool,
    pub was_postponed: bool,
    pub closing_reason: i64,
    pub closing_reason_other: String,
    pub status: Status,
    pub customer_id: ObjectId,
    pub customer: PartySnapshot,
    pub associate_id: ObjectId,
    pub associate: Option<PartySnapshot>,
    pub order_tags: Vec<Tag>,
    pub order_skill_sets: Vec<SkillSet>,
    pub invoice_service_fee_id: ObjectId,
    pub invoice_service_fee_name: String,
    pub invoice_service_fee_percentage: f64,
    pub audit: Audit,
}

entity!(TaskItem, "task_items", "TaskItem");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySheetStatus {
    Accepted,
    Declined,
    Pending,
}

impl ActivitySheetStatus {
    /// Unknown or missing labels are treated as still pending.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("accepted") => ActivitySheetStatus::Accepted,
            Some("declined") => ActivitySheetStatus::Declined,
            _ => ActivitySheetStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySheet {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub order_id: ObjectId,
    pub associate_id: ObjectId,
    pub associate_name: String,
    pub comment: String,
    pub status: ActivitySheetStatus,
    pub audit: Audit,
}

entity!(ActivitySheet, "activity_sheets", "ActivitySheet");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_labels() {
        let cases = [
            ("new", OrderStatus::New),
            ("declined", OrderStatus::Declined),
            ("pending", OrderStatus::Pending),
            ("cancelled", OrderStatus::Cancelled),
            ("ongoing", OrderStatus::Ongoing),
            ("in_progress", OrderStatus::InProgress),
            ("completed_and_unpaid", OrderStatus::CompletedButUnpaid),
            ("completed_but_unpaid", OrderStatus::CompletedButUnpaid),
            ("completed_and_paid", OrderStatus::CompletedAndPaid),
            ("archived", OrderStatus::Archived),
        ];
        for (label, expected) in cases {
            assert_eq!(OrderStatus::from_label(Some(label)), expected, "{}", label);
        }
    }

    #[test]
    fn test_unknown_order_state_is_archived() {
        assert_eq!(
            OrderStatus::from_label(Some("frobnicated")),
            OrderStatus::Archived
        );
        assert_eq!(OrderStatus::from_label(None), OrderStatus::Archived);
        assert!(OrderStatus::Archived.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
    }

    #[test]
    fn test_completed_and_unpaid_reads_back() {
        let doc = bson::doc! { "status": "completed_and_unpaid" };
        #[derive(Deserialize)]
        struct Probe {
            status: OrderStatus,
        }
        let probe: Probe = bson::from_document(doc).unwrap();
        assert_eq!(probe.status, OrderStatus::CompletedButUnpaid);
    }
}
