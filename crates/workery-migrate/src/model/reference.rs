use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::{entity, nil_id, Audit, Status};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HowHearAboutUsItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub text: String,
    pub sort_number: i64,
    pub is_for_associate: bool,
    pub is_for_customer: bool,
    pub is_for_staff: bool,
    pub is_for_partner: bool,
    pub status: Status,
    pub audit: Audit,
}

entity!(HowHearAboutUsItem, "how_hear_about_us_items", "HowHearAboutUsItem");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub text: String,
    pub description: String,
    pub status: Status,
    pub audit: Audit,
}

entity!(Tag, "tags", "Tag");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleType {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub audit: Audit,
}

entity!(VehicleType, "vehicle_types", "VehicleType");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceRequirement {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub audit: Audit,
}

entity!(InsuranceRequirement, "insurance_requirements", "InsuranceRequirement");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub category: String,
    pub sub_category: String,
    pub description: String,
    pub status: Status,
    pub insurance_requirements: Vec<InsuranceRequirement>,
    pub audit: Audit,
}

entity!(SkillSet, "skill_sets", "SkillSet");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFee {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub name: String,
    pub description: String,
    pub percentage: f64,
    pub status: Status,
    pub audit: Audit,
}

entity!(ServiceFee, "service_fees", "ServiceFee");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bulletin {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub text: String,
    pub status: Status,
    pub audit: Audit,
}

entity!(Bulletin, "bulletins", "Bulletin");

/// Principal that owns a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentBelongsTo {
    Unassigned,
    Customer,
    Associate,
    Order,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub text: String,
    pub status: Status,
    pub belongs_to: CommentBelongsTo,
    pub customer_id: ObjectId,
    pub customer_name: String,
    pub associate_id: ObjectId,
    pub associate_name: String,
    pub order_id: ObjectId,
    pub staff_id: ObjectId,
    pub staff_name: String,
    pub audit: Audit,
}

entity!(Comment, "comments", "Comment");

impl Comment {
    /// Comment not yet claimed by any principal.
    pub fn unassigned(tenant_id: ObjectId, public_id: i64, text: String) -> Self {
        Self {
            id: ObjectId::new(),
            tenant_id,
            public_id,
            text,
            status: Status::Active,
            belongs_to: CommentBelongsTo::Unassigned,
            customer_id: nil_id(),
            customer_name: String::new(),
            associate_id: nil_id(),
            associate_name: String::new(),
            order_id: nil_id(),
            staff_id: nil_id(),
            staff_name: String::new(),
            audit: Audit::default(),
        }
    }
}
