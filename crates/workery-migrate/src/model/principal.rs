use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::{
    entity, Address, Audit, Comment, Gender, InsuranceRequirement, Phone, SkillSet, Status, Tag,
    VehicleType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Unassigned,
    Residential,
    Commercial,
}

impl CustomerType {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(2) => CustomerType::Residential,
            Some(3) => CustomerType::Commercial,
            _ => CustomerType::Unassigned,
        }
    }
}

/// "Until further notice" on an away log; `Unspecified` when the legacy
/// column is NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UntilFurtherNotice {
    Unspecified,
    Yes,
    No,
}

impl From<Option<bool>> for UntilFurtherNotice {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => UntilFurtherNotice::Yes,
            Some(false) => UntilFurtherNotice::No,
            None => UntilFurtherNotice::Unspecified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwayLog {
    pub id: ObjectId,
    pub public_id: i64,
    pub reason: i64,
    pub reason_other: String,
    pub until_further_notice: UntilFurtherNotice,
    pub until_date: Option<DateTime>,
    pub start_date: Option<DateTime>,
    pub status: Status,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    #[serde(rename = "type")]
    pub type_of: CustomerType,
    pub organization_name: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub lexical_name: String,
    pub email: String,
    pub is_ok_to_email: bool,
    pub is_ok_to_text: bool,
    pub phone: Option<Phone>,
    pub other_phone: Option<Phone>,
    pub gender: Option<Gender>,
    pub birthdate: Option<DateTime>,
    pub join_date: Option<DateTime>,
    pub nationality: String,
    pub tax_id: String,
    pub description: String,
    pub status: Status,
    pub how_hear_id: ObjectId,
    pub how_hear_text: String,
    pub is_how_hear_other: bool,
    pub address: Address,
    pub audit: Audit,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
    pub skill_sets: Vec<SkillSet>,
    pub insurance_requirements: Vec<InsuranceRequirement>,
    pub vehicle_types: Vec<VehicleType>,
    pub away_logs: Vec<AwayLog>,
}

entity!(Customer, "customers", "Customer", CACHED = true);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Associate {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub owner_user_id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub lexical_name: String,
    pub email: String,
    pub phone: Option<Phone>,
    pub other_phone: Option<Phone>,
    pub gender: Option<Gender>,
    pub birthdate: Option<DateTime>,
    pub join_date: Option<DateTime>,
    pub nationality: String,
    pub tax_id: String,
    pub description: String,
    pub status: Status,
    pub how_hear_id: ObjectId,
    pub how_hear_text: String,
    pub is_how_hear_other: bool,
    pub hourly_salary_desired: i64,
    pub service_fee_id: ObjectId,
    pub service_fee_name: String,
    pub service_fee_percentage: f64,
    pub wsib_number: String,
    pub police_check: Option<DateTime>,
    pub driver_license_class: String,
    pub emergency_contact_name: String,
    pub emergency_contact_telephone: String,
    pub address: Address,
    pub audit: Audit,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
    pub skill_sets: Vec<SkillSet>,
    pub insurance_requirements: Vec<InsuranceRequirement>,
    pub vehicle_types: Vec<VehicleType>,
    pub away_logs: Vec<AwayLog>,
}

entity!(Associate, "associates", "Associate", CACHED = true);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub owner_user_id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub lexical_name: String,
    pub email: String,
    pub personal_email: String,
    pub phone: Option<Phone>,
    pub other_phone: Option<Phone>,
    pub gender: Option<Gender>,
    pub birthdate: Option<DateTime>,
    pub join_date: Option<DateTime>,
    pub nationality: String,
    pub tax_id: String,
    pub description: String,
    pub status: Status,
    pub how_hear_id: ObjectId,
    pub how_hear_text: String,
    pub is_how_hear_other: bool,
    pub police_check: Option<DateTime>,
    pub emergency_contact_name: String,
    pub emergency_contact_telephone: String,
    pub address: Address,
    pub audit: Audit,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
    pub skill_sets: Vec<SkillSet>,
    pub insurance_requirements: Vec<InsuranceRequirement>,
    pub vehicle_types: Vec<VehicleType>,
    pub away_logs: Vec<AwayLog>,
}

entity!(Staff, "staff", "Staff", CACHED = true);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_further_notice_is_tri_state() {
        assert_eq!(UntilFurtherNotice::from(Some(true)), UntilFurtherNotice::Yes);
        assert_eq!(UntilFurtherNotice::from(Some(false)), UntilFurtherNotice::No);
        assert_eq!(UntilFurtherNotice::from(None), UntilFurtherNotice::Unspecified);
    }

    #[test]
    fn test_customer_type_codes() {
        assert_eq!(CustomerType::from_code(Some(2)), CustomerType::Residential);
        assert_eq!(CustomerType::from_code(Some(3)), CustomerType::Commercial);
        assert_eq!(CustomerType::from_code(Some(1)), CustomerType::Unassigned);
        assert_eq!(CustomerType::from_code(None), CustomerType::Unassigned);
    }
}
