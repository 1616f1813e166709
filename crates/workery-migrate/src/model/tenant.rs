use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::{entity, Address, Audit, Status};

pub const DEFAULT_TIMEZONE: &str = "America/Toronto";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub public_id: i64,
    pub schema_name: String,
    pub name: String,
    pub alternate_name: String,
    pub description: String,
    pub url: String,
    pub timezone: String,
    pub status: Status,
    pub address: Address,
    pub audit: Audit,
}

entity!(Tenant, "tenants", "Tenant", TENANT_SCOPED = false);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// Access role; legacy group ids map onto it one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Executive,
    Management,
    FrontlineStaff,
    Associate,
    Customer,
}

impl UserRole {
    pub fn from_group_id(group_id: i64) -> Option<Self> {
        match group_id {
            1 => Some(UserRole::Executive),
            2 => Some(UserRole::Management),
            3 => Some(UserRole::FrontlineStaff),
            4 => Some(UserRole::Associate),
            5 => Some(UserRole::Customer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub lexical_name: String,
    pub role: Option<UserRole>,
    pub status: UserStatus,
    pub timezone: String,
    pub joined_at: Option<DateTime>,
    pub last_login_at: Option<DateTime>,
    pub was_email_verified: bool,
    /// PHC string; empty until a password is set.
    pub password_hash: String,
    pub audit: Audit,
}

entity!(User, "users", "User", CACHED = true);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_group_id() {
        assert_eq!(UserRole::from_group_id(1), Some(UserRole::Executive));
        assert_eq!(UserRole::from_group_id(5), Some(UserRole::Customer));
        assert_eq!(UserRole::from_group_id(0), None);
        assert_eq!(UserRole::from_group_id(6), None);
    }
}
