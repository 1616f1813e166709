//! Document model of the new schema.
//!
//! Every document carries a freshly minted `_id` and the legacy numeric id
//! as `public_id`. Referenced data is copied inline so documents can be read
//! without joins; absent references use [`nil_id`] and an empty name.

mod attachment;
mod order;
mod principal;
mod reference;
mod tenant;

pub use attachment::*;
pub use order::*;
pub use principal::*;
pub use reference::*;
pub use tenant::*;

use bson::oid::ObjectId;
use bson::DateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The null identifier: all twelve bytes zero.
pub fn nil_id() -> ObjectId {
    ObjectId::from_bytes([0; 12])
}

pub fn is_nil(id: &ObjectId) -> bool {
    id.bytes() == [0; 12]
}

/// A document type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin {
    /// Collection name in the document store.
    const COLLECTION: &'static str;

    /// Display name used in progress lines and errors.
    const KIND: &'static str;

    /// Whether lookups are restricted to the current tenant.
    const TENANT_SCOPED: bool = true;

    /// Whether the resolver remembers `public_id -> _id` for this kind.
    const CACHED: bool = false;

    fn id(&self) -> ObjectId;

    fn public_id(&self) -> i64;
}

macro_rules! entity {
    ($ty:ty, $collection:literal, $kind:literal $(, $flag:ident = $value:expr)*) => {
        impl $crate::model::Entity for $ty {
            const COLLECTION: &'static str = $collection;
            const KIND: &'static str = $kind;
            $(const $flag: bool = $value;)*

            fn id(&self) -> bson::oid::ObjectId {
                self.id
            }

            fn public_id(&self) -> i64 {
                self.public_id
            }
        }
    };
}

pub(crate) use entity;

/// Who created and last modified a document, and from where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: Option<DateTime>,
    pub created_by_user_id: ObjectId,
    pub created_by_user_name: String,
    pub created_from_ip_address: String,
    pub modified_at: Option<DateTime>,
    pub modified_by_user_id: ObjectId,
    pub modified_by_user_name: String,
    pub modified_from_ip_address: String,
}

impl Default for Audit {
    fn default() -> Self {
        Self {
            created_at: None,
            created_by_user_id: nil_id(),
            created_by_user_name: String::new(),
            created_from_ip_address: String::new(),
            modified_at: None,
            modified_by_user_id: nil_id(),
            modified_by_user_name: String::new(),
            modified_from_ip_address: String::new(),
        }
    }
}

/// Postal address with its pre-composed display forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    pub region: String,
    pub locality: String,
    pub postal_code: String,
    pub street_address: String,
    pub street_address_extra: String,
    pub post_office_box_number: String,
    pub elevation: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub full_address_without_postal_code: String,
    pub full_address_with_postal_code: String,
    pub full_address_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneType {
    Landline,
    Mobile,
    Work,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    pub number: String,
    #[serde(rename = "type")]
    pub type_of: Option<PhoneType>,
    pub extension: String,
}

/// Gender with a free-form description reserved for `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "description", rename_all = "snake_case")]
pub enum Gender {
    Man,
    Woman,
    PreferNotToSay,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Archived,
}

impl Status {
    pub fn from_archived(is_archived: bool) -> Self {
        if is_archived {
            Status::Archived
        } else {
            Status::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_id() {
        assert_eq!(nil_id().to_hex(), "000000000000000000000000");
        assert!(is_nil(&nil_id()));
        assert!(!is_nil(&ObjectId::new()));
    }

    #[test]
    fn test_gender_is_tagged() {
        let doc = bson::to_document(&Gender::Other("two-spirit".into())).unwrap();
        assert_eq!(doc.get_str("kind").unwrap(), "other");
        assert_eq!(doc.get_str("description").unwrap(), "two-spirit");

        let doc = bson::to_document(&Gender::PreferNotToSay).unwrap();
        assert_eq!(doc.get_str("kind").unwrap(), "prefer_not_to_say");
        assert!(doc.get("description").is_none());
    }

    #[test]
    fn test_audit_default_uses_nil_ids() {
        let audit = Audit::default();
        assert!(is_nil(&audit.created_by_user_id));
        assert!(is_nil(&audit.modified_by_user_id));
        assert!(audit.created_by_user_name.is_empty());
    }
}
