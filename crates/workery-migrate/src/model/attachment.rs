use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::{entity, Audit, Status};

/// Which principal an attachment is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    Customer,
    Associate,
    Order,
    Staff,
}

/// Prefix of every key written to the new object store.
pub const UPLOAD_KEY_PREFIX: &str = "tenant/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub public_id: i64,
    #[serde(rename = "type")]
    pub type_of: AttachmentType,
    pub customer_id: ObjectId,
    pub customer_name: String,
    pub associate_id: ObjectId,
    pub associate_name: String,
    pub order_id: ObjectId,
    pub staff_id: ObjectId,
    pub staff_name: String,
    /// Local staging path after download, storage key after upload.
    pub object_key: String,
    pub filename: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub audit: Audit,
}

entity!(Attachment, "attachments", "Attachment");

impl Attachment {
    /// Identifier of the bound principal.
    pub fn bound_id(&self) -> ObjectId {
        match self.type_of {
            AttachmentType::Customer => self.customer_id,
            AttachmentType::Associate => self.associate_id,
            AttachmentType::Order => self.order_id,
            AttachmentType::Staff => self.staff_id,
        }
    }

    /// Key under which the blob lives in the new object store.
    pub fn upload_key(tenant_id: &ObjectId, filename: &str) -> String {
        format!(
            "{}{}/private/uploads/{}",
            UPLOAD_KEY_PREFIX,
            tenant_id.to_hex(),
            filename
        )
    }

    pub fn is_uploaded(&self) -> bool {
        self.object_key.starts_with(UPLOAD_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key() {
        let tenant = ObjectId::parse_str("65a1b2c3d4e5f60718293a4b").unwrap();
        assert_eq!(
            Attachment::upload_key(&tenant, "xyz.pdf"),
            "tenant/65a1b2c3d4e5f60718293a4b/private/uploads/xyz.pdf"
        );
    }
}
