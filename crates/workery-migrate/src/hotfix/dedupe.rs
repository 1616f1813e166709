//! Pass 2: remove duplicate attachment records.
//!
//! Only the documents are deleted. Blobs in either object store are never
//! touched.

use std::collections::BTreeMap;

use bson::doc;
use bson::oid::ObjectId;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{Attachment, AttachmentType, Tenant};
use crate::store::{DocumentStore, Repository};

use super::in_transaction;

/// Kinds whose attachments are de-duplicated. Order attachments are left as is.
pub const DEDUPED_KINDS: [AttachmentType; 3] = [
    AttachmentType::Customer,
    AttachmentType::Associate,
    AttachmentType::Staff,
];

/// Group attachments by `(bound principal, object key)` and return, per bound
/// principal, the ids of every attachment after the first in its group.
pub fn duplicates_to_delete(attachments: &[Attachment]) -> BTreeMap<ObjectId, Vec<ObjectId>> {
    let mut groups: BTreeMap<(ObjectId, &str), Vec<&Attachment>> = BTreeMap::new();
    for attachment in attachments {
        groups
            .entry((attachment.bound_id(), attachment.object_key.as_str()))
            .or_default()
            .push(attachment);
    }

    let mut doomed: BTreeMap<ObjectId, Vec<ObjectId>> = BTreeMap::new();
    for ((bound_id, object_key), group) in groups {
        let Some((keeper, rest)) = group.split_first() else {
            continue;
        };
        for duplicate in rest {
            if duplicate.bound_id() == keeper.bound_id() && duplicate.object_key == object_key {
                doomed.entry(bound_id).or_default().push(duplicate.id);
            }
        }
    }
    doomed
}

pub async fn dedupe_attachments(store: &dyn DocumentStore, tenant: &Tenant) -> Result<usize> {
    info!("Beginning removing duplicate attachments");
    let repo = Repository::<Attachment>::new(store);
    let attachments = repo.find(doc! { "tenant_id": tenant.id }).await?;

    let mut deleted = 0;
    for kind in DEDUPED_KINDS {
        let of_kind: Vec<Attachment> = attachments
            .iter()
            .filter(|a| a.type_of == kind)
            .cloned()
            .collect();
        debug!("Checking {} {:?} attachments", of_kind.len(), kind);

        for (bound_id, ids) in duplicates_to_delete(&of_kind) {
            in_transaction(store, async {
                for id in &ids {
                    repo.delete(*id).await?;
                    info!("Deleted duplicate Attachment ID# {}", id);
                }
                Ok(())
            })
            .await?;
            deleted += ids.len();
            debug!("Removed {} duplicates for {:?} ID# {}", ids.len(), kind, bound_id);
        }
    }
    info!("Finished removing duplicate attachments");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{nil_id, Audit, Status};

    fn attachment(customer_id: ObjectId, object_key: &str) -> Attachment {
        Attachment {
            id: ObjectId::new(),
            tenant_id: ObjectId::new(),
            public_id: 1,
            type_of: AttachmentType::Customer,
            customer_id,
            customer_name: String::new(),
            associate_id: nil_id(),
            associate_name: String::new(),
            order_id: nil_id(),
            staff_id: nil_id(),
            staff_name: String::new(),
            object_key: object_key.to_string(),
            filename: String::new(),
            title: String::new(),
            description: String::new(),
            status: Status::Active,
            audit: Audit::default(),
        }
    }

    #[test]
    fn test_keeps_first_of_each_group() {
        let customer = ObjectId::new();
        let other = ObjectId::new();
        let items = vec![
            attachment(customer, "a.pdf"),
            attachment(customer, "a.pdf"),
            attachment(customer, "b.pdf"),
            attachment(customer, "a.pdf"),
            attachment(other, "a.pdf"),
        ];
        let doomed = duplicates_to_delete(&items);
        assert_eq!(doomed.len(), 1);
        assert_eq!(doomed[&customer], vec![items[1].id, items[3].id]);
    }

    #[test]
    fn test_no_duplicates() {
        let items = vec![attachment(ObjectId::new(), "a.pdf")];
        assert!(duplicates_to_delete(&items).is_empty());
        assert!(duplicates_to_delete(&[]).is_empty());
    }
}
