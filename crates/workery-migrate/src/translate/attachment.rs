//! Two-phase attachment migration.
//!
//! The download phase matches legacy objects to `private_file_uploads` rows
//! by file name, stages each matched blob locally and records an
//! [`Attachment`] whose `object_key` is the staging path. The upload phase
//! pushes every staged blob to the new bucket and rewrites the key.

use std::path::{Path, PathBuf};

use bson::doc;
use bson::oid::ObjectId;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{
    nil_id, Associate, Attachment, AttachmentType, Audit, Customer, Order, Staff, Status, Tenant,
};
use crate::objects::ObjectStore;
use crate::resolver::Resolver;
use crate::source::LegacyPrivateFile;
use crate::store::{DocumentStore, Repository};

use super::compose::text;
use super::resolve_audit;

/// The principal an attachment ends up bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub type_of: AttachmentType,
    pub id: ObjectId,
    pub name: String,
}

/// Resolve the binding of a legacy row. Candidates are tried in the order
/// customer, associate, order, staff and the last one found wins.
pub async fn resolve_binding(
    resolver: &Resolver<'_>,
    row: &LegacyPrivateFile,
) -> Result<Option<Binding>> {
    let mut binding = None;
    if let Some(c) = resolver.legacy::<Customer>(row.customer_id).await? {
        binding = Some(Binding {
            type_of: AttachmentType::Customer,
            id: c.id,
            name: c.name,
        });
    }
    if let Some(a) = resolver.legacy::<Associate>(row.associate_id).await? {
        binding = Some(Binding {
            type_of: AttachmentType::Associate,
            id: a.id,
            name: a.name,
        });
    }
    if let Some(o) = resolver.legacy::<Order>(row.work_order_id).await? {
        binding = Some(Binding {
            type_of: AttachmentType::Order,
            id: o.id,
            name: String::new(),
        });
    }
    if let Some(s) = resolver.legacy::<Staff>(row.staff_id).await? {
        binding = Some(Binding {
            type_of: AttachmentType::Staff,
            id: s.id,
            name: s.name,
        });
    }
    Ok(binding)
}

/// `true` when the row's file name occurs in the legacy object key.
pub fn matches_key(row: &LegacyPrivateFile, key: &str) -> bool {
    row.basename().is_some_and(|name| key.contains(name))
}

pub fn attachment_from_legacy(
    row: &LegacyPrivateFile,
    tenant_id: ObjectId,
    binding: Binding,
    filename: &str,
    object_key: String,
    audit: Audit,
) -> Attachment {
    let mut attachment = Attachment {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        type_of: binding.type_of,
        customer_id: nil_id(),
        customer_name: String::new(),
        associate_id: nil_id(),
        associate_name: String::new(),
        order_id: nil_id(),
        staff_id: nil_id(),
        staff_name: String::new(),
        object_key,
        filename: filename.to_string(),
        title: text(&row.title),
        description: text(&row.description),
        status: Status::from_archived(row.is_archived),
        audit,
    };
    match binding.type_of {
        AttachmentType::Customer => {
            attachment.customer_id = binding.id;
            attachment.customer_name = binding.name;
        }
        AttachmentType::Associate => {
            attachment.associate_id = binding.id;
            attachment.associate_name = binding.name;
        }
        AttachmentType::Order => attachment.order_id = binding.id,
        AttachmentType::Staff => {
            attachment.staff_id = binding.id;
            attachment.staff_name = binding.name;
        }
    }
    attachment
}

pub fn staging_path(staging_dir: &Path, filename: &str) -> PathBuf {
    staging_dir.join(filename)
}

/// Download phase: stage every matched legacy object and record its attachment.
pub async fn download_attachments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    legacy: &dyn ObjectStore,
    rows: &[LegacyPrivateFile],
    staging_dir: &Path,
) -> Result<usize> {
    info!("Beginning importing attachments from bucket {}", legacy.bucket());
    tokio::fs::create_dir_all(staging_dir).await?;
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Attachment>::new(store);
    let keys = legacy.list_keys().await?;
    debug!("Listed {} legacy objects", keys.len());

    let mut imported = 0;
    for key in &keys {
        for row in rows.iter().filter(|row| matches_key(row, key)) {
            let Some(filename) = row.basename() else {
                continue;
            };
            let Some(binding) = resolve_binding(&resolver, row).await? else {
                warn!(
                    "Skipping private file {} for {}: no bound principal found",
                    row.id, key
                );
                continue;
            };

            let body = legacy.get(key).await?;
            let path = staging_path(staging_dir, filename);
            tokio::fs::write(&path, &body).await?;
            debug!("Staged {} ({} bytes) at {}", key, body.len(), path.display());

            let audit = resolve_audit(&resolver, &row.audit).await?;
            let attachment = attachment_from_legacy(
                row,
                tenant.id,
                binding,
                filename,
                path.to_string_lossy().into_owned(),
                audit,
            );
            repo.insert(&attachment).await?;
            imported += 1;
            info!("Imported Attachment ID# {}", attachment.id);
        }
    }
    info!("Finished importing attachments");
    Ok(imported)
}

/// Upload phase: push staged blobs to the new bucket and rewrite their keys.
/// Attachments already under the upload prefix are left alone.
pub async fn upload_attachments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    target: &dyn ObjectStore,
) -> Result<usize> {
    info!("Beginning uploading attachments to bucket {}", target.bucket());
    let repo = Repository::<Attachment>::new(store);
    let mut uploaded = 0;
    for mut attachment in repo.find(doc! { "tenant_id": tenant.id }).await? {
        if attachment.is_uploaded() {
            continue;
        }
        let body = tokio::fs::read(&attachment.object_key).await?;
        let key = Attachment::upload_key(&attachment.tenant_id, &attachment.filename);
        target.put(&key, body).await?;

        attachment.object_key = key;
        repo.replace(&attachment).await?;
        uploaded += 1;
        info!(
            "Uploaded Attachment ID# {} to {}",
            attachment.id, attachment.object_key
        );
    }
    info!("Finished uploading attachments");
    Ok(uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(data_file: &str) -> LegacyPrivateFile {
        LegacyPrivateFile {
            id: 3,
            data_file: Some(data_file.to_string()),
            title: Some("Quote".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_matches_key_by_basename() {
        assert!(matches_key(&row("/var/foo/xyz.pdf"), "media/u/abc/xyz.pdf"));
        assert!(!matches_key(&row("/var/foo/other.pdf"), "media/u/abc/xyz.pdf"));
        assert!(!matches_key(&row("/var/foo/"), "media/u/abc/xyz.pdf"));
        assert!(!matches_key(&row("/var/foo/.."), "media/u/../xyz.pdf"));
        assert!(!matches_key(&LegacyPrivateFile::default(), "anything"));
    }

    #[test]
    fn test_attachment_binds_one_principal() {
        let staff = ObjectId::new();
        let attachment = attachment_from_legacy(
            &row("/var/foo/xyz.pdf"),
            ObjectId::new(),
            Binding {
                type_of: AttachmentType::Staff,
                id: staff,
                name: "Ann Lee".into(),
            },
            "xyz.pdf",
            "./static/xyz.pdf".into(),
            Audit::default(),
        );
        assert_eq!(attachment.type_of, AttachmentType::Staff);
        assert_eq!(attachment.bound_id(), staff);
        assert_eq!(attachment.staff_name, "Ann Lee");
        assert_eq!(attachment.customer_id, nil_id());
        assert_eq!(attachment.order_id, nil_id());
        assert!(!attachment.is_uploaded());
    }
}
