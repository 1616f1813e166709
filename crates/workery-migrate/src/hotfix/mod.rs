//! Post-load correction passes.
//!
//! Each pass runs after the bulk load and rewrites documents the load left
//! inconsistent. Per-principal fix-ups run inside one document-store
//! transaction via [`in_transaction`].

mod dedupe;
mod export;
mod mirror;
mod principals;
mod service_fee;

pub use dedupe::{dedupe_attachments, duplicates_to_delete, DEDUPED_KINDS};
pub use export::{attachments_csv, csv_escape, export_attachments, CSV_HEADER};
pub use mirror::mirror_legacy_objects;
pub use principals::{fix_principals, LegacyIdentity, Principal};
pub use service_fee::{cascade_service_fees, FeeHolder};

use std::future::Future;

use tracing::warn;

use crate::error::Result;
use crate::store::DocumentStore;

/// Run `work` inside a transaction: commit on success, abort on error.
pub async fn in_transaction<T, F>(store: &dyn DocumentStore, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    store.start_transaction().await?;
    match work.await {
        Ok(value) => {
            store.commit_transaction().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(abort) = store.abort_transaction().await {
                warn!("Failed to abort transaction: {}", abort);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;
    use crate::store::MemoryStore;
    use bson::doc;
    use bson::oid::ObjectId;

    #[tokio::test]
    async fn test_failed_work_is_rolled_back() {
        let store = MemoryStore::new();
        let result: Result<()> = in_transaction(&store, async {
            store.insert_one("things", doc! { "_id": ObjectId::new() }).await?;
            Err(MigrateError::not_found("Thing", 1))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(store.count("things"), 0);

        in_transaction(&store, async {
            store.insert_one("things", doc! { "_id": ObjectId::new() }).await
        })
        .await
        .unwrap();
        assert_eq!(store.count("things"), 1);
    }
}
