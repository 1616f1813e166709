//! Copy every legacy object into the local staging directory.

use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::objects::ObjectStore;

/// Last path segment of an object key.
fn file_name(key: &str) -> Option<&str> {
    key.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Download every object of `legacy` into `staging_dir`, named after the last
/// segment of its key. Keys ending in `/` are skipped.
pub async fn mirror_legacy_objects(legacy: &dyn ObjectStore, staging_dir: &Path) -> Result<usize> {
    info!("Beginning downloading bucket {}", legacy.bucket());
    tokio::fs::create_dir_all(staging_dir).await?;
    let mut downloaded = 0;
    for key in legacy.list_keys().await? {
        let Some(name) = file_name(&key) else {
            warn!("Skipping object {}: no file name", key);
            continue;
        };
        let body = legacy.get(&key).await?;
        tokio::fs::write(staging_dir.join(name), body).await?;
        downloaded += 1;
        info!("Downloaded {}", key);
    }
    info!("Finished downloading {} objects", downloaded);
    Ok(downloaded)
}
