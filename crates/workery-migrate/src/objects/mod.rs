//! Object store access for attachment blobs.

mod memory;
mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;

use crate::error::Result;

/// A single bucket of an S3-compatible object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket name, for logging.
    fn bucket(&self) -> &str;

    /// Every key in the bucket, in the store's listing order.
    async fn list_keys(&self) -> Result<Vec<String>>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;
}
