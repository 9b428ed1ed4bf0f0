//! Storage provider trait for revision content.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Backend holding the binary content of file revisions.
///
/// The engine never interprets content; it only copies blobs when a
/// folder subtree is copied and deletes them when a subtree is purged.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Read a blob into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write bytes to a blob at the given path.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete the blob at the given path. Missing blobs are not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Copy a blob from one path to another.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
