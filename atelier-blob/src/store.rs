use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::BTreeMap;

use crate::{ByteStream, GalleryResult};

/// Core blob storage operations - must be implemented by all storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob from a stream. `metadata` is advisory only; the blob
    /// path remains the source of truth for every derived field.
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        metadata: &BTreeMap<String, String>,
        stream: ByteStream,
    ) -> GalleryResult<PutResult>;

    /// Get a blob's content as a stream
    async fn get(&self, key: &str) -> GalleryResult<GetResult>;

    /// Delete a blob. Idempotent: deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> GalleryResult<()>;

    /// List blobs under a prefix. Listing order carries no meaning.
    async fn list(&self, prefix: &str) -> GalleryResult<Vec<BlobInfo>>;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub url: String,
    pub size_bytes: u64,
    pub etag: Option<String>,
}

/// Result of a get operation
pub struct GetResult {
    pub stream: ByteStream,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

/// Listing entry for a stored blob
#[derive(Debug, Clone)]
pub struct BlobInfo {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    /// Epoch milliseconds, when the backend reports it
    pub uploaded_at: Option<i64>,
}

/// Wrap an in-memory buffer as a one-shot [`ByteStream`]
pub fn stream_bytes(data: Bytes) -> ByteStream {
    Box::pin(futures::stream::once(async move { Ok(data) }))
}

/// Drain a [`ByteStream`] into a buffer
pub async fn read_to_end(mut stream: ByteStream) -> GalleryResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        data.extend_from_slice(&chunk?);
    }
    Ok(data)
}
