use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{
    store::{read_to_end, stream_bytes},
    BlobInfo, BlobStore, ByteStream, GalleryError, GalleryResult, GetResult, PutResult,
};

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    metadata: BTreeMap<String, String>,
    uploaded_at: i64,
}

/// In-memory blob store for tests and development.
///
/// Listing iterates a hash map, so the order is arbitrary on purpose:
/// nothing in the pipeline is allowed to depend on listing order.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn url_for(key: &str) -> String {
        format!("memory://{key}")
    }

    /// Whether an object exists at `key`
    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    /// Advisory metadata recorded for `key`, if the object exists
    pub fn metadata_of(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.objects.read().get(key).map(|o| o.metadata.clone())
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        metadata: &BTreeMap<String, String>,
        stream: ByteStream,
    ) -> GalleryResult<PutResult> {
        let data = read_to_end(stream).await?;
        let size_bytes = data.len() as u64;
        let object = StoredObject {
            data: Bytes::from(data),
            content_type: content_type.map(str::to_string),
            metadata: metadata.clone(),
            uploaded_at: chrono::Utc::now().timestamp_millis(),
        };
        self.objects.write().insert(key.to_string(), object);
        Ok(PutResult {
            url: Self::url_for(key),
            size_bytes,
            etag: None,
        })
    }

    async fn get(&self, key: &str) -> GalleryResult<GetResult> {
        let object = self
            .objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| GalleryError::not_found(key))?;
        Ok(GetResult {
            size_bytes: object.data.len() as u64,
            content_type: object.content_type,
            stream: stream_bytes(object.data),
        })
    }

    async fn delete(&self, key: &str) -> GalleryResult<()> {
        self.objects.write().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> GalleryResult<Vec<BlobInfo>> {
        let objects = self.objects.read();
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| BlobInfo {
                key: key.clone(),
                url: Self::url_for(key),
                size_bytes: object.data.len() as u64,
                content_type: object.content_type.clone(),
                uploaded_at: Some(object.uploaded_at),
            })
            .collect())
    }
}
