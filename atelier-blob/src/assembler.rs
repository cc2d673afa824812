use bytes::Bytes;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    codec,
    store::{read_to_end, stream_bytes},
    BlobStore, Category, GalleryConfig, GalleryError, GalleryResult, MediaItem, MediaType,
};

/// Everything the reassembler needs to know about a finished transfer.
/// Carried on the final chunk; there is no server-side transfer record.
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub file_id: String,
    pub total_chunks: u32,
    pub category: Category,
    pub original_name: String,
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub content_type: Option<String>,
}

/// Combines the temp chunks of a completed transfer into one final media
/// object and publishes it under the gallery prefix.
pub struct Reassembler {
    store: Arc<dyn BlobStore>,
    config: GalleryConfig,
}

impl Reassembler {
    pub fn new<S: BlobStore + 'static>(store: S, config: GalleryConfig) -> Self {
        Self::with_store(Arc::new(store), config)
    }

    pub fn with_store(store: Arc<dyn BlobStore>, config: GalleryConfig) -> Self {
        Self { store, config }
    }

    pub async fn assemble(&self, req: AssemblyRequest) -> GalleryResult<MediaItem> {
        let prefix = codec::chunk_prefix(&self.config.temp_prefix, &req.file_id);
        let listing = self.store.list(&prefix).await?;

        // Order comes from the index embedded in each name. Listing order is
        // whatever the backend felt like returning and must never be trusted.
        let mut chunks: Vec<(u32, String)> = listing
            .into_iter()
            .filter_map(|info| codec::parse_chunk_index(&info.key).map(|idx| (idx, info.key)))
            .collect();
        chunks.sort_by_key(|(idx, _)| *idx);

        let contiguous = chunks.len() as u32 == req.total_chunks
            && chunks
                .iter()
                .enumerate()
                .all(|(pos, (idx, _))| pos as u32 == *idx);
        if !contiguous {
            let found = chunks.len() as u32;
            self.cleanup_chunks(&req.file_id).await;
            return Err(GalleryError::incomplete(req.total_chunks, found));
        }

        let mut assembled: Vec<u8> = Vec::new();
        for (_, key) in &chunks {
            let fetched = match self.store.get(key).await {
                Ok(result) => read_to_end(result.stream).await,
                Err(err) => Err(err),
            };
            match fetched {
                Ok(bytes) => assembled.extend_from_slice(&bytes),
                Err(err) => {
                    self.cleanup_chunks(&req.file_id).await;
                    return Err(err);
                }
            }
        }
        let total_bytes = assembled.len() as u64;

        let media_type = MediaType::from_hints(
            req.content_type.as_deref(),
            codec::extension_of(&req.original_name).as_deref(),
        );

        // A client-supplied display name overrides the original for the
        // cleaned token; the extension still comes from the original file.
        let source_name = match req.name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => match codec::extension_of(&req.original_name) {
                Some(ext) => format!("{name}.{ext}"),
                None => name.to_string(),
            },
            None => req.original_name.clone(),
        };
        let key = codec::encode_media_key(&self.config, req.category, &source_name, media_type);

        let now = Utc::now().timestamp_millis();
        let mut metadata = BTreeMap::new();
        metadata.insert("category".to_string(), req.category.as_str().to_string());
        metadata.insert("original_name".to_string(), req.original_name.clone());
        metadata.insert("media_type".to_string(), media_type.as_str().to_string());
        metadata.insert("uploaded_at".to_string(), now.to_string());

        let put = match self
            .store
            .put(
                &key,
                req.content_type.as_deref(),
                &metadata,
                stream_bytes(Bytes::from(assembled)),
            )
            .await
        {
            Ok(result) => result,
            Err(err) => {
                self.cleanup_chunks(&req.file_id).await;
                return Err(err);
            }
        };

        self.cleanup_chunks(&req.file_id).await;

        let decoded = codec::decode_media_key(&key, req.content_type.as_deref());
        let name = req
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(decoded.name);

        info!(
            file_id = %req.file_id,
            key = %key,
            size_bytes = total_bytes,
            "assembled media object"
        );

        Ok(MediaItem {
            id: key.rsplit('/').next().unwrap_or(&key).to_string(),
            url: put.url,
            name,
            subtitle: req.subtitle,
            category: req.category,
            media_type,
            uploaded_at: now,
            size_bytes: total_bytes,
        })
    }

    /// Best-effort removal of every temp chunk for a transfer. Failures are
    /// logged and swallowed: leftover temp blobs are a cost leak, not a
    /// correctness problem, and the caller may already hold a valid result.
    async fn cleanup_chunks(&self, file_id: &str) {
        let prefix = codec::chunk_prefix(&self.config.temp_prefix, file_id);
        let listing = match self.store.list(&prefix).await {
            Ok(listing) => listing,
            Err(err) => {
                warn!(file_id, error = %err, "failed to list temp chunks for cleanup");
                return;
            }
        };
        for info in listing {
            if let Err(err) = self.store.delete(&info.key).await {
                warn!(file_id, key = %info.key, error = %err, "failed to delete temp chunk");
            }
        }
    }
}
