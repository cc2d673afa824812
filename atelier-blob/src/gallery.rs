use std::sync::Arc;

use crate::{
    codec, BlobStore, Category, ChunkReceiver, ChunkResult, ChunkUpload, GalleryConfig,
    GalleryError, GalleryResult, MediaItem,
};

/// The gallery facade services embed: chunk ingestion plus the media
/// operations that derive everything from blob paths.
pub struct GalleryAdapter {
    store: Arc<dyn BlobStore>,
    receiver: ChunkReceiver,
    config: GalleryConfig,
}

impl GalleryAdapter {
    pub fn new<S: BlobStore + 'static>(store: S, config: GalleryConfig) -> Self {
        Self::with_store(Arc::new(store), config)
    }

    pub fn with_store(store: Arc<dyn BlobStore>, config: GalleryConfig) -> Self {
        let receiver = ChunkReceiver::with_store(Arc::clone(&store), config.clone());
        Self {
            store,
            receiver,
            config,
        }
    }

    /// Accept one chunk of a transfer (see [`ChunkReceiver::receive`])
    pub async fn upload_chunk(&self, upload: ChunkUpload) -> GalleryResult<ChunkResult> {
        self.receiver.receive(upload).await
    }

    /// Derive the gallery's media items from the blob listing.
    ///
    /// Every path decodes to something - entries from older naming schemes
    /// degrade to fallback fields rather than disappearing or erroring.
    pub async fn list_media(&self, category: Option<Category>) -> GalleryResult<Vec<MediaItem>> {
        let prefix = format!("{}/", self.config.gallery_prefix);
        let listing = self.store.list(&prefix).await?;

        let mut items: Vec<MediaItem> = listing
            .into_iter()
            .map(|info| {
                let decoded = codec::decode_media_key(&info.key, info.content_type.as_deref());
                MediaItem {
                    id: info.key.rsplit('/').next().unwrap_or(&info.key).to_string(),
                    url: info.url,
                    name: decoded.name,
                    subtitle: None,
                    category: decoded.category,
                    media_type: decoded.media_type,
                    uploaded_at: info.uploaded_at.unwrap_or_default(),
                    size_bytes: info.size_bytes,
                }
            })
            .filter(|item| category.map_or(true, |c| item.category == c))
            .collect();

        items.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(items)
    }

    /// Delete a final media object by its id (the filename segment)
    pub async fn delete_media(&self, id: &str) -> GalleryResult<()> {
        if id.is_empty() || id.contains('/') {
            return Err(GalleryError::invalid(format!("Invalid media id: {id}")));
        }
        self.store
            .delete(&format!("{}/{}", self.config.gallery_prefix, id))
            .await
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }
}
