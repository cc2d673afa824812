use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    assembler::{AssemblyRequest, Reassembler},
    codec,
    store::stream_bytes,
    BlobStore, Category, ChunkResult, ChunkUpload, GalleryConfig, GalleryError, GalleryResult,
};

/// Accepts one chunk of a multi-part upload at a time.
///
/// Stateless between calls: the only record of an in-flight transfer is
/// the set of temp blobs under its `file_id` prefix. Persisting a chunk is
/// idempotent per `(file_id, chunk_index)` - a retried upload overwrites
/// the same temp path. Arrival of the final index triggers reassembly
/// within the same call.
pub struct ChunkReceiver {
    store: Arc<dyn BlobStore>,
    assembler: Reassembler,
    config: GalleryConfig,
}

impl ChunkReceiver {
    pub fn new<S: BlobStore + 'static>(store: S, config: GalleryConfig) -> Self {
        Self::with_store(Arc::new(store), config)
    }

    pub fn with_store(store: Arc<dyn BlobStore>, config: GalleryConfig) -> Self {
        let assembler = Reassembler::with_store(Arc::clone(&store), config.clone());
        Self {
            store,
            assembler,
            config,
        }
    }

    pub async fn receive(&self, upload: ChunkUpload) -> GalleryResult<ChunkResult> {
        let category = self.validate(&upload)?;

        let key = codec::chunk_key(&self.config.temp_prefix, &upload.file_id, upload.chunk_index);
        self.store
            .put(
                &key,
                Some("application/octet-stream"),
                &BTreeMap::new(),
                stream_bytes(upload.chunk.clone()),
            )
            .await?;
        debug!(
            file_id = %upload.file_id,
            chunk_index = upload.chunk_index,
            total_chunks = upload.total_chunks,
            "stored chunk"
        );

        if upload.chunk_index + 1 < upload.total_chunks {
            return Ok(ChunkResult::Partial {
                chunk_index: upload.chunk_index,
                total_chunks: upload.total_chunks,
            });
        }

        let media = self
            .assembler
            .assemble(AssemblyRequest {
                file_id: upload.file_id,
                total_chunks: upload.total_chunks,
                category,
                original_name: upload.original_name,
                name: upload.name,
                subtitle: upload.subtitle,
                content_type: upload.content_type,
            })
            .await?;

        Ok(ChunkResult::Complete { media })
    }

    /// Reject a bad chunk before any side effect happens
    fn validate(&self, upload: &ChunkUpload) -> GalleryResult<Category> {
        if upload.file_id.is_empty() {
            return Err(GalleryError::invalid("Missing required field: file_id"));
        }
        if upload.file_id.contains('/') {
            return Err(GalleryError::invalid("file_id must not contain '/'"));
        }
        if upload.original_name.is_empty() {
            return Err(GalleryError::invalid(
                "Missing required field: original_name",
            ));
        }
        if upload.category.is_empty() {
            return Err(GalleryError::invalid("Missing required field: category"));
        }
        let category = Category::parse(&upload.category)?;

        if upload.total_chunks == 0 {
            return Err(GalleryError::invalid("total_chunks must be at least 1"));
        }
        if upload.total_chunks > self.config.max_chunks {
            return Err(GalleryError::invalid(format!(
                "total_chunks {} exceeds maximum {}",
                upload.total_chunks, self.config.max_chunks
            )));
        }
        if upload.chunk_index >= upload.total_chunks {
            return Err(GalleryError::invalid(format!(
                "chunk_index {} out of range for {} chunks",
                upload.chunk_index, upload.total_chunks
            )));
        }
        if upload.chunk.is_empty() && upload.total_chunks > 1 {
            return Err(GalleryError::invalid("Missing required field: chunk"));
        }

        Ok(category)
    }
}
