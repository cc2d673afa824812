use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{
    Category, ChunkReceiver, ChunkResult, ChunkUpload, FileId, GalleryConfig, GalleryError,
    GalleryResult, MediaItem,
};

/// One chunk-upload round trip, however the bytes travel.
///
/// An HTTP client implements this against the chunk endpoint; in-process
/// callers (and tests) use the [`ChunkReceiver`] impl below directly.
#[async_trait]
pub trait ChunkTransport: Send + Sync {
    async fn send(&self, upload: ChunkUpload) -> GalleryResult<ChunkResult>;
}

#[async_trait]
impl ChunkTransport for ChunkReceiver {
    async fn send(&self, upload: ChunkUpload) -> GalleryResult<ChunkResult> {
        self.receive(upload).await
    }
}

/// Per-file upload status as shown in the progress UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Success,
    Error,
}

/// Progress record, keyed by original filename in the sender's registry
#[derive(Debug, Clone, Serialize)]
pub struct UploadProgress {
    /// Percentage of chunks acknowledged, 0-100
    pub progress: u8,
    pub status: UploadStatus,
    pub chunks_uploaded: u32,
    pub total_chunks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One file the sender has been asked to upload
#[derive(Debug, Clone)]
pub struct UploadPlan {
    pub data: Bytes,
    pub original_name: String,
    pub category: Category,
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub content_type: Option<String>,
}

impl UploadPlan {
    pub fn new(original_name: impl Into<String>, category: Category, data: Bytes) -> Self {
        Self {
            data,
            original_name: original_name.into(),
            category,
            name: None,
            subtitle: None,
            content_type: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_subtitle<S: Into<String>>(mut self, subtitle: S) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Aggregate outcome of a multi-file upload. Files that succeeded stay
/// uploaded even when later files fail; there is no rollback.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub uploaded: Vec<MediaItem>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug, Clone)]
pub struct FailedUpload {
    pub file_name: String,
    pub message: String,
}

impl BatchReport {
    pub fn succeeded_count(&self) -> usize {
        self.uploaded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Client-side driver: slices a file into fixed-size chunks and uploads
/// them strictly in order, one at a time.
///
/// Sequential sending keeps the receiver's per-index overwrite semantics
/// sufficient; no cross-chunk coordination exists anywhere. A failed chunk
/// aborts the rest of its file - the human re-clicking upload is the retry
/// mechanism, there is no automatic retry loop here.
pub struct ChunkSender {
    transport: Arc<dyn ChunkTransport>,
    config: GalleryConfig,
    progress: DashMap<String, UploadProgress>,
}

impl ChunkSender {
    pub fn new<T: ChunkTransport + 'static>(transport: T, config: GalleryConfig) -> Self {
        Self::with_transport(Arc::new(transport), config)
    }

    pub fn with_transport(transport: Arc<dyn ChunkTransport>, config: GalleryConfig) -> Self {
        Self {
            transport,
            config,
            progress: DashMap::new(),
        }
    }

    /// Upload one file, reporting progress under its original name
    pub async fn send_file(&self, plan: UploadPlan) -> GalleryResult<MediaItem> {
        let chunk_size = self.config.chunk_size;
        let total_chunks = ((plan.data.len() + chunk_size - 1) / chunk_size).max(1) as u32;

        if plan.data.len() as u64 > self.config.max_file_bytes {
            let err = GalleryError::invalid(format!(
                "File size {} exceeds maximum {}",
                plan.data.len(),
                self.config.max_file_bytes
            ));
            self.record(&plan.original_name, 0, 0, total_chunks, UploadStatus::Error, Some(err.to_string()));
            return Err(err);
        }

        let file_id = FileId::new();
        self.record(&plan.original_name, 0, 0, total_chunks, UploadStatus::Uploading, None);

        for index in 0..total_chunks {
            let start = index as usize * chunk_size;
            let end = (start + chunk_size).min(plan.data.len());
            let chunk = plan.data.slice(start..end);

            let mut upload = ChunkUpload::new(
                file_id.as_str(),
                index,
                total_chunks,
                &plan.original_name,
                plan.category.as_str(),
                chunk,
            );
            if let Some(name) = &plan.name {
                upload = upload.with_name(name.clone());
            }
            if let Some(subtitle) = &plan.subtitle {
                upload = upload.with_subtitle(subtitle.clone());
            }
            if let Some(content_type) = &plan.content_type {
                upload = upload.with_content_type(content_type.clone());
            }

            match self.transport.send(upload).await {
                Ok(ChunkResult::Partial {
                    chunk_index,
                    total_chunks,
                }) => {
                    let done = chunk_index + 1;
                    self.record(
                        &plan.original_name,
                        (done * 100 / total_chunks) as u8,
                        done,
                        total_chunks,
                        UploadStatus::Uploading,
                        None,
                    );
                    debug!(file = %plan.original_name, done, total_chunks, "chunk acknowledged");
                }
                Ok(ChunkResult::Complete { media }) => {
                    self.record(
                        &plan.original_name,
                        100,
                        total_chunks,
                        total_chunks,
                        UploadStatus::Success,
                        None,
                    );
                    return Ok(media);
                }
                Err(err) => {
                    self.record(
                        &plan.original_name,
                        (index * 100 / total_chunks) as u8,
                        index,
                        total_chunks,
                        UploadStatus::Error,
                        Some(err.to_string()),
                    );
                    return Err(err);
                }
            }
        }

        Err(GalleryError::invalid(
            "Transfer ended without a completion response",
        ))
    }

    /// Upload several files in sequence, collecting an aggregate report
    pub async fn send_batch(&self, plans: Vec<UploadPlan>) -> BatchReport {
        let mut report = BatchReport::default();
        for plan in plans {
            let file_name = plan.original_name.clone();
            match self.send_file(plan).await {
                Ok(media) => report.uploaded.push(media),
                Err(err) => report.failed.push(FailedUpload {
                    file_name,
                    message: err.to_string(),
                }),
            }
        }
        report
    }

    /// Current progress record for a file, if it has been seen
    pub fn progress_of(&self, file_name: &str) -> Option<UploadProgress> {
        self.progress.get(file_name).map(|entry| entry.value().clone())
    }

    /// Snapshot of every file's progress record
    pub fn progress_snapshot(&self) -> Vec<(String, UploadProgress)> {
        self.progress
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    fn record(
        &self,
        file_name: &str,
        progress: u8,
        chunks_uploaded: u32,
        total_chunks: u32,
        status: UploadStatus,
        message: Option<String>,
    ) {
        self.progress.insert(
            file_name.to_string(),
            UploadProgress {
                progress,
                status,
                chunks_uploaded,
                total_chunks,
                message,
            },
        );
    }
}
