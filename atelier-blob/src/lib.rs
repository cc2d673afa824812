//! # atelier-blob: chunked media storage for the Atelier gallery
//!
//! `atelier-blob` is the storage core of the Atelier portfolio site: large
//! images and videos are split client-side into fixed-size chunks, each
//! chunk lands as its own temporary blob, and the arrival of the final
//! chunk triggers server-side reassembly into one published object.
//!
//! ## Key ideas
//!
//! - **The path is the schema**: category, display name, and media type are
//!   encoded into the final blob path and decoded back out of it. There is
//!   no media database; object-store metadata is advisory only.
//! - **No transfer ledger**: an in-flight transfer exists only as the temp
//!   blobs listable under its `file_id` prefix. Completion is detected from
//!   the final chunk's index, integrity from counting what was listed.
//! - **Order by parsed index**: chunks are concatenated by the numeric
//!   index recovered from each temp name, never by listing order.
//! - **Storage agnostic**: any backend implementing [`BlobStore`] works;
//!   an S3-compatible store and an in-memory store ship in the crate.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use atelier_blob::prelude::*;
//! use atelier_blob::MemoryBlobStore;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> GalleryResult<()> {
//! let adapter = GalleryAdapter::new(MemoryBlobStore::new(), GalleryConfig::default());
//!
//! // One-chunk transfer: the final chunk completes synchronously
//! let upload = ChunkUpload::new(
//!     "f1a2b3-1722945600000", 0, 1,
//!     "Harvest Table.jpg", "furniture",
//!     Bytes::from_static(b"..."),
//! );
//! if let ChunkResult::Complete { media } = adapter.upload_chunk(upload).await? {
//!     println!("published {} at {}", media.id, media.url);
//! }
//!
//! // The gallery is derived from paths, not rows
//! let items = adapter.list_media(Some(Category::Furniture)).await?;
//! # Ok(())
//! # }
//! ```

pub mod assembler;
mod category;
pub mod codec;
mod config;
mod error;
mod gallery;
mod memory;
mod receiver;
mod s3_store;
mod sender;
pub mod store;
mod types;

// Re-export main types for clean API
pub use assembler::{AssemblyRequest, Reassembler};
pub use category::Category;
pub use config::GalleryConfig;
pub use error::{GalleryError, GalleryResult};
pub use gallery::GalleryAdapter;
pub use memory::MemoryBlobStore;
pub use receiver::ChunkReceiver;
pub use s3_store::{S3CompatibleStore, S3Config};
pub use sender::{
    BatchReport, ChunkSender, ChunkTransport, FailedUpload, UploadPlan, UploadProgress,
    UploadStatus,
};
pub use store::{read_to_end, stream_bytes, BlobInfo, BlobStore, GetResult, PutResult};
pub use types::{ByteStream, ChunkResult, ChunkUpload, FileId, MediaItem, MediaType};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobStore, Category, ChunkReceiver, ChunkResult, ChunkSender, ChunkUpload, GalleryAdapter,
        GalleryConfig, GalleryError, GalleryResult, MediaItem, MediaType,
    };
}
