use bytes::Bytes;
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use uuid::Uuid;

use crate::Category;

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Token correlating all chunks of one logical file transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    /// Generate a new file id: random token plus the creation time
    pub fn new() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}",
            &token[..12],
            chrono::Utc::now().timestamp_millis()
        ))
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media object, derived from content type or file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi", "mkv", "m4v"];

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Extension used when the original name carries none
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaType::Image => "jpg",
            MediaType::Video => "mp4",
        }
    }

    /// Derive the media type: content type first, extension second, image default
    pub fn from_hints(content_type: Option<&str>, extension: Option<&str>) -> Self {
        if let Some(ct) = content_type {
            if ct.starts_with("video/") {
                return MediaType::Video;
            }
            if ct.starts_with("image/") {
                return MediaType::Image;
            }
        }
        if let Some(ext) = extension {
            if VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                return MediaType::Video;
            }
        }
        MediaType::Image
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A gallery media object, derived from its final blob path.
///
/// There is no media table anywhere; every field here is recoverable
/// from the blob store listing plus the filename codec.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Final blob filename (last path segment), unique within the store
    pub id: String,
    /// Resolved object URL
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub category: Category,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Epoch milliseconds of the final object's creation
    pub uploaded_at: i64,
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

/// One chunk of a multi-part transfer, as it arrives off the wire.
///
/// Field values are raw strings on purpose: the receiver owns validation,
/// so a transport layer can pass form fields through untouched.
#[derive(Debug, Clone)]
pub struct ChunkUpload {
    pub chunk: Bytes,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub file_id: String,
    pub original_name: String,
    pub category: String,
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub content_type: Option<String>,
}

impl ChunkUpload {
    pub fn new(
        file_id: impl Into<String>,
        chunk_index: u32,
        total_chunks: u32,
        original_name: impl Into<String>,
        category: impl Into<String>,
        chunk: Bytes,
    ) -> Self {
        Self {
            chunk,
            chunk_index,
            total_chunks,
            file_id: file_id.into(),
            original_name: original_name.into(),
            category: category.into(),
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

/// Result of receiving one chunk
#[derive(Debug, Clone)]
pub enum ChunkResult {
    /// Chunk stored, transfer still in progress
    Partial {
        chunk_index: u32,
        total_chunks: u32,
    },
    /// All chunks received, final object assembled and published
    Complete { media: MediaItem },
}
