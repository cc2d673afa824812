/// Configuration for the upload pipeline and gallery layout
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Fixed chunk size for client-side splitting (bytes). Chosen to stay
    /// safely under the hosting platform's single-request payload ceiling.
    pub chunk_size: usize,

    /// Upper bound on chunks per transfer, to protect listing and memory
    pub max_chunks: u32,

    /// Absolute max size allowed for a single assembled file (safety guard)
    pub max_file_bytes: u64,

    /// Prefix under which final media objects live
    pub gallery_prefix: String,

    /// Prefix under which in-flight chunk objects live
    pub temp_prefix: String,

    /// Length cap for the cleaned name token in final paths
    pub max_name_len: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4 * 1024 * 1024, // 4MiB
            max_chunks: 10_000,
            max_file_bytes: 5 * 1024 * 1024 * 1024, // 5GB
            gallery_prefix: "gallery".to_string(),
            temp_prefix: "temp-chunks".to_string(),
            max_name_len: 30,
        }
    }
}

impl GalleryConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set chunk size
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Set max chunks per transfer
    pub fn with_max_chunks(mut self, max: u32) -> Self {
        self.max_chunks = max;
        self
    }

    /// Set max assembled file size
    pub fn with_max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    /// Set the final-object prefix
    pub fn with_gallery_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.gallery_prefix = prefix.into();
        self
    }

    /// Set the temp-chunk prefix
    pub fn with_temp_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Set the cleaned-name length cap
    pub fn with_max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = len;
        self
    }
}
