use thiserror::Error;

/// Result type for gallery operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Errors that can occur in the upload pipeline and gallery operations
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Incomplete assembly: expected {expected} chunks, found {found}")]
    IncompleteAssembly { expected: u32, found: u32 },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl GalleryError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an incomplete assembly error
    pub fn incomplete(expected: u32, found: u32) -> Self {
        Self::IncompleteAssembly { expected, found }
    }
}
