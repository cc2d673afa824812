use std::sync::Arc;

use atelier_blob::GalleryAdapter;

/// Shared state for the media routes
#[derive(Clone)]
pub struct AtelierState {
    pub adapter: Arc<GalleryAdapter>,
}
