//! atelier-axum: Axum adapter for the Atelier gallery backend.
//!
//! Exposes the chunked media upload endpoint and the media list/delete
//! routes over an [`atelier_blob::GalleryAdapter`].

pub mod app;
pub mod rest;
pub mod state;
mod error;

pub use error::AtelierAxumError;
pub use state::AtelierState;

pub use app::AtelierApp;
