//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations preview generation
//! needs: identify and preview. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::PreviewParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize and blur `params.source` into `params.output`.
    fn preview(&self, params: &PreviewParams) -> Result<(), BackendError>;
}
