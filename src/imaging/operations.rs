//! High-level image operations.
//!
//! These functions combine calculations with backend execution.

use super::backend::{BackendError, ImageBackend};
use super::calculations::preview_dimensions;
use super::params::{Blur, PreviewParams};
use std::path::{Path, PathBuf};

/// Tallest preview we will allocate.
pub const MAX_PREVIEW_HEIGHT: u32 = 4096;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for preview generation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    pub width: u32,
    pub blur: Blur,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 100,
            blur: Blur::default(),
        }
    }
}

/// A preview written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPreview {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Output file name for a source: the source file name, lower-cased.
pub fn preview_file_name(source: &Path) -> Option<String> {
    source
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
}

/// Plan a preview operation without executing it.
pub fn plan_preview(
    source: &Path,
    output_dir: &Path,
    original_dims: (u32, u32),
    config: &PreviewConfig,
) -> Result<PreviewParams> {
    let name = preview_file_name(source).ok_or_else(|| {
        BackendError::ProcessingFailed(format!("No file name in {}", source.display()))
    })?;
    let (width, height) = preview_dimensions(original_dims, config.width);
    if height > MAX_PREVIEW_HEIGHT {
        return Err(BackendError::ProcessingFailed(format!(
            "Preview of {} would be {}x{}, taller than {}",
            source.display(),
            width,
            height,
            MAX_PREVIEW_HEIGHT
        )));
    }

    Ok(PreviewParams {
        source: source.to_path_buf(),
        output: output_dir.join(name),
        width,
        height,
        blur: config.blur,
    })
}

/// Create the blurred preview of `source` inside `output_dir`.
pub fn create_preview(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    config: &PreviewConfig,
) -> Result<GeneratedPreview> {
    let dims = get_dimensions(backend, source)?;
    let params = plan_preview(source, output_dir, dims, config)?;
    backend.preview(&params)?;

    Ok(GeneratedPreview {
        output: params.output,
        width: params.width,
        height: params.height,
    })
}
