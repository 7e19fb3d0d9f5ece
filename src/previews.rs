//! Blurred placeholder images for lazy loading.
//!
//! Lists the images directly inside a directory and writes a small, blurred
//! copy of each into an output directory (by default `<dir>/previews`, where
//! the transform's lazy-load paths point). Output names are the source file
//! names lower-cased.
//!
//! ```text
//! images/                    images/previews/
//! ├── a.jpg          →       ├── a.jpg
//! ├── b.txt                  └── c.png
//! └── c.PNG
//! ```
//!
//! Images are processed in parallel with rayon. Results come back in source
//! order, and a failing image is recorded in the report without stopping the
//! rest of the batch.

use crate::config::PreviewsConfig;
use crate::imaging::{self, Blur, ImageBackend, RustBackend};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Default output directory name, relative to the source directory.
pub const DEFAULT_OUTPUT_DIR: &str = "previews";

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot list images: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Preview settings for a run: the imaging parameters plus which files qualify.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    pub image: imaging::PreviewConfig,
    pub extensions: Vec<String>,
}

impl PreviewConfig {
    pub fn from_config(config: &PreviewsConfig) -> Self {
        Self {
            image: imaging::PreviewConfig {
                width: config.width,
                blur: Blur::new(config.blur),
            },
            extensions: config.extensions.clone(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self::from_config(&PreviewsConfig::default())
    }
}

/// Whether `path` has one of `extensions`, ignoring case.
pub fn is_preview_source(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

/// Image files directly inside `dir`, sorted by file name.
pub fn collect_sources(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, PreviewError> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_preview_source(entry.path(), extensions) {
            sources.push(entry.into_path());
        } else {
            tracing::debug!(path = %entry.path().display(), "not an image, skipping");
        }
    }
    Ok(sources)
}

/// What happened to one source image.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    Generated {
        source: PathBuf,
        preview: imaging::GeneratedPreview,
    },
    Failed {
        source: PathBuf,
        error: String,
    },
}

impl PreviewOutcome {
    pub fn source(&self) -> &Path {
        match self {
            PreviewOutcome::Generated { source, .. } | PreviewOutcome::Failed { source, .. } => {
                source
            }
        }
    }
}

/// Result of a preview run, outcomes in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub outcomes: Vec<PreviewOutcome>,
}

impl PreviewReport {
    pub fn generated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PreviewOutcome::Generated { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.generated()
    }
}

/// Generate previews for every image in `dir` with the pure Rust backend.
///
/// `output_dir` defaults to `<dir>/previews`.
pub fn generate_previews(
    dir: &Path,
    output_dir: Option<&Path>,
    config: &PreviewConfig,
) -> Result<PreviewReport, PreviewError> {
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(DEFAULT_OUTPUT_DIR));
    generate_previews_with_backend(&RustBackend::new(), dir, &output_dir, config)
}

/// Generate previews with an explicit backend.
pub fn generate_previews_with_backend(
    backend: &impl ImageBackend,
    dir: &Path,
    output_dir: &Path,
    config: &PreviewConfig,
) -> Result<PreviewReport, PreviewError> {
    if !dir.is_dir() {
        return Err(PreviewError::NotADirectory(dir.to_path_buf()));
    }
    let sources = collect_sources(dir, &config.extensions)?;
    std::fs::create_dir_all(output_dir).map_err(|source| PreviewError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    tracing::info!(
        count = sources.len(),
        output = %output_dir.display(),
        "generating previews"
    );

    let outcomes = sources
        .into_par_iter()
        .map(
            |source| match imaging::create_preview(backend, &source, output_dir, &config.image) {
                Ok(preview) => {
                    tracing::debug!(
                        source = %source.display(),
                        output = %preview.output.display(),
                        "preview written"
                    );
                    PreviewOutcome::Generated { source, preview }
                }
                Err(e) => {
                    tracing::warn!(source = %source.display(), error = %e, "preview failed");
                    PreviewOutcome::Failed {
                        source,
                        error: e.to_string(),
                    }
                }
            },
        )
        .collect();

    Ok(PreviewReport {
        input_dir: dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        outcomes,
    })
}
