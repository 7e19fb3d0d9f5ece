//! The `convert` pipeline: one exported page in, one post file out.
//!
//! ```text
//! load_document ─→ transform ─→ load previous front matter ─→ merge ─→ render ─→ write
//! ```
//!
//! Each step runs once, in order. Loader and store errors abort the run; a
//! missing header or a missing previous post are normal and handled inside
//! the steps.

use crate::front_matter::{FrontMatter, FrontMatterError, MergePolicy, Overrides};
use crate::loader::{self, LoadError};
use crate::store::{Post, PostStore, StoreError};
use crate::transform::{self, TransformOptions, TransformStats};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
    #[error("cannot derive a post key from {0}, pass --key")]
    NoKey(PathBuf),
}

/// Everything one conversion needs.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub key: String,
    pub overrides: Overrides,
    pub transform: TransformOptions,
    pub policy: MergePolicy,
    /// Render without writing.
    pub dry_run: bool,
}

/// Outcome of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub key: String,
    pub path: PathBuf,
    /// No post existed under this key before.
    pub created: bool,
    pub front_matter: FrontMatter,
    pub stats: TransformStats,
    /// Full post content, kept only for dry runs.
    pub rendered: Option<String>,
}

/// Convert `request.source` into the post `request.key` in `store`.
pub fn convert(
    request: &ConvertRequest,
    store: &PostStore,
    now: DateTime<Utc>,
) -> Result<ConvertReport, ConvertError> {
    let document = loader::load_document(&request.source)?;
    let transformed = transform::transform_document(&document, &request.transform);
    tracing::debug!(stats = ?transformed.stats, "transformed body");

    let path = store.path_for(&request.key)?;
    let previous = store.load_front_matter(&request.key)?;
    let created = previous.is_none();
    let previous = previous.unwrap_or_default();
    let front_matter = FrontMatter::merge(&previous, &request.overrides, &request.policy, now);

    let post = Post {
        key: request.key.clone(),
        front_matter,
        body: transformed.html,
    };
    let content = post.render()?;

    let rendered = if request.dry_run {
        Some(content)
    } else {
        store.write(&request.key, &content)?;
        None
    };
    tracing::info!(key = %request.key, path = %path.display(), created, "converted post");

    Ok(ConvertReport {
        key: post.key,
        path,
        created,
        front_matter: post.front_matter,
        stats: transformed.stats,
        rendered,
    })
}
