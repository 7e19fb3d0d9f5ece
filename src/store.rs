//! Post files on disk.
//!
//! Each post lives at `<output_dir>/<key>.<extension>` and is rewritten whole
//! on every run. A missing file is the normal first-run case and reads as
//! `None`.

use crate::config::PostsConfig;
use crate::front_matter::{self, FrontMatter, FrontMatterError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid post key {0:?}")]
    InvalidKey(String),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}

/// A post: its key, metadata block and HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub key: String,
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Post {
    /// Full file content: front matter block, a blank line, then the body.
    pub fn render(&self) -> Result<String, FrontMatterError> {
        Ok(format!("{}\n{}", self.front_matter.to_block()?, self.body))
    }

    /// Parse file content written by [`Post::render`].
    pub fn parse(key: &str, content: &str) -> Result<Self, FrontMatterError> {
        let front_matter = FrontMatter::parse(content)?;
        let body = match front_matter::split(content) {
            Some((_, body)) => body.strip_prefix('\n').unwrap_or(body),
            None => content,
        };
        Ok(Self {
            key: key.to_string(),
            front_matter,
            body: body.to_string(),
        })
    }
}

/// Directory of post files addressed by key.
#[derive(Debug, Clone)]
pub struct PostStore {
    root: PathBuf,
    extension: String,
}

impl PostStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &PostsConfig) -> Self {
        Self::new(&config.output_dir, &config.extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output path for `key`.
    ///
    /// Keys are single file stems: no separators, not `.` or `..`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let invalid = key.trim().is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\'])
            || key.contains('\0');
        if invalid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.{}", self.extension)))
    }

    /// Read the stored post, `None` if it does not exist yet.
    pub fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    /// Front matter of the stored post, `None` if the post does not exist yet.
    ///
    /// A stored post without a block yields an empty mapping.
    pub fn load_front_matter(&self, key: &str) -> Result<Option<FrontMatter>, StoreError> {
        let path = self.path_for(key)?;
        let Some(content) = self.read(key)? else {
            tracing::debug!(key, "no existing post");
            return Ok(None);
        };
        FrontMatter::parse(&content)
            .map(Some)
            .map_err(|source| StoreError::FrontMatter { path, source })
    }

    /// Write `content` for `key`, creating directories and replacing any previous file.
    pub fn write(&self, key: &str, content: &str) -> Result<PathBuf, StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, content).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = content.len(), "wrote post");
        Ok(path)
    }
}
