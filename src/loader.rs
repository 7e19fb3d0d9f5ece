//! Reading an exported Notion page into a document tree.
//!
//! Parsing goes through `scraper` (html5ever), which recovers from almost any
//! markup, so the only hard failures are an unreadable file, bytes that are not
//! UTF-8, or a tree without a `<body>`.

use ego_tree::NodeId;
use scraper::{ElementRef, Html};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not valid UTF-8")]
    Encoding(PathBuf),
    #[error("document has no <body> element")]
    MissingBody,
}

/// A parsed HTML page with a known `<body>`.
pub struct Document {
    html: Html,
    body_id: NodeId,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("body_id", &self.body_id)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parse a full HTML document from a string.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let html = Html::parse_document(source);
        let body_id = find_body(&html).ok_or(LoadError::MissingBody)?;
        Ok(Self { html, body_id })
    }

    /// The `<body>` element.
    pub fn body(&self) -> ElementRef<'_> {
        self.html
            .tree
            .get(self.body_id)
            .and_then(ElementRef::wrap)
            .expect("body id was resolved against this tree at parse time")
    }
}

fn find_body(html: &Html) -> Option<NodeId> {
    html.root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .map(|el| el.id())
}

/// Load and parse the HTML file at `path`.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8(bytes).map_err(|_| LoadError::Encoding(path.to_path_buf()))?;
    let document = Document::parse(&source)?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "parsed source document");
    Ok(document)
}
