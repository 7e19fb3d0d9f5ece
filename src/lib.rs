//! # Notion Press
//!
//! Turns pages exported from Notion as HTML into blog posts: a YAML front
//! matter block followed by a cleaned-up HTML body, one file per post.
//! Re-running on the same page updates the post in place and keeps the
//! metadata it already had.
//!
//! # Architecture: Linear Pipeline
//!
//! ```text
//! export.html ─→ load ─→ transform ─→ merge front matter ─→ content/blog/<key>.html
//!                                          ↑
//!                           existing <key>.html (if any)
//! ```
//!
//! A second command, `previews`, produces the small blurred images that
//! lazy-loaded `<img>` tags point at before the real image arrives.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`loader`] | Reads an export file into a parsed tree with a known `<body>` |
//! | [`transform`] | Walks the body and serializes the post HTML (header removal, link decoding, map embeds, asset stripping, lazy images) |
//! | [`front_matter`] | YAML front matter parsing, merging with overrides, rendering |
//! | [`store`] | Post files on disk, keyed by post key |
//! | [`convert`] | The `convert` pipeline tying the above together |
//! | [`naming`] | Post keys and slugs derived from Notion export file names |
//! | [`previews`] | Batch blurred preview generation for a directory |
//! | [`imaging`] | Pure-Rust resize + blur behind a backend trait |
//! | [`config`] | `notion-press.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Walk-and-Serialize, Never Mutate
//!
//! The transform does not edit the parsed tree. It reads the tree once and
//! writes a new string, so a [`loader::Document`] can be shared or reused
//! and the rules stay independent of each other.
//!
//! ## Previous Post as the Metadata Source
//!
//! Title, tags, date and slug survive re-runs because the previous post file
//! is read before writing. A first run stamps the current time; later runs
//! keep that date unless one is passed explicitly.
//!
//! ## Explicit Draft Policy
//!
//! Whether a post is a draft is a config choice (`published` or `untitled`),
//! see [`front_matter::DraftPolicy`].

pub mod config;
pub mod convert;
pub mod front_matter;
pub mod imaging;
pub mod loader;
pub mod naming;
pub mod output;
pub mod previews;
pub mod store;
pub mod transform;
