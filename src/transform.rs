//! Rewriting the exported `<body>` into post-ready HTML.
//!
//! The transform never mutates the parsed tree. It walks the body once and
//! serializes a new string, applying these rules on the way:
//!
//! | Element | Rule |
//! |---|---|
//! | first `<header>` | dropped with its subtree (Notion's title block) |
//! | `<a href>` | href percent-decoded; map links become `<iframe>` |
//! | `<script src>` / `<link href>` | dropped when the URL is a known highlighter asset |
//! | `<img src>` | pointed at its blurred preview when lazy loading is on |
//!
//! Only the body's children are emitted, never the `<body>` tag itself.

use crate::config::TransformConfig;
use crate::loader::Document;
use ego_tree::{NodeId, NodeRef};
use maud::html;
use scraper::{ElementRef, Node};
use std::borrow::Cow;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text children are emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script",
    "style",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
];

/// Rules for one transform run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    pub lazy_load_images: bool,
    pub map_prefix: String,
    pub strip_assets: Vec<String>,
    pub preview_dir: String,
    pub lazy_class: String,
    pub original_src_attr: String,
}

impl TransformOptions {
    pub fn from_config(config: &TransformConfig) -> Self {
        Self {
            lazy_load_images: config.lazy_load_images,
            map_prefix: config.map_prefix.clone(),
            strip_assets: config.strip_assets.clone(),
            preview_dir: config.preview_dir.clone(),
            lazy_class: config.lazy_class.clone(),
            original_src_attr: config.original_src_attr.clone(),
        }
    }
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self::from_config(&TransformConfig::default())
    }
}

/// What a transform run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub header_removed: bool,
    pub links_decoded: usize,
    pub maps_embedded: usize,
    pub assets_stripped: usize,
    pub images_lazy: usize,
}

/// Serialized body plus the stats of how it was produced.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub html: String,
    pub stats: TransformStats,
}

/// Transform a loaded document's body.
pub fn transform_document(document: &Document, options: &TransformOptions) -> Transformed {
    transform(document.body(), options)
}

/// Transform the children of `body` into a new HTML string.
pub fn transform(body: ElementRef<'_>, options: &TransformOptions) -> Transformed {
    let header = first_header(body);
    if header.is_none() {
        tracing::debug!("no <header> element to remove");
    }

    let mut walker = Walker {
        options,
        header,
        stats: TransformStats::default(),
        out: String::new(),
    };
    walker.walk_children(*body, false);

    Transformed {
        html: walker.out,
        stats: walker.stats,
    }
}

fn first_header(body: ElementRef<'_>) -> Option<NodeId> {
    body.descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "header")
        .map(|el| el.id())
}

/// Percent-decode a link target.
///
/// Malformed escapes are kept as written; a decode that yields invalid UTF-8
/// leaves the whole value untouched.
pub fn decode_href(href: &str) -> Cow<'_, str> {
    match urlencoding::decode(href) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(href),
    }
}

/// Path of the blurred preview for an image source.
///
/// `images/Photo.PNG` → `images/previews/photo.png`. The file name is
/// lower-cased because the preview generator writes lower-cased names.
pub fn preview_src(src: &str, preview_dir: &str) -> String {
    match src.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/{preview_dir}/{}", name.to_lowercase()),
        None => format!("{preview_dir}/{}", src.to_lowercase()),
    }
}

struct Walker<'o> {
    options: &'o TransformOptions,
    header: Option<NodeId>,
    stats: TransformStats,
    out: String,
}

impl Walker<'_> {
    fn walk_children(&mut self, node: NodeRef<'_, Node>, raw_text: bool) {
        for child in node.children() {
            self.walk(child, raw_text);
        }
    }

    fn walk(&mut self, node: NodeRef<'_, Node>, raw_text: bool) {
        match node.value() {
            Node::Text(text) => {
                if raw_text {
                    self.out.push_str(text);
                } else {
                    push_escaped_text(&mut self.out, text);
                }
            }
            Node::Comment(comment) => {
                self.out.push_str("<!--");
                self.out.push_str(comment);
                self.out.push_str("-->");
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(node) {
                    self.element(el);
                }
            }
            _ => {}
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        if self.header == Some(el.id()) {
            self.stats.header_removed = true;
            return;
        }

        let name = el.value().name();
        match name {
            "a" => self.anchor(el),
            "script" if self.is_stripped(el.value().attr("src")) => {
                self.stats.assets_stripped += 1;
            }
            "link" if self.is_stripped(el.value().attr("href")) => {
                self.stats.assets_stripped += 1;
            }
            "img" if self.options.lazy_load_images && el.value().attr("src").is_some() => {
                self.lazy_image(el)
            }
            _ => {
                let attrs: Vec<_> = attributes(el).map(|(k, v)| (k, Cow::Borrowed(v))).collect();
                self.emit(el, &attrs);
            }
        }
    }

    fn is_stripped(&self, url: Option<&str>) -> bool {
        url.is_some_and(|url| self.options.strip_assets.iter().any(|a| a == url))
    }

    fn anchor(&mut self, el: ElementRef<'_>) {
        let Some(href) = el.value().attr("href") else {
            let attrs: Vec<_> = attributes(el).map(|(k, v)| (k, Cow::Borrowed(v))).collect();
            self.emit(el, &attrs);
            return;
        };

        let decoded = decode_href(href);
        if decoded != href {
            self.stats.links_decoded += 1;
        }

        if decoded.starts_with(&self.options.map_prefix) {
            tracing::debug!(src = %decoded, "embedding map link as iframe");
            self.stats.maps_embedded += 1;
            let iframe = html! { iframe src=(&*decoded) {} };
            self.out.push_str(&iframe.into_string());
            return;
        }

        let attrs: Vec<_> = attributes(el)
            .map(|(k, v)| {
                if k == "href" {
                    (k, decoded.clone())
                } else {
                    (k, Cow::Borrowed(v))
                }
            })
            .collect();
        self.emit(el, &attrs);
    }

    fn lazy_image(&mut self, el: ElementRef<'_>) {
        let opts = self.options;
        let src = el.value().attr("src").unwrap_or_default();
        let preview = preview_src(src, &opts.preview_dir);

        let mut attrs: Vec<(Cow<'_, str>, Cow<'_, str>)> = Vec::new();
        let mut has_class = false;
        for (k, v) in attributes(el) {
            if k == opts.original_src_attr.as_str() {
                continue;
            }
            match &*k {
                "src" => attrs.push((k, Cow::Owned(preview.clone()))),
                "class" => {
                    has_class = true;
                    if v.split_whitespace().any(|c| c == opts.lazy_class) {
                        attrs.push((k, Cow::Borrowed(v)));
                    } else if v.trim().is_empty() {
                        attrs.push((k, Cow::Borrowed(opts.lazy_class.as_str())));
                    } else {
                        attrs.push((k, Cow::Owned(format!("{} {}", v.trim(), opts.lazy_class))));
                    }
                }
                _ => attrs.push((k, Cow::Borrowed(v))),
            }
        }
        attrs.push((
            Cow::Borrowed(opts.original_src_attr.as_str()),
            Cow::Borrowed(src),
        ));
        if !has_class {
            attrs.push((Cow::Borrowed("class"), Cow::Borrowed(opts.lazy_class.as_str())));
        }

        self.stats.images_lazy += 1;
        self.emit(el, &attrs);
    }

    /// Write an element with the given attributes, then its children.
    fn emit(&mut self, el: ElementRef<'_>, attrs: &[(Cow<'_, str>, Cow<'_, str>)]) {
        let name = el.value().name();
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            push_escaped_attr(&mut self.out, value);
            self.out.push('"');
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.walk_children(*el, RAW_TEXT_ELEMENTS.contains(&name));
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }
}

/// Attributes under their qualified names, so `xlink:href` keeps its prefix.
fn attributes<'a>(el: ElementRef<'a>) -> impl Iterator<Item = (Cow<'a, str>, &'a str)> {
    el.value().attrs.iter().map(|(name, value)| {
        let key = match &name.prefix {
            Some(prefix) => Cow::Owned(format!("{prefix}:{}", name.local)),
            None => Cow::Borrowed(&*name.local),
        };
        (key, &**value)
    })
}

fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
