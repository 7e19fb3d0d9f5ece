//! Post keys and slugs derived from export file names.
//!
//! Notion names exported pages `<Title> <32-hex page id>.html`. The page id is
//! the stable part (it is also the tail of the page URL), so it becomes the
//! post key: `notion-<id>`. Files that do not follow the convention fall back
//! to a slugified stem.
//!
//! - `How I built a thermostat 12677955515e8037be53e7832bb10412.html` → `notion-12677955515e8037be53e7832bb10412`
//! - `Draft notes.html` → `draft-notes`

use std::path::Path;

const NOTION_ID_LEN: usize = 32;
const MAX_SLUG_LEN: usize = 80;

/// Extract the Notion page id from a file stem, if it has one.
pub fn notion_page_id(stem: &str) -> Option<String> {
    let candidate = stem.rsplit([' ', '-']).next()?;
    (candidate.len() == NOTION_ID_LEN && candidate.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| candidate.to_ascii_lowercase())
}

/// Default post key for an exported file.
///
/// Returns `None` when the stem has nothing usable in it.
pub fn post_key_for(source: &Path) -> Option<String> {
    let stem = source.file_stem()?.to_str()?;
    if let Some(id) = notion_page_id(stem) {
        return Some(format!("notion-{id}"));
    }
    let slug = slugify(stem);
    (!slug.is_empty()).then_some(slug)
}

/// Lower-case `text` and reduce it to ASCII alphanumerics separated by single dashes.
///
/// Truncates to `MAX_SLUG_LEN` characters, breaking at the last dash before the limit.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');

    if slug.len() <= MAX_SLUG_LEN {
        return slug.to_string();
    }
    let cut = &slug[..MAX_SLUG_LEN];
    match cut.rfind('-') {
        Some(pos) if pos > 0 => cut[..pos].to_string(),
        _ => cut.to_string(),
    }
}
