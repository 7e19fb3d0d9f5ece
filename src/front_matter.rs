//! The metadata block at the top of every post.
//!
//! A post file starts with a YAML mapping framed by `---` lines:
//!
//! ```text
//! ---
//! title: How I built a thermostat
//! tags:
//! - esp32
//! - homekit
//! date: 2024-10-20T09:12:44.120Z
//! slug: how-i-built-a-thermostat
//! draft: false
//! ---
//! <p>…</p>
//! ```
//!
//! ## Merge rules
//!
//! Each run rebuilds the block from three layers, first present value wins:
//!
//! | Field | Override | Previous file | Default |
//! |---|---|---|---|
//! | `title` | `--title` | yes | `default_title` |
//! | `tags` | `--tag` | yes | `[]` |
//! | `date` | `--date` | yes | now |
//! | `slug` | `--slug` | yes | none |
//! | `draft` | | | [`DraftPolicy`] |
//!
//! `date` is therefore written once and survives every later run.

use crate::config::FrontMatterConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Line that opens and closes the block.
pub const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("malformed front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid date {0:?}: expected an RFC 3339 timestamp")]
    InvalidDate(String),
}

/// How the `draft` flag is derived on every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftPolicy {
    /// Never a draft.
    #[default]
    Published,
    /// A draft while the title is still the default title.
    Untitled,
}

/// Recognized front matter fields. Any of them may be missing in a parsed block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
}

/// Values supplied for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub slug: Option<String>,
    pub date: Option<String>,
}

/// Defaults applied when neither overrides nor the previous block have a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    pub default_title: String,
    pub draft: DraftPolicy,
}

impl MergePolicy {
    pub fn from_config(config: &FrontMatterConfig) -> Self {
        Self {
            default_title: config.default_title.clone(),
            draft: config.draft_policy,
        }
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::from_config(&FrontMatterConfig::default())
    }
}

/// Split `content` into its front matter block and the remaining body.
///
/// The block must start on the first line and be closed by a line that is
/// exactly `---`. A leading byte order mark is skipped. Returns `None` when
/// there is no such block.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Format a timestamp the way posts store it: UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Check that a user-supplied date is an RFC 3339 timestamp.
pub fn validate_date(value: &str) -> Result<(), FrontMatterError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| FrontMatterError::InvalidDate(value.to_string()))
}

impl FrontMatter {
    /// Parse the block at the start of `content`.
    ///
    /// Content without a block yields an empty mapping. A block that is not a
    /// YAML mapping is an error.
    pub fn parse(content: &str) -> Result<Self, FrontMatterError> {
        match split(content) {
            Some((block, _)) => Self::from_yaml(block),
            None => Ok(Self::default()),
        }
    }

    fn from_yaml(block: &str) -> Result<Self, FrontMatterError> {
        if block.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(block)?)
    }

    /// Combine `previous` with `overrides` into a complete block.
    ///
    /// The result always has `title`, `tags`, `date` and `draft` set.
    pub fn merge(
        previous: &FrontMatter,
        overrides: &Overrides,
        policy: &MergePolicy,
        now: DateTime<Utc>,
    ) -> FrontMatter {
        let title = overrides
            .title
            .clone()
            .or_else(|| previous.title.clone())
            .unwrap_or_else(|| policy.default_title.clone());
        let tags = overrides
            .tags
            .clone()
            .or_else(|| previous.tags.clone())
            .unwrap_or_default();
        let date = overrides
            .date
            .clone()
            .or_else(|| previous.date.clone())
            .unwrap_or_else(|| format_timestamp(now));
        let slug = overrides.slug.clone().or_else(|| previous.slug.clone());
        let draft = match policy.draft {
            DraftPolicy::Published => false,
            DraftPolicy::Untitled => title == policy.default_title,
        };

        FrontMatter {
            title: Some(title),
            tags: Some(tags),
            date: Some(date),
            slug,
            draft: Some(draft),
        }
    }

    /// Render as a delimited block, ending with a newline.
    ///
    /// Lists come out in serde_yaml's block style, items at column 0
    /// (`tags:\n- a`). Parsing accepts the indented `  - a` form too.
    pub fn to_block(&self) -> Result<String, FrontMatterError> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n"))
    }
}
