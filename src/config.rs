//! Tool configuration module.
//!
//! Handles loading, validating, and merging `notion-press.toml`. Stock
//! defaults are the base layer; a user file overrides any subset of keys.
//! Command-line flags are applied on top by the caller.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [posts]
//! output_dir = "content/blog"   # Where post files are written
//! extension = "html"            # Post file extension
//!
//! [front_matter]
//! default_title = "no-name"     # Title used when none is known
//! draft_policy = "published"    # "published" or "untitled"
//!
//! [transform]
//! lazy_load_images = false
//! map_prefix = "https://www.google.com/maps"
//! strip_assets = ["https://cdnjs.cloudflare.com/ajax/libs/prism/..."]
//! preview_dir = "previews"
//! lazy_class = "lazyload"
//! original_src_attr = "data-src"
//!
//! [previews]
//! width = 100                   # Target width in pixels
//! blur = 8.0                    # Gaussian blur sigma
//! extensions = ["jpg", "jpeg", "png", "webp"]
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::front_matter::DraftPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is not given.
pub const CONFIG_FILENAME: &str = "notion-press.toml";

/// Highlighter assets Notion started embedding next to every code block.
pub const PRISM_SCRIPT: &str = "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0/prism.min.js";
pub const PRISM_STYLESHEET: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0/themes/prism.min.css";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `notion-press.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PressConfig {
    /// Where and how post files are stored.
    pub posts: PostsConfig,
    /// Defaults for the metadata block.
    pub front_matter: FrontMatterConfig,
    /// HTML clean-up rules.
    pub transform: TransformConfig,
    /// Preview image generation.
    pub previews: PreviewsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PressConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.posts.extension;
        if ext.is_empty() || ext.contains('.') || ext.contains('/') {
            return Err(ConfigError::Validation(
                "posts.extension must be a bare extension like \"html\"".into(),
            ));
        }
        if self.front_matter.default_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "front_matter.default_title must not be empty".into(),
            ));
        }
        if self.transform.map_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "transform.map_prefix must not be empty".into(),
            ));
        }
        let dir = &self.transform.preview_dir;
        if dir.is_empty() || dir.contains('/') {
            return Err(ConfigError::Validation(
                "transform.preview_dir must be a single path segment".into(),
            ));
        }
        if self.previews.width == 0 {
            return Err(ConfigError::Validation(
                "previews.width must be non-zero".into(),
            ));
        }
        if !self.previews.blur.is_finite() || self.previews.blur < 0.0 {
            return Err(ConfigError::Validation(
                "previews.blur must be a non-negative number".into(),
            ));
        }
        if self.previews.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "previews.extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Post storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    /// Directory the post files live in.
    pub output_dir: String,
    /// File extension (without the dot).
    pub extension: String,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            output_dir: "content/blog".to_string(),
            extension: "html".to_string(),
        }
    }
}

/// Front matter defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatterConfig {
    /// Sentinel title for posts nobody named yet.
    pub default_title: String,
    /// How the `draft` flag is computed.
    pub draft_policy: DraftPolicy,
}

impl Default for FrontMatterConfig {
    fn default() -> Self {
        Self {
            default_title: "no-name".to_string(),
            draft_policy: DraftPolicy::default(),
        }
    }
}

/// HTML transform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Point images at their blurred previews and keep the original in `original_src_attr`.
    pub lazy_load_images: bool,
    /// Links starting with this prefix become embedded iframes.
    pub map_prefix: String,
    /// Exact `<script src>` / `<link href>` URLs to drop.
    pub strip_assets: Vec<String>,
    /// Directory segment inserted before the image file name.
    pub preview_dir: String,
    /// Class added to lazy images.
    pub lazy_class: String,
    /// Attribute that receives the original image source.
    pub original_src_attr: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            lazy_load_images: false,
            map_prefix: "https://www.google.com/maps".to_string(),
            strip_assets: vec![PRISM_SCRIPT.to_string(), PRISM_STYLESHEET.to_string()],
            preview_dir: "previews".to_string(),
            lazy_class: "lazyload".to_string(),
            original_src_attr: "data-src".to_string(),
        }
    }
}

/// Preview image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewsConfig {
    /// Target width in pixels; height follows the aspect ratio.
    pub width: u32,
    /// Gaussian blur sigma applied after resizing.
    pub blur: f32,
    /// Accepted source extensions, matched case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for PreviewsConfig {
    fn default() -> Self {
        Self {
            width: 100,
            blur: 8.0,
            extensions: ["jpg", "jpeg", "png", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel preview workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PressConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PressConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PressConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<PressConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(overlay)
}

/// Returns a fully-commented stock `notion-press.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# notion-press configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Post files
# ---------------------------------------------------------------------------
[posts]
# Directory that holds one file per post, named <key>.<extension>.
output_dir = "content/blog"
extension = "html"

# ---------------------------------------------------------------------------
# Front matter
# ---------------------------------------------------------------------------
[front_matter]
# Title written when neither --title nor the existing post provides one.
default_title = "no-name"

# How the draft flag is computed:
#   "published" -> always false
#   "untitled"  -> true while the title is still default_title
draft_policy = "published"

# ---------------------------------------------------------------------------
# HTML transform
# ---------------------------------------------------------------------------
[transform]
# Swap <img src> for the blurred preview and keep the original in data-src.
# Run `notion-press previews <image dir>` first.
lazy_load_images = false

# Links starting with this prefix are replaced by an <iframe>.
map_prefix = "https://www.google.com/maps"

# <script src> / <link href> values removed from the export.
strip_assets = [
    "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0/prism.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0/themes/prism.min.css",
]

preview_dir = "previews"
lazy_class = "lazyload"
original_src_attr = "data-src"

# ---------------------------------------------------------------------------
# Preview images
# ---------------------------------------------------------------------------
[previews]
width = 100
blur = 8.0
extensions = ["jpg", "jpeg", "png", "webp"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel preview workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = PressConfig::default();
        assert_eq!(config.posts.output_dir, "content/blog");
        assert_eq!(config.posts.extension, "html");
        assert_eq!(config.front_matter.default_title, "no-name");
        assert_eq!(config.front_matter.draft_policy, DraftPolicy::Published);
        assert!(!config.transform.lazy_load_images);
        assert_eq!(config.transform.map_prefix, "https://www.google.com/maps");
        assert_eq!(config.previews.width, 100);
        assert_eq!(config.previews.blur, 8.0);
        assert_eq!(config.previews.extensions, vec!["jpg", "jpeg", "png", "webp"]);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[front_matter]
draft_policy = "untitled"
"#;
        let config: PressConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.front_matter.draft_policy, DraftPolicy::Untitled);
        // Default values preserved
        assert_eq!(config.front_matter.default_title, "no-name");
        assert_eq!(config.posts.extension, "html");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.posts.output_dir, "content/blog");
        assert_eq!(config.transform.strip_assets.len(), 2);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[posts]
output_dir = "site/posts"

[transform]
lazy_load_images = true
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.posts.output_dir, "site/posts");
        assert!(config.transform.lazy_load_images);
        // Unspecified values should be defaults
        assert_eq!(config.posts.extension, "html");
        assert_eq!(config.transform.lazy_class, "lazyload");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<PressConfig, _> = toml::from_str("[posts]\noutput = \"x\"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_draft_policy_rejected() {
        let result: Result<PressConfig, _> =
            toml::from_str("[front_matter]\ndraft_policy = \"sometimes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(PressConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = PressConfig::default();
        config.posts.extension = ".html".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_width_and_negative_blur() {
        let mut config = PressConfig::default();
        config.previews.width = 0;
        assert!(config.validate().is_err());

        let mut config = PressConfig::default();
        config.previews.blur = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_nested_preview_dir() {
        let mut config = PressConfig::default();
        config.transform.preview_dir = "a/b".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("preview_dir"));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[previews]\nwidth = 0\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[previews]
width = 100
blur = 8.0
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[previews]\nwidth = 60\n").unwrap();
        let merged = merge_toml(base, overlay);
        let previews = merged.get("previews").unwrap();
        assert_eq!(previews.get("width").unwrap().as_integer(), Some(60));
        assert_eq!(previews.get("blur").unwrap().as_float(), Some(8.0));
    }

    #[test]
    fn merge_toml_replaces_arrays_wholesale() {
        let base: toml::Value = toml::from_str("exts = [\"jpg\", \"png\"]").unwrap();
        let overlay: toml::Value = toml::from_str("exts = [\"gif\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("exts").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: PressConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = PressConfig::default();
        assert_eq!(config.posts.output_dir, defaults.posts.output_dir);
        assert_eq!(config.transform.strip_assets, defaults.transform.strip_assets);
        assert_eq!(config.previews.extensions, defaults.previews.extensions);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        for section in ["posts", "front_matter", "transform", "previews", "processing"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }
}
