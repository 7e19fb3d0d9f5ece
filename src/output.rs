//! CLI output formatting for both commands.
//!
//! Output leads with what was produced (the post key, each preview) and shows
//! paths and details as indented context lines.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! Post notion-1267… → content/blog/notion-1267….html (created)
//!     Title: How I built a thermostat
//!     Tags: diy, electronics
//!     Date: 2024-05-06T07:08:09.000Z
//!     Slug: thermostat
//!     Draft: false
//!     Body: header removed, 3 links decoded, 1 map embedded, 2 assets stripped, 4 images lazy
//! ```
//!
//! ## Previews
//!
//! ```text
//! Previews images/ → images/previews/
//! 001 a.jpg → a.jpg (100x75)
//! 002 broken.jpg
//!     Error: Processing failed: ...
//! 003 c.PNG → c.png (100x100)
//!
//! Generated 2 previews, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure, no I/O.

use crate::convert::ConvertReport;
use crate::previews::{PreviewOutcome, PreviewReport};
use crate::transform::TransformStats;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// One-line summary of what the transform changed.
fn body_summary(stats: &TransformStats) -> String {
    let mut parts = Vec::new();
    if stats.header_removed {
        parts.push("header removed".to_string());
    }
    if stats.links_decoded > 0 {
        parts.push(plural(stats.links_decoded, "link decoded", "links decoded"));
    }
    if stats.maps_embedded > 0 {
        parts.push(plural(stats.maps_embedded, "map embedded", "maps embedded"));
    }
    if stats.assets_stripped > 0 {
        parts.push(plural(stats.assets_stripped, "asset stripped", "assets stripped"));
    }
    if stats.images_lazy > 0 {
        parts.push(plural(stats.images_lazy, "image lazy", "images lazy"));
    }
    if parts.is_empty() {
        "unchanged".to_string()
    } else {
        parts.join(", ")
    }
}

// ============================================================================
// Convert
// ============================================================================

/// Format the result of a `convert` run.
pub fn format_convert_report(report: &ConvertReport) -> Vec<String> {
    let status = match (report.rendered.is_some(), report.created) {
        (true, _) => "dry run",
        (false, true) => "created",
        (false, false) => "updated",
    };
    let mut lines = vec![format!(
        "Post {} \u{2192} {} ({})",
        report.key,
        report.path.display(),
        status
    )];

    let fm = &report.front_matter;
    let ctx = indent(1);
    if let Some(title) = &fm.title {
        lines.push(format!("{ctx}Title: {title}"));
    }
    if let Some(tags) = &fm.tags {
        let tags = if tags.is_empty() {
            "(none)".to_string()
        } else {
            tags.join(", ")
        };
        lines.push(format!("{ctx}Tags: {tags}"));
    }
    if let Some(date) = &fm.date {
        lines.push(format!("{ctx}Date: {date}"));
    }
    if let Some(slug) = &fm.slug {
        lines.push(format!("{ctx}Slug: {slug}"));
    }
    if let Some(draft) = fm.draft {
        lines.push(format!("{ctx}Draft: {draft}"));
    }
    lines.push(format!("{ctx}Body: {}", body_summary(&report.stats)));
    lines
}

pub fn print_convert_report(report: &ConvertReport) {
    for line in format_convert_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Previews
// ============================================================================

/// Format the result of a `previews` run.
pub fn format_preview_report(report: &PreviewReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Previews {} \u{2192} {}",
        report.input_dir.display(),
        report.output_dir.display()
    )];

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let index = format_index(i + 1);
        match outcome {
            PreviewOutcome::Generated { source, preview } => lines.push(format!(
                "{} {} \u{2192} {} ({}x{})",
                index,
                file_name(source),
                file_name(&preview.output),
                preview.width,
                preview.height
            )),
            PreviewOutcome::Failed { source, error } => {
                lines.push(format!("{} {}", index, file_name(source)));
                lines.push(format!("{}Error: {}", indent(1), error));
            }
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "Generated {}",
        plural(report.generated(), "preview", "previews")
    );
    if report.failed() > 0 {
        summary.push_str(&format!(", {} failed", report.failed()));
    }
    lines.push(summary);
    lines
}

pub fn print_preview_report(report: &PreviewReport) {
    for line in format_preview_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_matter::FrontMatter;
    use crate::imaging::GeneratedPreview;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn convert_report() -> ConvertReport {
        ConvertReport {
            key: "notion-abc".into(),
            path: PathBuf::from("content/blog/notion-abc.html"),
            created: true,
            front_matter: FrontMatter {
                title: Some("Hello".into()),
                tags: Some(vec!["a".into(), "b".into()]),
                date: Some("2024-05-06T07:08:09.000Z".into()),
                slug: None,
                draft: Some(false),
            },
            stats: TransformStats {
                header_removed: true,
                links_decoded: 1,
                maps_embedded: 0,
                assets_stripped: 2,
                images_lazy: 0,
            },
            rendered: None,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn convert_report_lines() {
        assert_eq!(
            format_convert_report(&convert_report()),
            vec![
                "Post notion-abc \u{2192} content/blog/notion-abc.html (created)",
                "    Title: Hello",
                "    Tags: a, b",
                "    Date: 2024-05-06T07:08:09.000Z",
                "    Draft: false",
                "    Body: header removed, 1 link decoded, 2 assets stripped",
            ]
        );
    }

    #[test]
    fn convert_report_status() {
        let mut report = convert_report();
        report.created = false;
        assert!(format_convert_report(&report)[0].ends_with("(updated)"));
        report.rendered = Some(String::new());
        assert!(format_convert_report(&report)[0].ends_with("(dry run)"));
    }

    #[test]
    fn body_summary_unchanged() {
        assert_eq!(body_summary(&TransformStats::default()), "unchanged");
    }

    #[test]
    fn preview_report_lines() {
        let report = PreviewReport {
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("images/previews"),
            outcomes: vec![
                PreviewOutcome::Generated {
                    source: PathBuf::from("images/a.jpg"),
                    preview: GeneratedPreview {
                        output: PathBuf::from("images/previews/a.jpg"),
                        width: 100,
                        height: 75,
                    },
                },
                PreviewOutcome::Failed {
                    source: PathBuf::from("images/broken.jpg"),
                    error: "bad data".into(),
                },
            ],
        };

        assert_eq!(
            format_preview_report(&report),
            vec![
                "Previews images \u{2192} images/previews",
                "001 a.jpg \u{2192} a.jpg (100x75)",
                "002 broken.jpg",
                "    Error: bad data",
                "",
                "Generated 1 preview, 1 failed",
            ]
        );
    }

    #[test]
    fn preview_report_empty() {
        let report = PreviewReport {
            input_dir: PathBuf::from("empty"),
            output_dir: PathBuf::from("empty/previews"),
            outcomes: vec![],
        };
        assert_eq!(
            format_preview_report(&report).last().unwrap(),
            "Generated 0 previews"
        );
    }
}
