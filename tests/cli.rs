//! Integration tests for the notion-press binary.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const EXPORT: &str = r#"<!DOCTYPE html>
<html>
<head><title>Trip</title></head>
<body>
<article>
<header><h1 class="page-title">Trip</h1></header>
<p>Read <a href="https://example.com/caf%C3%A9">this</a>.</p>
<img src="Trip%20abc/IMG_1.JPG">
<script src="https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0/prism.min.js"></script>
</article>
</body>
</html>"#;

const EXPORT_NAME: &str = "Trip 12677955515e8037be53e7832bb10412.html";

/// Runs in `dir` so the default config lookup and output paths stay inside it.
fn press_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("notion-press").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn write_export(dir: &Path) {
    fs::write(dir.join(EXPORT_NAME), EXPORT).unwrap();
}

#[test]
fn convert_writes_post_under_page_id_key() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());

    press_cmd(tmp.path())
        .args(["convert", EXPORT_NAME, "--title", "Trip", "--tag", "travel"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Post notion-12677955515e8037be53e7832bb10412",
        ))
        .stdout(predicate::str::contains("(created)"));

    let post = fs::read_to_string(
        tmp.path()
            .join("content/blog/notion-12677955515e8037be53e7832bb10412.html"),
    )
    .unwrap();
    assert!(post.starts_with("---\ntitle: Trip\ntags:\n- travel\n"));
    assert!(post.contains("draft: false\n---\n"));
    assert!(post.contains(r#"href="https://example.com/café""#));
    assert!(!post.contains("page-title"));
    assert!(!post.contains("prism.min.js"));
}

#[test]
fn convert_respects_key_out_dir_and_lazy_images() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());

    press_cmd(tmp.path())
        .args([
            "convert",
            EXPORT_NAME,
            "--key",
            "trip",
            "--out-dir",
            "posts",
            "--lazy-images",
        ])
        .assert()
        .success();

    let post = fs::read_to_string(tmp.path().join("posts/trip.html")).unwrap();
    assert!(post.contains(r#"src="Trip%20abc/previews/img_1.jpg""#));
    assert!(post.contains(r#"data-src="Trip%20abc/IMG_1.JPG""#));
    assert!(post.contains(r#"class="lazyload""#));
}

#[test]
fn convert_reuses_existing_front_matter() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());
    fs::create_dir_all(tmp.path().join("content/blog")).unwrap();
    fs::write(
        tmp.path().join("content/blog/trip.html"),
        "---\ntitle: Old\ntags:\n- a\ndate: 2020-01-01T00:00:00Z\n---\n<p>old</p>",
    )
    .unwrap();

    press_cmd(tmp.path())
        .args(["convert", EXPORT_NAME, "--key", "trip", "--slug", "trip-2020"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(updated)"))
        .stdout(predicate::str::contains("Title: Old"));

    let post = fs::read_to_string(tmp.path().join("content/blog/trip.html")).unwrap();
    assert!(post.contains("2020-01-01T00:00:00Z"));
    assert!(post.contains("slug: trip-2020"));
    assert!(!post.contains("<p>old</p>"));
}

#[test]
fn dry_run_prints_without_writing() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());

    press_cmd(tmp.path())
        .args(["convert", EXPORT_NAME, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---\ntitle: no-name\n"));

    assert!(!tmp.path().join("content").exists());
}

#[test]
fn config_file_changes_defaults() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());
    fs::write(
        tmp.path().join("notion-press.toml"),
        "[posts]\noutput_dir = \"site/posts\"\nextension = \"md\"\n\n[front_matter]\ndraft_policy = \"untitled\"\n",
    )
    .unwrap();

    press_cmd(tmp.path())
        .args(["convert", EXPORT_NAME, "--key", "cfg"])
        .assert()
        .success();

    let post = fs::read_to_string(tmp.path().join("site/posts/cfg.md")).unwrap();
    assert!(post.contains("draft: true"));
}

#[test]
fn unknown_config_key_fails() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());
    fs::write(tmp.path().join("notion-press.toml"), "[posts]\nouput_dir = \"x\"\n").unwrap();

    press_cmd(tmp.path())
        .args(["convert", EXPORT_NAME])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn missing_source_argument_fails() {
    let tmp = TempDir::new().unwrap();

    press_cmd(tmp.path())
        .arg("convert")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<SOURCE>"));
}

#[test]
fn missing_source_file_fails_with_message() {
    let tmp = TempDir::new().unwrap();

    press_cmd(tmp.path())
        .args(["convert", "nope.html"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nope.html"));
}

#[test]
fn invalid_date_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());

    press_cmd(tmp.path())
        .args(["convert", EXPORT_NAME, "--date", "yesterday"])
        .assert()
        .failure()
        .code(1);

    assert!(!tmp.path().join("content").exists());
}

#[test]
fn gen_config_prints_stock_file() {
    let tmp = TempDir::new().unwrap();

    press_cmd(tmp.path())
        .arg("gen-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[posts]"))
        .stdout(predicate::str::contains("[previews]"));
}

#[test]
fn previews_generates_lowercased_blurred_images() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    fs::create_dir(&images).unwrap();
    image::RgbImage::from_pixel(400, 200, image::Rgb([200, 30, 30]))
        .save(images.join("a.jpg"))
        .unwrap();
    image::RgbImage::from_pixel(50, 50, image::Rgb([30, 200, 30]))
        .save(images.join("c.PNG"))
        .unwrap();
    fs::write(images.join("b.txt"), "notes").unwrap();

    press_cmd(tmp.path())
        .args(["previews", "images", "--width", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 2 previews"));

    let out = images.join("previews");
    assert_eq!(image::image_dimensions(out.join("a.jpg")).unwrap(), (40, 20));
    assert_eq!(image::image_dimensions(out.join("c.png")).unwrap(), (40, 40));
    assert!(!out.join("b.txt").exists());
}

#[test]
fn previews_reports_broken_image_and_fails() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    fs::create_dir(&images).unwrap();
    image::RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0]))
        .save(images.join("ok.png"))
        .unwrap();
    fs::write(images.join("broken.jpg"), "not an image").unwrap();

    press_cmd(tmp.path())
        .args(["previews", "images", "--output", "out"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Generated 1 preview, 1 failed"));

    assert!(tmp.path().join("out/ok.png").exists());
}
