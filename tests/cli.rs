//! Exit status of the `imgbatch` binary.
//!
//! Each run uses a temp folder as working directory so no `./imgbatch.toml`
//! from the checkout leaks in.

use image::{Rgb, RgbImage};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn imgbatch(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_imgbatch"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run imgbatch")
}

fn folder_with_image() -> TempDir {
    let tmp = TempDir::new().unwrap();
    RgbImage::from_pixel(20, 10, Rgb([120, 60, 30]))
        .save(tmp.path().join("a.png"))
        .unwrap();
    tmp
}

#[test]
fn every_batch_command_fails_on_a_folder_without_images() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("notes.txt"), b"hello").unwrap();
    let dir = tmp.path().to_str().unwrap();

    for args in [
        vec!["grayscale", dir],
        vec!["bw", dir],
        vec!["pdf", dir],
        vec!["resize", dir, "--preset", "1", "--yes"],
    ] {
        let out = imgbatch(tmp.path(), &args);
        assert!(!out.status.success(), "{args:?} exited successfully");
    }
    assert!(!tmp.path().join("output.pdf").exists());
}

#[test]
fn missing_folder_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing");

    let out = imgbatch(tmp.path(), &["grayscale", missing.to_str().unwrap()]);
    assert!(!out.status.success());
}

#[test]
fn grayscale_succeeds_and_writes_sibling() {
    let tmp = folder_with_image();

    let out = imgbatch(tmp.path(), &["grayscale", tmp.path().to_str().unwrap()]);

    assert!(out.status.success());
    assert!(tmp.path().join("a_grayscale.png").exists());
}

#[test]
fn per_file_failures_keep_exit_status_zero() {
    let tmp = folder_with_image();
    std::fs::write(tmp.path().join("broken.png"), b"not a png").unwrap();

    let out = imgbatch(
        tmp.path(),
        &["--json", "bw", tmp.path().to_str().unwrap()],
    );

    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["operation"], "black-and-white");
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 2);
}

#[test]
fn resize_without_yes_is_refused() {
    let tmp = folder_with_image();

    let out = imgbatch(
        tmp.path(),
        &["resize", tmp.path().to_str().unwrap(), "--preset", "6"],
    );

    assert!(!out.status.success());
    assert_eq!(image::image_dimensions(tmp.path().join("a.png")).unwrap(), (20, 10));
}

#[test]
fn invalid_preset_exits_non_zero() {
    let tmp = folder_with_image();

    let out = imgbatch(
        tmp.path(),
        &["resize", tmp.path().to_str().unwrap(), "--preset", "11", "--yes"],
    );

    assert!(!out.status.success());
}
