mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use image::GenericImageView;
use minikyu::OutputFormat;
use predicates::prelude::*;

fn minikyu() -> Command {
    Command::cargo_bin("minikyu").unwrap()
}

#[test]
fn test_cli_help() {
    minikyu()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_subcommand_help() {
    for sub in ["process", "batch", "info", "formats"] {
        minikyu().args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_process_missing_args() {
    minikyu().arg("process").assert().failure();
}

#[test]
fn test_process_nonexistent_file() {
    minikyu()
        .args(["process", "nonexistent.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_process_invalid_quality() {
    let temp = TempDir::new().unwrap();
    let input = common::write_image(temp.path(), "photo.png", 16, 16, OutputFormat::Png);

    minikyu()
        .args(["process", input.to_str().unwrap(), "-q", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quality"));
}

#[test]
fn test_process_unknown_format() {
    let temp = TempDir::new().unwrap();
    let input = common::write_image(temp.path(), "photo.png", 16, 16, OutputFormat::Png);

    minikyu()
        .args(["process", input.to_str().unwrap(), "-f", "gif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn test_process_fake_image_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("fake.jpg");
    input.write_binary(b"fake image data").unwrap();

    minikyu()
        .args(["process", input.path().to_str().unwrap()])
        .assert()
        .failure();
    temp.child("fake-minikyu.jpg").assert(predicate::path::missing());
}

#[test]
fn test_process_writes_next_to_input() {
    let temp = TempDir::new().unwrap();
    let input = common::write_image(temp.path(), "photo.png", 40, 30, OutputFormat::Png);

    minikyu()
        .args(["--quiet", "process", input.to_str().unwrap(), "-f", "webp", "-w", "20"])
        .assert()
        .success();

    let output = temp.child("photo-minikyu.webp");
    output.assert(predicate::path::is_file());
    let bytes = std::fs::read(output.path()).unwrap();
    assert_eq!(minikyu::detect_format(&bytes), Some(OutputFormat::WebP));
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (20, 15));
}

#[test]
fn test_process_explicit_output_and_scale() {
    let temp = TempDir::new().unwrap();
    let input = common::write_image(temp.path(), "shot.jpg", 40, 20, OutputFormat::Jpeg);
    let output = temp.child("out/custom.png");

    minikyu()
        .args([
            "process",
            input.to_str().unwrap(),
            "-o",
            output.path().to_str().unwrap(),
            "-f",
            "png",
            "--scale",
            "50",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("40x20 → 20x10"));

    let bytes = std::fs::read(output.path()).unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (20, 10));
}

#[test]
fn test_batch_missing_args() {
    minikyu().arg("batch").assert().failure();
}

#[test]
fn test_batch_nonexistent_input() {
    let temp = TempDir::new().unwrap();
    minikyu()
        .args(["batch", "nonexistent", temp.path().join("out").to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("No image files found"));
}

#[test]
fn test_batch_empty_directory() {
    let temp = TempDir::new().unwrap();
    let output = temp.child("output");

    minikyu()
        .args(["batch", temp.path().to_str().unwrap(), output.path().to_str().unwrap()])
        .assert()
        .success();
    output.assert(predicate::path::missing());
}

#[test]
fn test_batch_exports_successes_and_skips_failures() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("in");
    input.create_dir_all().unwrap();
    common::write_image(input.path(), "a.png", 24, 24, OutputFormat::Png);
    common::write_image(input.path(), "b.jpg", 24, 24, OutputFormat::Jpeg);
    input.child("broken.png").write_binary(b"broken").unwrap();
    let output = temp.child("out");

    minikyu()
        .args([
            "batch",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "-f",
            "jpeg",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("broken.png"));

    output.child("a-minikyu.jpg").assert(predicate::path::is_file());
    output.child("b-minikyu.jpg").assert(predicate::path::is_file());
    output.child("broken-minikyu.jpg").assert(predicate::path::missing());
}

#[test]
fn test_batch_parallel_recursive() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("in");
    let nested = input.child("nested");
    nested.create_dir_all().unwrap();
    common::write_image(input.path(), "top.png", 16, 16, OutputFormat::Png);
    common::write_image(nested.path(), "deep.png", 16, 16, OutputFormat::Png);
    let output = temp.child("out");

    minikyu()
        .args([
            "--quiet",
            "batch",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "-r",
            "-j",
            "2",
            "-f",
            "png",
        ])
        .assert()
        .success();

    output.child("top-minikyu.png").assert(predicate::path::is_file());
    output.child("deep-minikyu.png").assert(predicate::path::is_file());
}

#[test]
fn test_info_missing_args() {
    minikyu().arg("info").assert().failure();
}

#[test]
fn test_info_nonexistent_file() {
    minikyu().args(["info", "nonexistent.jpg"]).assert().failure();
}

#[test]
fn test_info_fake_image_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.child("test.jpg");
    input.write_binary(b"fake image data").unwrap();

    minikyu()
        .args(["info", input.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_info_real_image() {
    let temp = TempDir::new().unwrap();
    let input = common::write_image(temp.path(), "wide.png", 64, 32, OutputFormat::Png);

    minikyu()
        .args(["info", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("64x32"))
        .stdout(predicate::str::contains("image/png"))
        .stdout(predicate::str::contains("2.00:1"));
}

#[test]
fn test_formats_lists_all() {
    minikyu()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("JPEG"))
        .stdout(predicate::str::contains("image/avif"));
}

#[test]
fn test_info_avif_image() {
    let temp = TempDir::new().unwrap();
    let input = common::write_image(temp.path(), "sky.avif", 24, 12, OutputFormat::Avif);

    minikyu()
        .args(["info", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("24x12"))
        .stdout(predicate::str::contains("image/avif"));
}
