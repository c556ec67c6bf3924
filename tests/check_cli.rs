//! End-to-end tests for the `folio-media` binary.
//!
//! Each test writes a small content directory to a temp dir and runs the
//! built binary against it.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_folio-media"))
        .arg("--config")
        .arg(config_dir)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn gen_config_prints_both_widgets() {
    let tmp = TempDir::new().unwrap();
    let out = run(&["gen-config"], tmp.path());
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("[avatar]"));
    assert!(text.contains("[gallery]"));
}

#[test]
fn gallery_check_accepts_images_and_pdfs() {
    let tmp = TempDir::new().unwrap();
    let media = tmp.path().join("media");
    fs::create_dir_all(&media).unwrap();
    fs::write(media.join("001-dawn.jpg"), b"jpeg").unwrap();
    fs::write(media.join("002-cv.pdf"), b"pdf").unwrap();

    let out = run(
        &["check", "--widget", "gallery", media.to_str().unwrap()],
        tmp.path(),
    );
    assert!(out.status.success(), "{}", stdout(&out));
    let text = stdout(&out);
    assert!(text.contains("001 001-dawn.jpg"));
    assert!(text.contains("002 002-cv.pdf"));
    assert!(text.contains("==> All files accepted"));
}

#[test]
fn avatar_check_reports_rejections_and_fails() {
    let tmp = TempDir::new().unwrap();
    let media = tmp.path().join("media");
    fs::create_dir_all(&media).unwrap();
    fs::write(media.join("a.png"), b"png").unwrap();
    fs::write(media.join("b.png"), b"png").unwrap();
    fs::write(media.join("0-notes.txt"), b"text").unwrap();

    let out = run(
        &["check", "--widget", "avatar", media.to_str().unwrap()],
        tmp.path(),
    );
    assert!(!out.status.success());
    let text = stdout(&out);
    assert!(text.contains("001 a.png"));
    assert!(text.contains("Rejected"));
    assert!(text.contains("too many files (max 1)"));
    assert!(text.contains("unsupported file type text/plain"));
    assert!(text.contains("==> 2 file(s) rejected"));
}

#[test]
fn config_file_overrides_limits() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("uploads.toml"), "[gallery]\nmax_size = 2\n").unwrap();
    let file = tmp.path().join("big.png");
    fs::write(&file, b"too big").unwrap();

    let out = run(&["check", file.to_str().unwrap()], tmp.path());
    assert!(!out.status.success());
    assert!(stdout(&out).contains("file is too large (7 bytes, max 2)"));
}

#[test]
fn invalid_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("uploads.toml"), "[gallery]\nbogus = 1\n").unwrap();
    let file = tmp.path().join("a.png");
    fs::write(&file, b"png").unwrap();

    let out = run(&["check", file.to_str().unwrap()], tmp.path());
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error"));
}

#[test]
fn gallery_check_accepts_tiff_and_bmp_scans() {
    let tmp = TempDir::new().unwrap();
    let media = tmp.path().join("media");
    fs::create_dir_all(&media).unwrap();
    fs::write(media.join("scan.tiff"), b"tiff").unwrap();
    fs::write(media.join("shot.bmp"), b"bmp").unwrap();

    let out = run(
        &["check", "--widget", "gallery", media.to_str().unwrap()],
        tmp.path(),
    );
    assert!(out.status.success(), "{}", stdout(&out));
    assert!(stdout(&out).contains("==> All files accepted"));
}
