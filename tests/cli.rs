use image::{GrayImage, ImageBuffer, Luma};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn stripes(width: u32, height: u32) -> GrayImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let col = x * 9 / width;
        let row = y * 8 / height;
        let step = if row % 2 == 0 { col } else { 8 - col };
        Luma([(20 + step * 25) as u8])
    })
}

fn brightening(width: u32, height: u32) -> GrayImage {
    ImageBuffer::from_fn(width, height, |x, _| Luma([(20 + (x * 9 / width) * 25) as u8]))
}

struct Fixture {
    _temp_dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("photos");
    let output = temp_dir.path().join("unique");
    fs::create_dir(&input).unwrap();
    fs::create_dir(&output).unwrap();

    stripes(100, 100).save(input.join("a.png")).unwrap();
    stripes(200, 200).save(input.join("b.png")).unwrap();
    brightening(90, 80).save(input.join("c.png")).unwrap();
    fs::write(input.join("d.png"), b"corrupt").unwrap();

    Fixture {
        _temp_dir: temp_dir,
        input,
        output,
    }
}

fn imgdedup(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_imgdedup"))
        .args(args)
        .output()
        .expect("failed to run imgdedup")
}

fn dedupe(fixture: &Fixture, extra: &[&str]) -> Output {
    let mut args = vec![
        "dedupe",
        "--path",
        fixture.input.to_str().unwrap(),
        "--output",
        fixture.output.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    imgdedup(&args)
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn dedupe_copies_best_of_each_group() {
    let fixture = fixture();

    let out = dedupe(&fixture, &[]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(entries(&fixture.output), vec!["b.png", "c.png"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Found 1 duplicates"), "{}", stdout);
}

#[test]
fn dry_run_changes_nothing() {
    let fixture = fixture();
    let report = fixture.output.parent().unwrap().join("ignored.jsonl");

    let out = dedupe(&fixture, &["--dry-run", "--report", report.to_str().unwrap()]);

    assert!(out.status.success());
    assert!(entries(&fixture.output).is_empty());
    assert!(!report.exists());
}

#[test]
fn invalid_tolerance_exits_before_scanning() {
    let fixture = fixture();

    for tolerance in ["--tolerance=6", "--tolerance=-1"] {
        let out = dedupe(&fixture, &[tolerance]);

        assert_eq!(out.status.code(), Some(2), "{}", tolerance);
        assert!(entries(&fixture.output).is_empty());
        assert!(!String::from_utf8_lossy(&out.stdout).contains("Scanning"));
    }
}

#[test]
fn unknown_quality_strategy_is_rejected() {
    let fixture = fixture();

    let out = dedupe(&fixture, &["--quality", "sharpness"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("sharpness"));
    assert!(entries(&fixture.output).is_empty());
}

#[test]
fn missing_output_directory_is_rejected() {
    let fixture = fixture();
    let missing = fixture.output.join("nested");

    let out = imgdedup(&[
        "dedupe",
        "--path",
        fixture.input.to_str().unwrap(),
        "--output",
        missing.to_str().unwrap(),
    ]);

    assert_eq!(out.status.code(), Some(2));
    assert!(!missing.exists());
}

#[test]
fn report_is_written_and_listed() {
    let fixture = fixture();
    let report = fixture.output.parent().unwrap().join("decisions.jsonl");

    let out = dedupe(&fixture, &["--report", report.to_str().unwrap(), "--jobs", "2"]);
    assert!(out.status.success());

    let lines = fs::read_to_string(&report).unwrap();
    assert_eq!(lines.lines().count(), 4);
    assert!(lines.contains("\"decision\":\"skipped_decode_error\""));

    let listed = imgdedup(&["report", report.to_str().unwrap()]);
    assert!(listed.status.success());
    let stdout = String::from_utf8_lossy(&listed.stdout);
    assert!(stdout.contains("Found 1 duplicates"), "{}", stdout);
}

#[test]
fn hash_and_compare_print_fingerprints() {
    let fixture = fixture();
    let a = fixture.input.join("a.png");
    let b = fixture.input.join("b.png");

    let hashed = imgdedup(&["hash", a.to_str().unwrap()]);
    assert!(hashed.status.success());
    assert!(String::from_utf8_lossy(&hashed.stdout).starts_with("00ff00ff00ff00ff"));

    let compared = imgdedup(&["compare", a.to_str().unwrap(), b.to_str().unwrap()]);
    assert!(compared.status.success());
    assert!(String::from_utf8_lossy(&compared.stdout).contains("distance: 0"));
}
