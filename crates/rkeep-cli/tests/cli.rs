use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECEIPT: &str = "CORNER MARKET\nMilk 3.49\nBread 2.99\nSubtotal 38.50\nHST 3.50\nTotal $42.00\nThank you!\n";

fn rkeep() -> Command {
    let mut cmd = Command::cargo_bin("rkeep").unwrap();
    // Never pick up a config file from the machine running the tests.
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-rkeep-config");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_extract_text_receipt() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "receipt.txt", RECEIPT);

    rkeep()
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"found\""))
        .stdout(predicate::str::contains("\"amount\": \"42.00\""));
}

#[test]
fn test_extract_text_format() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "receipt.txt", "Tip $5.00 Total $47.00\n");

    rkeep()
        .args(["extract", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: not found"))
        .stdout(predicate::str::contains("Recognized text:"));
}

#[test]
fn test_extract_missing_input() {
    rkeep()
        .args(["extract", "/nonexistent/receipt.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_extract_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "receipt.pdf", RECEIPT);

    rkeep()
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_scan_auto_confirm() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "receipt.txt", RECEIPT);

    rkeep()
        .args(["scan", "--yes", "--category", "grocery", "--date", "2024-03-15"])
        .args(["--description", "weekly shop"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount\": \"42.00\""))
        .stdout(predicate::str::contains("\"category\": \"Grocery\""))
        .stdout(predicate::str::contains("\"date\": \"2024-03-15\""))
        .stdout(predicate::str::contains("weekly shop"));
}

#[test]
fn test_scan_writes_draft_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "receipt.txt", RECEIPT);
    let output = dir.path().join("draft.json");

    rkeep()
        .args(["scan", "--yes", "--category", "Eating Out"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let draft: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(draft["amount"], "42.00");
    assert_eq!(draft["category"], "Eating Out");
}

#[test]
fn test_scan_without_total_falls_back_to_manual_review() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "receipt.txt", "PARKING STUB\nLevel 2\nThank you\n");

    rkeep()
        .args(["scan", "--yes"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No amount recorded"))
        .stderr(predicate::str::contains("PARKING STUB"));
}

#[test]
fn test_scan_unknown_category() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "receipt.txt", RECEIPT);

    rkeep()
        .args(["scan", "--yes", "--category", "Snacks"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

#[test]
fn test_batch_summary() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", RECEIPT);
    write(&dir, "b.txt", "No totals on this one\n");
    let out_dir = dir.path().join("out");

    rkeep()
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 files"));

    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,total"));
    assert!(summary.contains("a.txt,found,42.00"));
    assert!(summary.contains("b.txt,not_found"));
    assert!(out_dir.join("a.json").exists());
}

#[test]
fn test_batch_no_matches() {
    let dir = TempDir::new().unwrap();

    rkeep()
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    rkeep()
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    rkeep()
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    rkeep()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.tip_window_chars"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100"));
}

#[test]
fn test_config_set_changes_extraction() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let input = write(&dir, "receipt.txt", "Importe 12.30\n");

    rkeep()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.primary_keywords", r#"["Importe"]"#])
        .assert()
        .success();

    rkeep()
        .arg("--config")
        .arg(&config)
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount\": \"12.30\""));
}

#[test]
fn test_config_set_rejects_empty_tip_keywords() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    rkeep()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.tip_keywords", "[]"])
        .assert()
        .failure();

    assert!(!config.exists());
}
