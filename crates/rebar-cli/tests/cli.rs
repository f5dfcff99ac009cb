use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rebar(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rebar").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    rebar(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn clean_prints_canonical_codes() {
    let home = TempDir::new().unwrap();
    rebar(home.path())
        .args(["clean", "5 rfi 12/8 cm , L = 3,5m", "5Rf12/8,L=3m"])
        .assert()
        .success()
        .stdout("5Rfi12/8cm,L=3.5m\n5Rfi12/8cm,L=3m\n");
}

#[test]
fn clean_fails_on_invalid_code() {
    let home = TempDir::new().unwrap();
    rebar(home.path())
        .args(["clean", "5Rfi12/8cm,L=3m", "garbage"])
        .assert()
        .failure()
        .stdout("5Rfi12/8cm,L=3m\ninvalid\n")
        .stderr(predicate::str::contains("1 of 2 codes are invalid"));
}

#[test]
fn extract_missing_input_fails() {
    let home = TempDir::new().unwrap();
    rebar(home.path())
        .args(["extract", "no-such-drawing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_rejects_non_pdf() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("schedule.txt");
    fs::write(&input, "5Rfi12/8cm,L=3.5m T1").unwrap();

    rebar(home.path())
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn extract_filtered_requires_codes() {
    let home = TempDir::new().unwrap();
    rebar(home.path())
        .args(["extract", "plan.pdf", "--mode", "filtered"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires at least one code"));
}

#[test]
fn extract_with_missing_config_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("absent.json");

    rebar(home.path())
        .arg("--config")
        .arg(&config)
        .args(["extract", "plan.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn config_init_get_set() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("rebar.json");

    rebar(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    rebar(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    rebar(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "pdf.render_dpi"])
        .assert()
        .success()
        .stdout("500\n");

    rebar(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "ocr.mode", "sparse"])
        .assert()
        .success();

    rebar(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "ocr.mode"])
        .assert()
        .success()
        .stdout("\"sparse\"\n");
}

#[test]
fn config_path_uses_config_home() {
    let home = TempDir::new().unwrap();
    rebar(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rebar"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = home.path().join("*.pdf");

    rebar(home.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn batch_records_failures_in_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    let outputs = home.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("broken.pdf"), "not a pdf").unwrap();

    let pattern = inputs.join("*.pdf");

    rebar(home.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&outputs)
        .args(["--summary", "--continue-on-error", "--native-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 successful, 1 failed"));

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,source,records,with_code,error\n"));
    assert!(summary.contains("broken.pdf,error,"));

    rebar(home.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&outputs)
        .arg("--native-only")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn codes_reports_missing_text_layer() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("scan.pdf");
    fs::write(&input, "not a pdf").unwrap();

    rebar(home.path())
        .arg("codes")
        .arg(&input)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No text layer found"));
}
