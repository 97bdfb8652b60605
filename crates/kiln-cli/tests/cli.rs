use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn fixture() -> String {
    kiln_testdata::fixture_path("fib_array")
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn kilnc_compiles_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("fib.cwasm");

    cargo_bin_cmd!("kilnc")
        .env_remove("KILN_LOG")
        .args([fixture().as_str(), output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Compilation succeeded:"))
        .stdout(predicate::str::contains("Compilation failed.").not());

    assert!(fs::metadata(&output)?.len() > 0);
    Ok(())
}

#[test]
fn kilnc_reports_missing_input() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("fib.cwasm");

    cargo_bin_cmd!("kilnc")
        .env_remove("KILN_LOG")
        .arg(dir.path().join("missing.wasm"))
        .arg(&output)
        .assert()
        .failure()
        .stdout(predicate::eq("Compilation failed.\n"))
        .stderr(predicate::str::contains("missing.wasm"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn kilnc_rejects_non_wasm_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = NamedTempFile::new()?;
    input.write_all(b"(module)")?;
    input.flush()?;
    let dir = tempdir()?;

    cargo_bin_cmd!("kilnc")
        .env("NO_COLOR", "1")
        .arg(input.path())
        .arg(dir.path().join("out.cwasm"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Compilation failed."))
        .stderr(predicate::str::contains("invalid magic"));

    Ok(())
}

#[test]
fn kilnc_rejects_unknown_opt_level() {
    cargo_bin_cmd!("kilnc")
        .args([fixture().as_str(), "out.cwasm", "--opt-level", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid optimization level `9`"));
}

#[test]
fn kilnc_logs_progress_at_info() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("fib.cwasm");

    cargo_bin_cmd!("kilnc")
        .env("NO_COLOR", "1")
        .env("KILN_LOG", "info")
        .args([fixture().as_str(), output.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("compile start"))
        .stderr(predicate::str::contains("artifact written"));

    Ok(())
}

#[test]
fn compiled_artifacts_run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    for (format, file) in [("native", "fib.cwasm"), ("wasm", "fib.wasm")] {
        let output = dir.path().join(file);
        cargo_bin_cmd!("kilnc")
            .args([fixture().as_str(), output.to_str().unwrap()])
            .args(["--format", format, "-O", "s"])
            .assert()
            .success();

        cargo_bin_cmd!("kiln-run")
            .arg(&output)
            .args(["fibArray", "10", "-O", "s"])
            .assert()
            .success()
            .stdout(predicate::eq("55\n"));
    }
    Ok(())
}

#[test]
fn kiln_run_reports_trap() {
    cargo_bin_cmd!("kiln-run")
        .args([fixture().as_str(), "fibArray", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("`fibArray` trapped"));
}

#[test]
fn kiln_run_accepts_negative_argument() {
    cargo_bin_cmd!("kiln-run")
        .args([fixture().as_str(), "fibArray", "-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trapped"));
}

#[test]
fn kiln_inspect_lists_exports() {
    cargo_bin_cmd!("kiln-inspect")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Kind: wasm"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("func    fibArray  (i32) -> (i32)"));
}

#[test]
fn kiln_inspect_recognizes_universal_artifacts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("fib.wasm");
    cargo_bin_cmd!("kilnc")
        .args([fixture().as_str(), output.to_str().unwrap(), "--format", "wasm"])
        .assert()
        .success();

    cargo_bin_cmd!("kiln-inspect")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Kind: universal wasm"));
    Ok(())
}
