use std::path::Path;
use std::process::Command;
use std::{env, fs};

/// Sources shared between fixtures and workspace crates.
const SHARED_SOURCES: &[&str] = &["../kiln-guest/src/sequence.rs"];

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let fixtures_dir = Path::new(&manifest_dir).join("fixtures");

    println!("cargo::rerun-if-changed=fixtures/");
    for shared in SHARED_SOURCES {
        println!("cargo::rerun-if-changed={shared}");
    }

    let rustup_output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
        .expect("failed to run rustup");
    let installed = String::from_utf8_lossy(&rustup_output.stdout);
    assert!(
        installed.contains("wasm32-unknown-unknown"),
        "wasm32-unknown-unknown target not installed. Run: rustup target add wasm32-unknown-unknown"
    );

    let mut guests: Vec<_> = fs::read_dir(&fixtures_dir)
        .unwrap_or_else(|e| {
            panic!(
                "failed to read fixtures directory {}: {e}",
                fixtures_dir.display()
            )
        })
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension().is_some_and(|ext| ext == "rs").then_some(path)
        })
        .collect();
    guests.sort();

    for src_path in &guests {
        let stem = src_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_else(|| panic!("fixture name is not UTF-8: {}", src_path.display()));
        let wasm_path = Path::new(&out_dir).join(format!("{stem}.wasm"));

        println!("cargo::rerun-if-changed={}", src_path.display());

        // Fixtures are standalone crates; pin the edition so `#[no_mangle]`
        // keeps its pre-2024 spelling.
        let status = Command::new("rustc")
            .args([
                "--edition",
                "2021",
                "--target",
                "wasm32-unknown-unknown",
                "--crate-type",
                "cdylib",
                "-O",
                "-o",
            ])
            .arg(&wasm_path)
            .arg(src_path)
            .status()
            .unwrap_or_else(|e| panic!("failed to invoke rustc for {stem}.rs: {e}"));

        assert!(
            status.success(),
            "rustc failed to compile guest {} (exit code: {:?})",
            src_path.display(),
            status.code()
        );

        println!(
            "cargo:warning=compiled guest fixture: {stem}.wasm ({} bytes)",
            fs::metadata(&wasm_path).map(|m| m.len()).unwrap_or(0)
        );
    }
}
