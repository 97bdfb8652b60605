//! Compile the `fib_array` fixture to disk, then load and run the artifact.

use std::fs;
use std::path::Path;

use kiln_core::{
    ArtifactKind, CompileError, Compiler, CompilerConfig, Host, HostError, LogLevel, OptLevel,
    OutputFormat,
};

fn compile_fixture(config: &CompilerConfig, dir: &Path, file: &str) -> std::path::PathBuf {
    let output = dir.join(file);
    let report = Compiler::new(config.clone())
        .unwrap()
        .compile(&kiln_testdata::fixture_path("fib_array"), &output)
        .unwrap();
    assert_eq!(report.output, output);
    assert_eq!(report.format, config.format);
    output
}

#[test]
fn native_artifact_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompilerConfig::default();
    let artifact = compile_fixture(&config, dir.path(), "fib.cwasm");

    let mut plugin = Host::new(&config).unwrap().load_file(&artifact).unwrap();
    assert_eq!(plugin.kind(), ArtifactKind::Native);
    assert_eq!(plugin.call_i32("fibArray", 10).unwrap(), 55);
    assert_eq!(plugin.call_i32("fibArray", 47).unwrap(), 2_971_215_073u32 as i32);
}

#[test]
fn universal_artifact_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompilerConfig::default()
        .with_format(OutputFormat::Wasm)
        .with_opt_level(OptLevel::Oz);
    let artifact = compile_fixture(&config, dir.path(), "fib.wasm");

    let bytes = fs::read(&artifact).unwrap();
    assert!(bytes.starts_with(&kiln_testdata::fixture_bytes("fib_array")));

    let mut plugin = Host::new(&config).unwrap().load_file(&artifact).unwrap();
    assert_eq!(plugin.kind(), ArtifactKind::Universal);
    assert_eq!(plugin.call_i32("fibArray", 20).unwrap(), 6765);
}

#[test]
fn universal_artifact_runs_on_a_mismatched_host() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompilerConfig::default()
        .with_format(OutputFormat::Wasm)
        .with_interruptible(true);
    let artifact = compile_fixture(&config, dir.path(), "fib.wasm");

    let host = Host::new(&CompilerConfig::default()).unwrap();
    let mut plugin = host.load_file(&artifact).unwrap();
    assert_eq!(plugin.call_i32("fibArray", 30).unwrap(), 832_040);
}

#[test]
fn every_opt_level_produces_a_working_image() {
    let dir = tempfile::tempdir().unwrap();
    for level in [
        OptLevel::O0,
        OptLevel::O1,
        OptLevel::O2,
        OptLevel::O3,
        OptLevel::Os,
        OptLevel::Oz,
    ] {
        let config = CompilerConfig::default().with_opt_level(level);
        let artifact = compile_fixture(&config, dir.path(), &format!("fib-O{level}.cwasm"));
        let mut plugin = Host::new(&config).unwrap().load_file(&artifact).unwrap();
        assert_eq!(plugin.call_i32("fibArray", 12).unwrap(), 144, "O{level}");
    }
}

#[test]
fn compiled_guest_traps_on_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompilerConfig::default();
    let artifact = compile_fixture(&config, dir.path(), "fib.cwasm");

    let mut plugin = Host::new(&config).unwrap().load_file(&artifact).unwrap();
    let err = plugin.call_i32("fibArray", 0).unwrap_err();
    assert!(matches!(err, HostError::Trap { .. }), "{err:?}");
}

#[test]
fn missing_input_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.cwasm");
    let compiler = Compiler::new(CompilerConfig::default().with_log_level(LogLevel::Off)).unwrap();

    let err = compiler
        .compile(&dir.path().join("absent.wasm"), &output)
        .unwrap_err();
    assert!(matches!(err, CompileError::Read { .. }), "{err:?}");
    assert!(err.to_string().contains("absent.wasm"));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unwritable_output_reports_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("no-such-dir").join("fib.cwasm");
    let err = Compiler::new(CompilerConfig::default())
        .unwrap()
        .compile(&kiln_testdata::fixture_path("fib_array"), &output)
        .unwrap_err();
    assert!(matches!(err, CompileError::Write { .. }), "{err:?}");
}

#[test]
fn existing_output_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("fib.cwasm");
    fs::write(&output, b"stale").unwrap();

    let config = CompilerConfig::default();
    compile_fixture(&config, dir.path(), "fib.cwasm");
    assert_eq!(
        ArtifactKind::detect(&fs::read(&output).unwrap()).unwrap(),
        Some(ArtifactKind::Native)
    );
}
