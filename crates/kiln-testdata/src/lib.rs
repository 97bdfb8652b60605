//! WASM guest fixtures compiled from Rust sources at build time.
//!
//! Every `.rs` file in `fixtures/` becomes `{stem}.wasm` in `OUT_DIR`:
//!
//! - `fib_array`: the plugin exporting `fibArray(i32) -> i32`;
//! - `host_import`: a guest importing `env.host_log`, for host-side
//!   instantiation failures and import decoding;
//! - `busy`: `fibArray` plus a `spin` export that loops until interrupted.

use std::path::PathBuf;

/// Directory containing compiled `.wasm` fixtures.
pub const OUT_DIR: &str = env!("OUT_DIR");

/// Get the path to a named fixture (e.g. `"fib_array"` → `"{OUT_DIR}/fib_array.wasm"`).
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(OUT_DIR).join(format!("{name}.wasm"))
}

/// Load a named fixture's bytes.
pub fn fixture_bytes(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name))
        .unwrap_or_else(|e| panic!("failed to load fixture '{name}.wasm': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_wasm(name: &str) {
        let bytes = fixture_bytes(name);
        assert!(bytes.len() >= 8, "{name}.wasm too small: {} bytes", bytes.len());
        assert_eq!(&bytes[..4], b"\0asm", "{name}.wasm is not a WASM binary");
    }

    #[test]
    fn fib_array_fixture_exists() {
        assert_wasm("fib_array");
    }

    #[test]
    fn host_import_fixture_exists() {
        assert_wasm("host_import");
    }

    #[test]
    fn busy_fixture_exists() {
        assert_wasm("busy");
    }

    #[test]
    fn fixture_path_uses_wasm_extension() {
        let path = fixture_path("fib_array");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wasm"));
        assert!(path.starts_with(OUT_DIR));
    }
}
