//! Guest plugin exporting `fibArray(i32) -> i32`.
//!
//! Builds the same sequence as `kiln_guest::exports()`. No imports, no start
//! function; every observable behaviour is reached through the export.

#[path = "../../kiln-guest/src/sequence.rs"]
mod sequence;

/// Traps with `unreachable` when no array of length `n` can exist.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn fibArray(n: i32) -> i32 {
    match sequence::fib_array(n) {
        Ok(term) => term,
        Err(_) => core::arch::wasm32::unreachable(),
    }
}
