//! Kiln guest export module.
//!
//! The guest has no entry point of its own. Its one function, `fibArray`, is
//! reachable only through the explicit [`ExportTable`] returned by
//! [`exports`], the native counterpart of a wasm module's export section. The
//! same algorithm is compiled to wasm by `kiln-testdata` and loaded by
//! `kiln_core::Host`.

mod exports;
pub mod sequence;

pub use exports::{Export, ExportTable, GuestError, Value, exports};
