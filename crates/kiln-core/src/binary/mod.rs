//! WebAssembly binary format decoding.
//!
//! See [Wasm core §5](https://webassembly.github.io/spec/core/binary/index.html).

pub mod entries;
pub mod leb128;
pub mod module;
pub mod section;
