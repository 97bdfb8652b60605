//! Artifact kinds on disk and how to tell them apart.

use std::fmt;

use crate::binary::module::Module;
use crate::binary::section::{self, WASM_MAGIC};
use crate::error::DecodeError;

/// Name of the custom section carrying a native image inside a universal
/// wasm artifact.
pub const AOT_SECTION: &str = "kiln.aot";

const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// What a blob of bytes is, as far as the loader is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A plain WebAssembly module.
    Wasm,
    /// A WebAssembly module carrying a native image in [`AOT_SECTION`].
    Universal,
    /// A precompiled native image.
    Native,
}

impl ArtifactKind {
    /// Classify `bytes`. Returns `Ok(None)` for anything that is neither a
    /// wasm module nor a precompiled image.
    pub fn detect(bytes: &[u8]) -> Result<Option<Self>, DecodeError> {
        if bytes.starts_with(&WASM_MAGIC) {
            let module = Module::decode(bytes)?;
            return Ok(Some(if module.custom_section(AOT_SECTION)?.is_some() {
                ArtifactKind::Universal
            } else {
                ArtifactKind::Wasm
            }));
        }

        // Engine images are ELF objects whatever the host platform; whether
        // one fits a given engine is checked when it is deserialized.
        Ok(bytes.starts_with(&ELF_MAGIC).then_some(ArtifactKind::Native))
    }

    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::Wasm => "wasm",
            ArtifactKind::Universal => "universal wasm",
            ArtifactKind::Native => "native",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Append `image` to `wasm` as the [`AOT_SECTION`] custom section.
pub fn embed_native_image(wasm: &[u8], image: &[u8]) -> Vec<u8> {
    let section = section::encode_custom_section(AOT_SECTION, image);
    let mut out = Vec::with_capacity(wasm.len() + section.len());
    out.extend_from_slice(wasm);
    out.extend_from_slice(&section);
    out
}

/// The native image embedded in a universal artifact, if any.
pub fn embedded_native_image(wasm: &[u8]) -> Result<Option<&[u8]>, DecodeError> {
    let module = Module::decode(wasm)?;
    Ok(module.custom_section(AOT_SECTION)?.map(|s| s.payload))
}
