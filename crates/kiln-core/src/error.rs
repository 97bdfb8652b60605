//! Error types for decoding, compiling, and loading modules.
//!
//! Decode errors carry byte offsets into the original binary and structured
//! context, enabling precise diagnostic messages. Engine failures come back
//! from wasmtime as `anyhow` errors; they are flattened into an opaque reason
//! string at this boundary.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The byte offset into the WASM binary where an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteOffset(pub usize);

/// Contextual information about what was being decoded when the error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeContext {
    /// Decoding the WASM magic number.
    Magic,
    /// Decoding the WASM version number.
    Version,
    /// Decoding a section header.
    SectionHeader,
    /// Decoding section contents.
    SectionBody { id: u8 },
    /// Decoding a LEB128 value.
    Leb128,
    /// Decoding a name (length-prefixed UTF-8).
    Name,
    /// Decoding a type section entry.
    TypeSection,
    /// Decoding an import section entry.
    ImportSection,
    /// Decoding a function section entry.
    FunctionSection,
    /// Decoding an export section entry.
    ExportSection,
    /// Decoding a custom section's name.
    CustomSection,
}

impl fmt::Display for DecodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeContext::Magic => write!(f, "WASM magic number"),
            DecodeContext::Version => write!(f, "WASM version"),
            DecodeContext::SectionHeader => write!(f, "section header"),
            DecodeContext::SectionBody { id } => write!(f, "section body (id={id})"),
            DecodeContext::Leb128 => write!(f, "LEB128 value"),
            DecodeContext::Name => write!(f, "name"),
            DecodeContext::TypeSection => write!(f, "type section"),
            DecodeContext::ImportSection => write!(f, "import section"),
            DecodeContext::FunctionSection => write!(f, "function section"),
            DecodeContext::ExportSection => write!(f, "export section"),
            DecodeContext::CustomSection => write!(f, "custom section"),
        }
    }
}

/// Errors that can occur during binary decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode error at byte {}: {context}: {kind}", .offset.0)]
pub struct DecodeError {
    /// Byte offset into the binary where the error was detected.
    pub offset: ByteOffset,
    /// What was being decoded.
    pub context: DecodeContext,
    /// The specific error kind.
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) fn new(offset: usize, context: DecodeContext, kind: DecodeErrorKind) -> Self {
        Self {
            offset: ByteOffset(offset),
            context,
            kind,
        }
    }

    /// Re-anchor an error raised by a cursor over a section body so its
    /// offset points into the whole binary.
    pub(crate) fn rebase(mut self, base: usize, context: DecodeContext) -> Self {
        self.offset = ByteOffset(self.offset.0 + base);
        self.context = context;
        self
    }
}

/// Specific categories of decode errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid magic number (expected \\0asm)")]
    InvalidMagic,
    #[error("unsupported WASM version {found} (expected 1)")]
    UnsupportedVersion { found: u32 },
    /// LEB128 encoding exceeds the maximum number of bytes for the target type.
    #[error("LEB128 encoding too long")]
    Leb128TooLong,
    /// LEB128 encoding has unused bits set in the final byte (overlong/overflow).
    #[error("LEB128 overflow (unused bits set)")]
    Leb128Overflow,
    #[error("unknown section ID {id:#04x}")]
    UnknownSectionId { id: u8 },
    #[error("section extends beyond end of binary")]
    SectionOverflow,
    /// Non-custom sections must be ordered by ID.
    #[error("section {current} appears after section {prev} (out of order)")]
    SectionOutOfOrder { prev: u8, current: u8 },
    #[error("duplicate section (id={id})")]
    DuplicateSection { id: u8 },
    #[error("unknown value type {byte:#04x}")]
    UnknownValType { byte: u8 },
    #[error("expected {expected:#04x}, found {found:#04x}")]
    UnexpectedByte { expected: u8, found: u8 },
    #[error("section size mismatch: declared {expected} bytes, consumed {consumed}")]
    SectionSizeMismatch { expected: u32, consumed: u32 },
    #[error("name is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown external kind {byte:#04x}")]
    UnknownExternalKind { byte: u8 },
    #[error("invalid limits flag {byte:#04x}")]
    InvalidLimits { byte: u8 },
    #[error("invalid mutability flag {byte:#04x}")]
    InvalidMutability { byte: u8 },
    #[error("function section declares {functions} functions but the code section has {bodies}")]
    FunctionCountMismatch { functions: u32, bodies: u32 },
}

/// Failures of the AOT compilation service.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The engine rejected the configuration (e.g. unknown target triple).
    #[error("invalid compiler configuration: {reason}")]
    Config { reason: String },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("{} already carries an AOT section", .path.display())]
    AlreadyCompiled { path: PathBuf },

    /// Opaque failure reason from the code generator.
    #[error("compilation of {} failed: {reason}", .path.display())]
    Codegen { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of the host loader.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid host configuration: {reason}")]
    Config { reason: String },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a WebAssembly module or precompiled artifact")]
    UnrecognizedArtifact,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to load module: {reason}")]
    Load { reason: String },

    #[error("failed to instantiate module: {reason}")]
    Instantiate { reason: String },

    #[error("module has no `{name}` export with signature {signature}")]
    MissingExport { name: String, signature: String },

    #[error("`{export}` trapped: {reason}")]
    Trap { export: String, reason: String },
}

/// Render an engine error with its full cause chain on one line.
pub(crate) fn engine_reason(err: &wasmtime::Error) -> String {
    format!("{err:#}")
}
