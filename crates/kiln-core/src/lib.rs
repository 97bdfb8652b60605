//! Kiln WebAssembly toolchain core.
//!
//! Decodes WebAssembly binaries, compiles them ahead of time into native
//! artifacts, and loads those artifacts back to call their exports.
//!
//! ```no_run
//! use std::path::Path;
//! use kiln_core::{Compiler, CompilerConfig, Host};
//!
//! let config = CompilerConfig::default();
//! let compiler = Compiler::new(config.clone())?;
//! compiler.compile(Path::new("fib.wasm"), Path::new("fib.cwasm"))?;
//!
//! let mut plugin = Host::new(&config)?.load_file(Path::new("fib.cwasm"))?;
//! assert_eq!(plugin.call_i32("fibArray", 10)?, 55);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod artifact;
pub mod binary;
pub mod compiler;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod types;

pub use artifact::ArtifactKind;
pub use compiler::{CompileReport, Compiler};
pub use config::{CompilerConfig, OptLevel, OutputFormat, ParseConfigError};
pub use error::{CompileError, DecodeError, HostError};
pub use host::{Host, Plugin};
pub use logging::LogLevel;
