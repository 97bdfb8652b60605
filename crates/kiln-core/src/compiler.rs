//! The ahead-of-time compilation service.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::artifact::{self, AOT_SECTION};
use crate::binary::module::Module;
use crate::config::{CompilerConfig, OutputFormat};
use crate::error::{CompileError, engine_reason};
use crate::logging;

/// Placeholder path for errors raised by [`Compiler::compile_bytes`].
const IN_MEMORY: &str = "<memory>";

/// Outcome of a successful [`Compiler::compile`].
#[derive(Debug, Clone)]
pub struct CompileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub input_bytes: usize,
    pub artifact_bytes: usize,
    pub elapsed: Duration,
}

/// An AOT compiler handle.
///
/// Owns the code-generation engine for its whole lifetime; dropping the
/// handle releases it, whichever way the owning scope is left.
pub struct Compiler {
    engine: wasmtime::Engine,
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Result<Self, CompileError> {
        let engine_config = config
            .engine_config()
            .map_err(|reason| CompileError::Config { reason })?;
        let engine = wasmtime::Engine::new(&engine_config).map_err(|e| CompileError::Config {
            reason: engine_reason(&e),
        })?;

        debug!(
            opt_level = %config.opt_level,
            format = %config.format,
            target = config.target.as_deref().unwrap_or("host"),
            interruptible = config.interruptible,
            "compiler created"
        );
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile the module at `input` and write the artifact to `output`.
    ///
    /// The artifact is written to a temporary file beside `output` and moved
    /// into place only once complete, so a failed compile never leaves a
    /// partial artifact behind.
    pub fn compile(&self, input: &Path, output: &Path) -> Result<CompileReport, CompileError> {
        let _log = self.config.log_level.map(logging::scoped);
        let started = Instant::now();
        info!(input = %input.display(), output = %output.display(), "compile start");

        let wasm = fs::read(input).map_err(|source| CompileError::Read {
            path: input.to_path_buf(),
            source,
        })?;
        let artifact = self.compile_module(&wasm, input)?;
        write_atomically(output, &artifact).map_err(|source| CompileError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        let report = CompileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            format: self.config.format,
            input_bytes: wasm.len(),
            artifact_bytes: artifact.len(),
            elapsed: started.elapsed(),
        };
        info!(
            artifact_bytes = report.artifact_bytes,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "artifact written"
        );
        Ok(report)
    }

    /// Compile an in-memory module, returning the artifact bytes.
    pub fn compile_bytes(&self, wasm: &[u8]) -> Result<Vec<u8>, CompileError> {
        let _log = self.config.log_level.map(logging::scoped);
        self.compile_module(wasm, Path::new(IN_MEMORY))
    }

    fn compile_module(&self, wasm: &[u8], path: &Path) -> Result<Vec<u8>, CompileError> {
        let decode_error = |source| CompileError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let module = Module::decode(wasm).map_err(decode_error)?;
        if module.custom_section(AOT_SECTION).map_err(decode_error)?.is_some() {
            return Err(CompileError::AlreadyCompiled {
                path: path.to_path_buf(),
            });
        }
        debug!(sections = module.sections.len(), bytes = wasm.len(), "decode");

        let image = self
            .engine
            .precompile_module(wasm)
            .map_err(|e| CompileError::Codegen {
                path: path.to_path_buf(),
                reason: engine_reason(&e),
            })?;
        debug!(image_bytes = image.len(), "codegen");

        Ok(match self.config.format {
            OutputFormat::Native => image,
            OutputFormat::Wasm => artifact::embed_native_image(wasm, &image),
        })
    }
}

impl Drop for Compiler {
    fn drop(&mut self) {
        debug!("compiler released");
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
