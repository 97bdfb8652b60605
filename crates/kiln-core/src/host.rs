//! Loading compiled artifacts and calling their exports.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use wasmtime::{Engine, Instance, Store};

use crate::artifact::{self, ArtifactKind};
use crate::config::CompilerConfig;
use crate::error::{HostError, engine_reason};
use crate::logging;

/// Signature every callable export of a plugin must have.
const I32_TO_I32: &str = "(i32) -> (i32)";

/// A loader for wasm modules and the artifacts [`Compiler`](crate::Compiler)
/// produces.
///
/// Native images only load into a host built from the same
/// [`CompilerConfig`] as the compiler that produced them.
pub struct Host {
    engine: Engine,
    config: CompilerConfig,
}

impl Host {
    pub fn new(config: &CompilerConfig) -> Result<Self, HostError> {
        let engine_config = config
            .engine_config()
            .map_err(|reason| HostError::Config { reason })?;
        let engine = Engine::new(&engine_config).map_err(|e| HostError::Config {
            reason: engine_reason(&e),
        })?;
        Ok(Self {
            engine,
            config: config.clone(),
        })
    }

    pub fn load_file(&self, path: &Path) -> Result<Plugin, HostError> {
        let bytes = fs::read(path).map_err(|source| HostError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_bytes(&bytes)
    }

    /// Load and instantiate an artifact of any [`ArtifactKind`].
    ///
    /// Precompiled images are trusted: only load artifacts this toolchain
    /// wrote. A universal artifact whose embedded image does not fit this
    /// host is compiled from its wasm body instead.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Plugin, HostError> {
        let _log = self.config.log_level.map(logging::scoped);
        let kind = ArtifactKind::detect(bytes)?.ok_or(HostError::UnrecognizedArtifact)?;
        info!(%kind, bytes = bytes.len(), "loading artifact");

        let module = match kind {
            ArtifactKind::Wasm => self.jit(bytes)?,
            ArtifactKind::Native => self.deserialize(bytes)?,
            ArtifactKind::Universal => {
                let image = artifact::embedded_native_image(bytes)?
                    .ok_or(HostError::UnrecognizedArtifact)?;
                match self.deserialize(image) {
                    Ok(module) => module,
                    Err(err) => {
                        warn!(error = %err, "embedded image unusable, compiling wasm body");
                        self.jit(bytes)?
                    }
                }
            }
        };

        let mut store = Store::new(&self.engine, ());
        let interruptible = self.config.interruptible;
        if interruptible {
            store.set_epoch_deadline(1);
        }
        let instance = Instance::new(&mut store, &module, &[]).map_err(|e| {
            HostError::Instantiate {
                reason: engine_reason(&e),
            }
        })?;
        debug!(exports = module.exports().len(), "instantiated");

        Ok(Plugin {
            store,
            instance,
            module,
            kind,
            interruptible,
        })
    }

    /// Make every guest currently running on this host trap at its next
    /// epoch check. Calls made afterwards are unaffected. Only effective when
    /// the config is interruptible.
    pub fn interrupt(&self) {
        self.engine.increment_epoch();
    }

    fn jit(&self, wasm: &[u8]) -> Result<wasmtime::Module, HostError> {
        wasmtime::Module::new(&self.engine, wasm).map_err(|e| HostError::Load {
            reason: engine_reason(&e),
        })
    }

    fn deserialize(&self, image: &[u8]) -> Result<wasmtime::Module, HostError> {
        // SAFETY: images are only ever produced by `Compiler`, and the engine
        // checks version and settings compatibility before using one.
        unsafe { wasmtime::Module::deserialize(&self.engine, image) }.map_err(|e| {
            HostError::Load {
                reason: engine_reason(&e),
            }
        })
    }
}

/// An instantiated guest module.
pub struct Plugin {
    store: Store<()>,
    instance: Instance,
    module: wasmtime::Module,
    kind: ArtifactKind,
    interruptible: bool,
}

impl Plugin {
    /// What the plugin was loaded from.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Names of everything the module exports, in declaration order.
    pub fn exports(&self) -> Vec<String> {
        self.module
            .exports()
            .map(|export| export.name().to_string())
            .collect()
    }

    /// Call the `(i32) -> (i32)` export `name`.
    ///
    /// On an interruptible host the call traps if [`Host::interrupt`] runs
    /// while it is in flight.
    pub fn call_i32(&mut self, name: &str, arg: i32) -> Result<i32, HostError> {
        let func = self
            .instance
            .get_typed_func::<i32, i32>(&mut self.store, name)
            .map_err(|_| HostError::MissingExport {
                name: name.to_string(),
                signature: I32_TO_I32.to_string(),
            })?;
        if self.interruptible {
            // Relative to the current epoch: only interrupts from here on count.
            self.store.set_epoch_deadline(1);
        }
        func.call(&mut self.store, arg).map_err(|e| HostError::Trap {
            export: name.to_string(),
            reason: engine_reason(&e),
        })
    }
}
