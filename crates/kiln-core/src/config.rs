//! Compiler configuration.
//!
//! A [`CompilerConfig`] is built once by the caller and handed to
//! [`Compiler::new`](crate::Compiler::new) and [`Host::new`](crate::Host::new).
//! A host can only run native images produced under the same settings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::engine_reason;
use crate::logging::LogLevel;

/// A configuration value that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {what} `{value}` (expected one of: {expected})")]
pub struct ParseConfigError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseConfigError {
    pub(crate) fn new(what: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            what,
            value: value.to_string(),
            expected,
        }
    }
}

/// Optimization level requested from the code generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptLevel {
    /// Disable as many optimizations as possible.
    O0,
    O1,
    #[default]
    O2,
    /// Optimize for fast execution as much as possible.
    O3,
    /// Optimize for small code without sacrificing much speed.
    Os,
    /// Optimize for small code size as much as possible.
    Oz,
}

impl OptLevel {
    /// Cranelift distinguishes only three levels; the speed levels collapse
    /// onto `Speed` and the size levels onto `SpeedAndSize`.
    pub fn cranelift(self) -> wasmtime::OptLevel {
        match self {
            OptLevel::O0 => wasmtime::OptLevel::None,
            OptLevel::O1 | OptLevel::O2 | OptLevel::O3 => wasmtime::OptLevel::Speed,
            OptLevel::Os | OptLevel::Oz => wasmtime::OptLevel::SpeedAndSize,
        }
    }
}

impl fmt::Display for OptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptLevel::O0 => "0",
            OptLevel::O1 => "1",
            OptLevel::O2 => "2",
            OptLevel::O3 => "3",
            OptLevel::Os => "s",
            OptLevel::Oz => "z",
        };
        f.write_str(s)
    }
}

impl FromStr for OptLevel {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s.trim();
        let level = level
            .strip_prefix('O')
            .or_else(|| level.strip_prefix('o'))
            .unwrap_or(level);
        match level {
            "0" => Ok(OptLevel::O0),
            "1" => Ok(OptLevel::O1),
            "2" => Ok(OptLevel::O2),
            "3" => Ok(OptLevel::O3),
            "s" => Ok(OptLevel::Os),
            "z" => Ok(OptLevel::Oz),
            _ => Err(ParseConfigError::new(
                "optimization level",
                s,
                "0, 1, 2, 3, s, z",
            )),
        }
    }
}

/// Shape of the artifact written by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// The engine's precompiled native image (`.cwasm`).
    #[default]
    Native,
    /// The original module with the native image appended as a custom
    /// section. Still loadable as plain wasm by any runtime.
    Wasm,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Native => "native",
            OutputFormat::Wasm => "wasm",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "cwasm" => Ok(OutputFormat::Native),
            "wasm" | "universal" => Ok(OutputFormat::Wasm),
            _ => Err(ParseConfigError::new("output format", s, "native, wasm")),
        }
    }
}

/// Settings shared by the compiler and the host loader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilerConfig {
    pub opt_level: OptLevel,
    pub format: OutputFormat,
    /// Target triple to compile for; `None` means the host.
    pub target: Option<String>,
    /// Emit epoch checks so running guests can be interrupted.
    pub interruptible: bool,
    /// Verbosity for the duration of each compile call; `None` leaves the
    /// caller's subscriber in charge.
    pub log_level: Option<LogLevel>,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_opt_level(mut self, opt_level: OptLevel) -> Self {
        self.opt_level = opt_level;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_interruptible(mut self, interruptible: bool) -> Self {
        self.interruptible = interruptible;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Translate into an engine configuration.
    pub(crate) fn engine_config(&self) -> Result<wasmtime::Config, String> {
        let mut config = wasmtime::Config::new();
        config
            .strategy(wasmtime::Strategy::Cranelift)
            .cranelift_opt_level(self.opt_level.cranelift())
            .epoch_interruption(self.interruptible);
        if let Some(target) = &self.target {
            config.target(target).map_err(|e| engine_reason(&e))?;
        }
        Ok(config)
    }
}
