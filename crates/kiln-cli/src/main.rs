//! kilnc: compile a `.wasm` module ahead of time into a native artifact.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kiln_core::logging::{self, LogLevel};
use kiln_core::{CompileError, CompileReport, Compiler, CompilerConfig, OptLevel, OutputFormat};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "kilnc")]
#[command(about = "Compile a WebAssembly module ahead of time")]
#[command(version)]
struct Args {
    /// Input WebAssembly module
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the compiled artifact
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Optimization level: 0, 1, 2, 3, s or z
    #[arg(short = 'O', long, value_name = "LEVEL", default_value = "2")]
    opt_level: OptLevel,

    /// Artifact format: native image or universal wasm
    #[arg(long, value_name = "FORMAT", default_value = "native")]
    format: OutputFormat,

    /// Target triple (defaults to the host)
    #[arg(long, value_name = "TRIPLE")]
    target: Option<String>,

    /// Emit epoch checks so the running guest can be interrupted
    #[arg(long)]
    interruptible: bool,

    /// Log verbosity on stderr
    #[arg(long, value_name = "LEVEL", env = "KILN_LOG", default_value = "error")]
    log_level: LogLevel,
}

impl Args {
    fn config(&self) -> CompilerConfig {
        let mut config = CompilerConfig::new()
            .with_opt_level(self.opt_level)
            .with_format(self.format)
            .with_interruptible(self.interruptible)
            .with_log_level(self.log_level);
        if let Some(target) = &self.target {
            config = config.with_target(target.clone());
        }
        config
    }
}

fn run(args: &Args) -> Result<CompileReport, CompileError> {
    let compiler = Compiler::new(args.config())?;
    compiler.compile(&args.input, &args.output)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _log = logging::scoped(args.log_level);

    match run(&args) {
        Ok(report) => {
            info!(
                input_bytes = report.input_bytes,
                artifact_bytes = report.artifact_bytes,
                elapsed_ms = report.elapsed.as_millis() as u64,
                format = %report.format,
                "compile done"
            );
            println!(
                "Compilation succeeded: {} -> {}",
                report.input.display(),
                report.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Compilation failed.");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
