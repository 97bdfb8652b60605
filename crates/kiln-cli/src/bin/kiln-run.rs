//! kiln-run: load a module or compiled artifact and call one of its exports.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kiln_core::logging::{self, LogLevel};
use kiln_core::{CompilerConfig, Host, HostError, OptLevel};

#[derive(Parser, Debug)]
#[command(name = "kiln-run")]
#[command(about = "Call an (i32) -> (i32) export of a wasm module or compiled artifact")]
#[command(version)]
struct Args {
    /// Module or artifact to load
    #[arg(value_name = "ARTIFACT")]
    artifact: PathBuf,

    /// Export to call
    #[arg(value_name = "EXPORT")]
    export: String,

    /// Argument passed to the export
    #[arg(value_name = "ARG", allow_negative_numbers = true)]
    arg: i32,

    /// Optimization level the artifact was compiled with
    #[arg(short = 'O', long, value_name = "LEVEL", default_value = "2")]
    opt_level: OptLevel,

    /// The artifact was compiled with --interruptible
    #[arg(long)]
    interruptible: bool,

    /// Log verbosity on stderr
    #[arg(long, value_name = "LEVEL", env = "KILN_LOG", default_value = "error")]
    log_level: LogLevel,
}

fn run(args: &Args) -> Result<i32, HostError> {
    let config = CompilerConfig::new()
        .with_opt_level(args.opt_level)
        .with_interruptible(args.interruptible);
    let mut plugin = Host::new(&config)?.load_file(&args.artifact)?;
    plugin.call_i32(&args.export, args.arg)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _log = logging::scoped(args.log_level);

    match run(&args) {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
