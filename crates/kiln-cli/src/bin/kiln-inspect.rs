//! kiln-inspect: decode a `.wasm` binary and print its layout and exports.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use kiln_core::ArtifactKind;
use kiln_core::binary::entries::ExportDesc;
use kiln_core::binary::module::Module;

#[derive(Parser, Debug)]
#[command(name = "kiln-inspect")]
#[command(about = "Print the section layout and exports of a wasm module or artifact")]
#[command(version)]
struct Args {
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

fn main() {
    let args = Args::parse();
    let path = args.path.display();

    let bytes = match std::fs::read(&args.path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: failed to read {path}: {e}");
            process::exit(1);
        }
    };

    let kind = match ArtifactKind::detect(&bytes) {
        Ok(Some(kind)) => kind,
        Ok(None) => {
            eprintln!("error: {path} is not a WebAssembly module or precompiled artifact");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("File: {path}");
    println!("Kind: {kind}");
    if kind == ArtifactKind::Native {
        println!("Size: {} bytes", bytes.len());
        return;
    }

    let module = match Module::decode(&bytes) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("Sections: {}", module.sections.len());
    println!();
    for (id, offset, size) in module.section_summary() {
        println!(
            "  {:>12}  offset={:<8}  size={} bytes",
            id.name(),
            offset,
            size
        );
    }

    let exports = match module.exports() {
        Ok(exports) => exports,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    if exports.is_empty() {
        return;
    }

    println!();
    println!("Exports: {}", exports.len());
    for export in &exports {
        match export.desc {
            ExportDesc::Func(_) => match module.export_signature(export.name) {
                Ok(Some(ty)) => println!("  func    {}  {ty}", export.name),
                Ok(None) => println!("  func    {}  <unresolved>", export.name),
                Err(e) => {
                    eprintln!("error: {e}");
                    process::exit(1);
                }
            },
            _ => println!("  {:<6}  {}", export.desc.kind(), export.name),
        }
    }
}
