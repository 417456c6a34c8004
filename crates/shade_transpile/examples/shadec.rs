// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use shade_syntax::CstNode;
use shade_transpile::{compile, CompileOptions, TranspileOptions};

#[derive(Parser)]
#[command(name = "shadec")]
#[command(about = "Compile the CST of a shade unit to WGSL and print the result to stdout.")]
#[command(long_about = "
Compile the CST of a shade unit to WGSL and print the result to stdout.

The CST is read from a JSON dump produced by the grammar. If the unit has incidents,
they are printed to stderr instead, with source excerpts when `--source` is given.
")]
struct Cli {
    /// JSON dump of the CST to compile
    #[arg(long, value_name = "FILENAME")]
    cst: PathBuf,

    /// Source text the CST was parsed from, used to show diagnostics
    #[arg(long, value_name = "FILENAME")]
    source: Option<PathBuf>,

    /// Print the resource bindings and shader parameters after the code
    #[arg(long)]
    bindings: bool,

    /// Workgroup size of compute entry points that declare none, e.g. `8,8`
    #[arg(long, value_delimiter = ',', num_args = 1..=3)]
    workgroup_size: Option<Vec<u32>>,

    /// Pretty-print the AST instead of the code
    #[arg(long)]
    ast: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cst = CstNode::from_json(&fs::read_to_string(&cli.cst)?)?;
    let source = cli.source.as_ref().map(fs::read_to_string).transpose()?;

    let mut transpile_options = TranspileOptions::new();
    if let Some(size) = &cli.workgroup_size {
        transpile_options = transpile_options.with_default_workgroup_size(size);
    }
    let display_path = cli.source.as_ref().unwrap_or(&cli.cst);
    let options = CompileOptions::new()
        .with_path(display_path)
        .with_transpile_options(transpile_options);

    let result = compile(&cst, &options);
    if cli.ast {
        println!("{:#?}", result.ast());
    }
    let Some(code) = result.code() else {
        result.print_diagnostics(source.as_deref())?;
        return Ok(ExitCode::FAILURE);
    };
    if !cli.ast {
        println!("{code}");
    }
    if cli.bindings {
        for binding in result.bindings() {
            let access = binding.access.map(|a| format!(", {}", a.as_str())).unwrap_or_default();
            println!(
                "binding {} group={} binding={} var<{}{access}> {}",
                binding.name,
                binding.group,
                binding.binding,
                binding.address_space.as_str(),
                binding.ty.target_spelling(),
            );
        }
        for parameter in result.parameters() {
            println!("parameter {}: {}", parameter.name, parameter.ty.target_spelling());
        }
    }
    Ok(ExitCode::SUCCESS)
}
