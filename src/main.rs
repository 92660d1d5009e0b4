/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use obasm::assemble;
use obasm::file_reader::AsmFileReader;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

const SOURCE_EXTENSION: &str = "as";
const EXPANDED_EXTENSION: &str = "am";
const OBJECT_EXTENSION: &str = "ob";
const ENTRIES_EXTENSION: &str = "ent";
const EXTERNALS_EXTENSION: &str = "ext";

#[derive(Parser)]
#[clap(version = "0.1.0", about = "Two-pass assembler producing base-64 object images")]
struct Opts {
    /// Source files to assemble (.as)
    #[clap(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let opts: Opts = Opts::parse();
    let mut failed = false;

    for input in &opts.inputs {
        match compile_file(input) {
            Ok(clean) => failed |= !clean,
            Err(error) => {
                eprintln!("{} {:#}", "error:".red().bold(), error);
                failed = true;
            }
        }
    }
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Runs one file through the assembler and writes whatever it produced.
/// Returns whether the program came out clean.
fn compile_file(input: &Path) -> Result<bool> {
    if input.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
        anyhow::bail!("expected a .{} source file: {}", SOURCE_EXTENSION, input.display());
    }

    let reader = AsmFileReader;
    let assembly = assemble(input, &reader)?;

    // the expanded source is written even when the program has errors
    fs::write(input.with_extension(EXPANDED_EXTENSION), &assembly.expanded)?;

    for diagnostic in &assembly.diagnostics {
        eprintln!("{}", diagnostic);
    }

    match &assembly.artifacts {
        Some(artifacts) => {
            fs::write(input.with_extension(OBJECT_EXTENSION), &artifacts.object)?;
            if let Some(entries) = &artifacts.entries {
                fs::write(input.with_extension(ENTRIES_EXTENSION), entries)?;
            }
            if let Some(externals) = &artifacts.externals {
                fs::write(input.with_extension(EXTERNALS_EXTENSION), externals)?;
            }
            println!("{} {}", "assembled".green().bold(), input.display());
            Ok(true)
        }
        None => {
            eprintln!("{} {}", "failed".red().bold(), input.display());
            Ok(false)
        }
    }
}
