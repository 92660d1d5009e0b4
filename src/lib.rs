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

pub mod assembler;
pub mod classifier;
pub mod errors;
pub mod file_reader;
pub mod operations;
pub mod preprocessor;
pub mod tokenizer;

use std::path::Path;

use anyhow::{Context, Result};
use assembler::CompileContext;
use errors::Diagnostic;
use file_reader::FileReader;

/// Everything one compile produces. The expanded source is always rendered;
/// the output artifacts exist only when the program is error free.
#[derive(Debug)]
pub struct Assembly {
    pub expanded: String,
    pub diagnostics: Vec<Diagnostic>,
    pub artifacts: Option<Artifacts>,
}

/// The rendered output files. Entries and externals are only produced when
/// they have at least one line.
#[derive(Debug)]
pub struct Artifacts {
    pub object: String,
    pub entries: Option<String>,
    pub externals: Option<String>,
}

/// Compiles a single source file: macro expansion, symbol resolution, the
/// line checks, then code generation. Diagnostics are collected across all
/// of them, and any diagnostic suppresses the artifacts.
pub fn assemble<F: FileReader>(source_path: &Path, reader: &F) -> Result<Assembly> {
    let source = reader
        .read_to_string(source_path)
        .with_context(|| format!("Failed to read source file: {}", source_path.display()))?;

    let mut ctx = CompileContext::new();
    let expanded = preprocessor::expand_macros(&source, &mut ctx.diagnostics);

    let mut symbols = assembler::first_pass::build_symbol_table(&expanded, &mut ctx)
        .context("Failed during symbol resolution")?;

    assembler::checker::check_program(&expanded, &mut ctx);

    assembler::second_pass::generate_code(&expanded, &mut symbols, &mut ctx)
        .context("Failed during code generation")?;

    let artifacts = if ctx.has_errors() {
        None
    } else {
        Some(Artifacts {
            object: assembler::artifacts::object_file(&ctx),
            entries: assembler::artifacts::entries_file(&symbols),
            externals: assembler::artifacts::externals_file(&ctx),
        })
    };

    Ok(Assembly {
        expanded,
        diagnostics: ctx.diagnostics,
        artifacts,
    })
}
