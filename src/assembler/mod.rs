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

pub mod artifacts;
pub mod checker;
pub mod encoder;
pub mod first_pass;
pub mod second_pass;
pub mod symbol_table;

use crate::errors::{Diagnostic, DiagnosticKind};

/// Base address of the code segment in the target machine's memory.
pub const LOAD_ADDRESS: u16 = 100;

/// Total number of memory words the target machine has.
pub const MEMORY_WORDS: u16 = 1024;

/// Hard cap on the words either segment will accept before the compile is
/// considered broken beyond reporting.
pub const MAX_SEGMENT_WORDS: usize = 1500;

/// The mutable state of a single compile, threaded through every pass and
/// dropped when the compile finishes.
#[derive(Debug, Default)]
pub struct CompileContext {
    /// Instruction counter, reset at the start of each pass.
    pub ic: u16,
    /// Data counter, reset at the start of the first pass.
    pub dc: u16,
    pub final_ic: u16,
    pub final_dc: u16,
    pub code_segment: Vec<u16>,
    pub data_segment: Vec<u16>,
    pub externals: Vec<ExternalRef>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A use of an external label by an operand word, with the absolute address
/// of that word in the final image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    pub name: String,
    pub address: u16,
}

impl CompileContext {
    pub fn new() -> Self {
        CompileContext::default()
    }

    pub fn report(&mut self, row: i32, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(row, kind));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
