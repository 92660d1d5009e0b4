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

//! Decides what a source line is, and pulls the label and operands out of it.

use crate::operations::{Addressing, classify_operand, find_operation};
use crate::tokenizer::{self, Field};

pub const DATA_DIRECTIVE: &str = ".data";
pub const STRING_DIRECTIVE: &str = ".string";
pub const EXTERN_DIRECTIVE: &str = ".extern";
pub const ENTRY_DIRECTIVE: &str = ".entry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    Data,
    String,
    Extern,
    Entry,
    Instruction,
    /// A leading field starts with `.` but names no known directive.
    Unrecognized,
}

/// Classifies a raw line. A directive name may sit in the first field, or in
/// the second when a label opens the line; anything else is taken for an
/// instruction.
pub fn classify(line: &str) -> LineKind {
    if tokenizer::is_empty_line(line) {
        return LineKind::Empty;
    }
    let fields = tokenizer::tokenize(line);
    for field in fields.iter().take(2) {
        match field.text.as_str() {
            DATA_DIRECTIVE => return LineKind::Data,
            STRING_DIRECTIVE => return LineKind::String,
            EXTERN_DIRECTIVE => return LineKind::Extern,
            ENTRY_DIRECTIVE => return LineKind::Entry,
            _ => {}
        }
    }
    if fields.iter().take(2).any(|f| f.text.starts_with('.')) {
        return LineKind::Unrecognized;
    }
    LineKind::Instruction
}

/// A leading label is a first field of the form `NAME:` where NAME starts
/// with a letter and continues with letters and digits only.
pub fn leading_label(line: &str) -> Option<String> {
    let fields = tokenizer::tokenize(line);
    let first = fields.first()?;
    let name = first.text.strip_suffix(':')?;
    let mut chars = name.chars();
    if !chars.next()?.is_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_alphanumeric()) {
        return None;
    }
    Some(name.to_string())
}

/// Index of the field holding the operation mnemonic. The mnemonic can only
/// be the first field, or the second when a label opens the line.
pub fn mnemonic_index(fields: &[Field]) -> Option<usize> {
    fields
        .iter()
        .take(2)
        .position(|f| find_operation(&f.text).is_some())
}

/// An operand of an instruction line: its addressing form, raw text, and
/// column span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub addressing: Addressing,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// The classified operands of an instruction line: every field after the
/// mnemonic. A line with no recognizable mnemonic has no operands.
pub fn operands(fields: &[Field]) -> Vec<Operand> {
    let Some(name_index) = mnemonic_index(fields) else {
        return Vec::new();
    };
    fields[name_index + 1..]
        .iter()
        .map(|f| Operand {
            addressing: classify_operand(&f.text),
            text: f.text.clone(),
            start: f.start,
            end: f.end,
        })
        .collect()
}
