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

use crate::classifier::{self, LineKind};
use crate::errors::{AssemblyError, DiagnosticKind};
use crate::tokenizer::{self, Field};

use super::encoder::WORD_MASK;
use super::symbol_table::{Symbol, SymbolKind, SymbolTable};
use super::{CompileContext, MAX_SEGMENT_WORDS};

/// Pass 1: walk the expanded source, record every label with the counter
/// value current at its definition, emit the data segment, and advance the
/// instruction counter by the width of each instruction. Addresses are
/// relocated once the final counters are known.
pub fn build_symbol_table(
    source: &str,
    ctx: &mut CompileContext,
) -> Result<SymbolTable, AssemblyError> {
    let mut symbols = SymbolTable::new();
    ctx.ic = 0;
    ctx.dc = 0;

    for (index, line) in source.lines().enumerate() {
        let row = index + 1;
        let kind = classifier::classify(line);
        match kind {
            LineKind::Data | LineKind::String => {
                if let Some(name) = classifier::leading_label(line) {
                    let address = ctx.dc;
                    declare(
                        &mut symbols,
                        ctx,
                        Symbol { name, address, kind: SymbolKind::Data, row },
                    );
                }
                if kind == LineKind::Data {
                    emit_data_values(line, ctx, row)?;
                } else {
                    emit_string(line, ctx, row)?;
                }
            }
            LineKind::Extern => {
                let fields = tokenizer::tokenize(line);
                if let Some(argument) = declaration_argument(&fields) {
                    declare(
                        &mut symbols,
                        ctx,
                        Symbol {
                            name: argument.text.clone(),
                            address: 0,
                            kind: SymbolKind::Extern,
                            row,
                        },
                    );
                }
            }
            // entry declarations are resolved by the second pass
            LineKind::Entry => {}
            LineKind::Instruction => {
                if let Some(name) = classifier::leading_label(line) {
                    let address = ctx.ic;
                    declare(
                        &mut symbols,
                        ctx,
                        Symbol { name, address, kind: SymbolKind::Code, row },
                    );
                }
                let fields = tokenizer::tokenize(line);
                ctx.ic += instruction_width(&fields);
            }
            LineKind::Empty | LineKind::Unrecognized => {}
        }
    }

    ctx.final_ic = ctx.ic;
    ctx.final_dc = ctx.dc;
    symbols.relocate(ctx.final_ic);
    Ok(symbols)
}

/// Memory words an instruction occupies: the instruction word itself plus one
/// word per operand, except that two register operands share a single word.
pub fn instruction_width(fields: &[Field]) -> u16 {
    let operands = classifier::operands(fields);
    match operands.len() {
        0 => 1,
        1 => 2,
        _ => {
            if operands[0].addressing.is_register() && operands[1].addressing.is_register() {
                2
            } else {
                3
            }
        }
    }
}

/// The label argument of an `.extern`/`.entry` line: the field right after
/// the directive.
pub fn declaration_argument(fields: &[Field]) -> Option<&Field> {
    let position = fields.iter().position(|f| {
        f.text == classifier::EXTERN_DIRECTIVE || f.text == classifier::ENTRY_DIRECTIVE
    })?;
    fields.get(position + 1)
}

/// Inserts a symbol unless its name collides with an earlier declaration.
/// An external name never coexists with a local one, in either order; a
/// local name never repeats; re-declaring the same external is ignored.
fn declare(symbols: &mut SymbolTable, ctx: &mut CompileContext, symbol: Symbol) {
    let row = symbol.row as i32;
    if let Some(existing) = symbols.get(&symbol.name) {
        let existing_external = existing.kind == SymbolKind::Extern;
        let new_external = symbol.kind == SymbolKind::Extern;
        if existing_external && new_external {
            return;
        }
        let kind = if existing_external != new_external {
            DiagnosticKind::ExternConflict
        } else {
            DiagnosticKind::DuplicateLabel
        };
        ctx.report(row, kind);
        return;
    }
    symbols.insert(symbol);
}

/// Emits one word per integer of a `.data` declaration. Bad integers are
/// left for the checker to report; a zero keeps the counters honest here.
fn emit_data_values(line: &str, ctx: &mut CompileContext, row: usize) -> Result<(), AssemblyError> {
    let fields = tokenizer::tokenize(line);
    let Some(start) = fields.iter().position(|f| f.text == classifier::DATA_DIRECTIVE) else {
        return Ok(());
    };
    for field in &fields[start + 1..] {
        let value = field.text.parse::<i32>().unwrap_or(0);
        push_data(ctx, value as u16, row)?;
    }
    Ok(())
}

/// Emits the characters of a `.string` literal followed by a single zero
/// terminator. The literal runs from the first quote to the last quote on
/// the line; a malformed literal emits nothing and is reported by the
/// checker.
fn emit_string(line: &str, ctx: &mut CompileContext, row: usize) -> Result<(), AssemblyError> {
    let chars: Vec<char> = line.chars().collect();
    let Some(first) = chars.iter().position(|&c| c == '"') else {
        return Ok(());
    };
    let Some(last) = chars.iter().rposition(|&c| c == '"') else {
        return Ok(());
    };
    if last <= first {
        return Ok(());
    }
    for &c in &chars[first + 1..last] {
        push_data(ctx, c as u16, row)?;
    }
    push_data(ctx, 0, row)
}

fn push_data(ctx: &mut CompileContext, word: u16, row: usize) -> Result<(), AssemblyError> {
    if ctx.data_segment.len() >= MAX_SEGMENT_WORDS {
        return Err(AssemblyError::Internal {
            line: row,
            reason: "data segment overflow".to_string(),
        });
    }
    ctx.data_segment.push(word & WORD_MASK);
    ctx.dc += 1;
    Ok(())
}
