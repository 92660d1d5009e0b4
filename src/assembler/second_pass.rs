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
use crate::operations::find_operation;
use crate::tokenizer;

use super::symbol_table::{SymbolKind, SymbolTable};
use super::{CompileContext, ExternalRef, LOAD_ADDRESS, MAX_SEGMENT_WORDS, encoder, first_pass};

/// Pass 2: re-walk the expanded source with the symbol table in hand.
/// `.entry` declarations promote their symbol; every instruction is encoded
/// into the code segment; each operand word that names an external label is
/// recorded with its absolute address for the externals artifact.
pub fn generate_code(
    source: &str,
    symbols: &mut SymbolTable,
    ctx: &mut CompileContext,
) -> Result<(), AssemblyError> {
    ctx.ic = 0;

    for (index, line) in source.lines().enumerate() {
        let row = index + 1;
        match classifier::classify(line) {
            LineKind::Entry => mark_entry(line, symbols, ctx, row),
            LineKind::Instruction => encode_line(line, symbols, ctx, row)?,
            _ => {}
        }
    }
    Ok(())
}

/// Promotes the named symbol to an entry. Naming an external symbol or an
/// undefined one is reported instead.
fn mark_entry(line: &str, symbols: &mut SymbolTable, ctx: &mut CompileContext, row: usize) {
    let fields = tokenizer::tokenize(line);
    let Some(argument) = first_pass::declaration_argument(&fields) else {
        return;
    };
    match symbols.get_mut(&argument.text) {
        Some(symbol) if symbol.kind == SymbolKind::Extern => {
            ctx.report(row as i32, DiagnosticKind::ExternAndEntry);
        }
        Some(symbol) => symbol.kind = SymbolKind::Entry,
        None => ctx.report(row as i32, DiagnosticKind::EntryNotDefined),
    }
}

fn encode_line(
    line: &str,
    symbols: &SymbolTable,
    ctx: &mut CompileContext,
    row: usize,
) -> Result<(), AssemblyError> {
    let fields = tokenizer::tokenize(line);
    let Some(name_index) = classifier::mnemonic_index(&fields) else {
        // an unknown mnemonic was already reported; keep the counter moving
        ctx.ic += first_pass::instruction_width(&fields);
        return Ok(());
    };
    let Some(operation) = find_operation(&fields[name_index].text) else {
        return Ok(());
    };
    let operands = classifier::operands(&fields);
    let encoding = encoder::encode_instruction(operation, &operands, symbols);

    for _ in 0..encoding.undefined_labels {
        ctx.report(row as i32, DiagnosticKind::UndefinedLabel);
    }
    for (name, offset) in &encoding.extern_uses {
        ctx.externals.push(ExternalRef {
            name: name.clone(),
            address: LOAD_ADDRESS + ctx.ic + offset,
        });
    }
    for word in &encoding.words {
        if ctx.code_segment.len() >= MAX_SEGMENT_WORDS {
            return Err(AssemblyError::Internal {
                line: row,
                reason: "code segment overflow".to_string(),
            });
        }
        ctx.code_segment.push(*word);
    }
    ctx.ic += encoding.words.len() as u16;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::first_pass::build_symbol_table;

    fn run_both_passes(source: &str) -> (SymbolTable, CompileContext) {
        let mut ctx = CompileContext::new();
        let mut symbols = build_symbol_table(source, &mut ctx).unwrap();
        generate_code(source, &mut symbols, &mut ctx).unwrap();
        (symbols, ctx)
    }

    #[test]
    fn test_code_segment_matches_final_ic() {
        let (_, ctx) = run_both_passes("mov @r3, @r5\nstop\n");
        assert_eq!(ctx.code_segment.len() as u16, ctx.final_ic);
        assert_eq!(ctx.code_segment, vec![0xA14, 0x194, 0x1E0]);
    }

    #[test]
    fn test_label_reference_is_relocatable() {
        let (_, ctx) = run_both_passes("X: .data 7, -3\n mov X, @r1\n stop\n");
        // X relocated past the four code words: 100 + 4
        assert_eq!(ctx.code_segment[1], (104 << 2) | encoder::ARE_RELOCATABLE);
    }

    #[test]
    fn test_extern_reference_recorded_with_word_address() {
        let (_, ctx) = run_both_passes(".extern K\n jmp K\n");
        assert_eq!(ctx.code_segment[1], encoder::ARE_EXTERNAL);
        assert_eq!(
            ctx.externals,
            vec![ExternalRef { name: "K".to_string(), address: 101 }]
        );
    }

    #[test]
    fn test_both_extern_operands_are_recorded() {
        let (_, ctx) = run_both_passes(".extern A\n.extern B\nmov A, B\nstop\n");
        assert_eq!(
            ctx.externals,
            vec![
                ExternalRef { name: "A".to_string(), address: 101 },
                ExternalRef { name: "B".to_string(), address: 102 },
            ]
        );
    }

    #[test]
    fn test_entry_promotion() {
        let (symbols, ctx) = run_both_passes("MAIN: stop\n.entry MAIN\n");
        assert!(!ctx.has_errors());
        let symbol = symbols.get("MAIN").unwrap();
        assert_eq!(symbol.kind, SymbolKind::Entry);
        assert_eq!(symbol.address, 100);
    }

    #[test]
    fn test_entry_of_extern_is_reported() {
        let (_, ctx) = run_both_passes(".extern K\n.entry K\nstop\n");
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].kind, DiagnosticKind::ExternAndEntry);
        assert_eq!(ctx.diagnostics[0].row, 2);
    }

    #[test]
    fn test_entry_of_missing_symbol_is_reported() {
        let (_, ctx) = run_both_passes(".entry NOPE\nstop\n");
        assert_eq!(ctx.diagnostics[0].kind, DiagnosticKind::EntryNotDefined);
    }

    #[test]
    fn test_undefined_label_operand_is_reported() {
        let (_, ctx) = run_both_passes("jmp NOWHERE\n");
        assert_eq!(ctx.diagnostics[0].kind, DiagnosticKind::UndefinedLabel);
        // the word still exists, as an absolute zero
        assert_eq!(ctx.code_segment[1], 0);
    }
}
