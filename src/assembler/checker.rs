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

//! Per-line validation of the expanded source. Each line reports at most one
//! problem; the checks run in a fixed priority order and the first failure
//! wins.

use crate::classifier::{self, LineKind, Operand};
use crate::errors::DiagnosticKind;
use crate::operations::{Operation, find_operation, register_number};
use crate::tokenizer::{self, Field};

use super::{CompileContext, MEMORY_WORDS};

/// Checks every line, then the program as a whole: a clean program must
/// still fit the machine's memory.
pub fn check_program(source: &str, ctx: &mut CompileContext) {
    for (index, line) in source.lines().enumerate() {
        let row = (index + 1) as i32;
        let fault = match classifier::classify(line) {
            LineKind::Empty => None,
            LineKind::Instruction => check_instruction(line),
            LineKind::Extern | LineKind::Entry => check_declaration(line),
            LineKind::Data => check_data(line),
            LineKind::String => check_string(line),
            LineKind::Unrecognized => Some(DiagnosticKind::UnrecognizedDeclaration),
        };
        if let Some(kind) = fault {
            ctx.report(row, kind);
        }
    }
    if !ctx.has_errors() && ctx.final_ic + ctx.final_dc > MEMORY_WORDS {
        ctx.report(-1, DiagnosticKind::MemoryOverflow);
    }
}

fn check_instruction(line: &str) -> Option<DiagnosticKind> {
    let fields = tokenizer::tokenize(line);

    if invalid_label(&fields) {
        return Some(DiagnosticKind::InvalidLabelCharacters);
    }
    let Some(name_index) = classifier::mnemonic_index(&fields) else {
        return Some(DiagnosticKind::UndefinedCommand);
    };
    let operation = find_operation(&fields[name_index].text)?;

    if let Some(fault) = comma_fault(line, &fields, name_index) {
        return Some(fault);
    }
    if let Some(fault) = extraneous_text(line, &fields, name_index, operation) {
        return Some(fault);
    }
    let given = fields.len() - (name_index + 1);
    if given < operation.arity {
        return Some(DiagnosticKind::MissingArguments);
    }
    if given > operation.arity {
        return Some(DiagnosticKind::TooManyArguments);
    }
    let operands = classifier::operands(&fields);
    if let Some(fault) = operand_kinds_fault(&operands, operation) {
        return Some(fault);
    }
    operands
        .iter()
        .find(|o| o.text.starts_with('@') && register_number(&o.text).is_none())
        .map(|_| DiagnosticKind::UndefinedRegister)
}

/// A first field that tries to be a label must be `NAME:` with NAME starting
/// with a letter and continuing with letters and digits.
fn invalid_label(fields: &[Field]) -> bool {
    let Some(first) = fields.first() else {
        return false;
    };
    let Some(name) = first.text.strip_suffix(':') else {
        return first.text.contains(':');
    };
    let mut chars = name.chars();
    !(chars.next().is_some_and(|c| c.is_alphabetic()) && chars.all(|c| c.is_alphanumeric()))
}

/// Comma placement: none next to the label or the mnemonic, exactly one
/// between successive operands.
fn comma_fault(line: &str, fields: &[Field], name_index: usize) -> Option<DiagnosticKind> {
    for index in 0..name_index {
        if gap_commas(line, &fields[index], &fields[index + 1]) > 0 {
            return Some(DiagnosticKind::IllegalComma);
        }
    }
    if fields.len() > name_index + 1
        && gap_commas(line, &fields[name_index], &fields[name_index + 1]) > 0
    {
        return Some(DiagnosticKind::IllegalComma);
    }
    for index in name_index + 1..fields.len().saturating_sub(1) {
        match gap_commas(line, &fields[index], &fields[index + 1]) {
            0 => return Some(DiagnosticKind::MissingComma),
            1 => {}
            _ => return Some(DiagnosticKind::ConsecutiveCommas),
        }
    }
    None
}

fn gap_commas(line: &str, left: &Field, right: &Field) -> usize {
    tokenizer::between(line, left.end + 1, right.start)
        .chars()
        .filter(|&c| c == ',')
        .count()
}

/// Anything but whitespace after the last operand is extraneous. Only
/// checked when the field count itself is right, so a wrong count reports
/// as a count problem instead.
fn extraneous_text(
    line: &str,
    fields: &[Field],
    name_index: usize,
    operation: &Operation,
) -> Option<DiagnosticKind> {
    if fields.len() != name_index + 1 + operation.arity {
        return None;
    }
    let last = fields.last()?;
    let trailing = tokenizer::between(line, last.end + 1, line.chars().count());
    if trailing.chars().any(|c| c != ' ' && c != '\t') {
        return Some(DiagnosticKind::ExtraneousText);
    }
    None
}

fn operand_kinds_fault(operands: &[Operand], operation: &Operation) -> Option<DiagnosticKind> {
    let slots = [operation.src, operation.dst];
    let permitted = match operation.arity {
        1 => &slots[1..],
        2 => &slots[..],
        _ => return None,
    };
    for (operand, allowed) in operands.iter().zip(permitted) {
        if !operand
            .addressing
            .kind()
            .is_some_and(|kind| allowed.contains(&kind))
        {
            return Some(DiagnosticKind::InvalidOperandType);
        }
    }
    None
}

/// An `.extern`/`.entry` line carries exactly one label argument after the
/// directive (plus an optional leading label, which declares nothing).
fn check_declaration(line: &str) -> Option<DiagnosticKind> {
    let fields = tokenizer::tokenize(line);
    if invalid_label(&fields) {
        return Some(DiagnosticKind::InvalidLabelCharacters);
    }
    let expected = if classifier::leading_label(line).is_some() { 3 } else { 2 };
    if fields.len() > expected {
        return Some(DiagnosticKind::ExtraneousText);
    }
    if fields.len() < expected {
        return Some(DiagnosticKind::DeclarationWithoutLabel);
    }
    let argument = &fields[expected - 1].text;
    let mut chars = argument.chars();
    if !(chars.next().is_some_and(|c| c.is_alphabetic()) && chars.all(|c| c.is_alphanumeric())) {
        return Some(DiagnosticKind::InvalidLabelCharacters);
    }
    None
}

fn check_data(line: &str) -> Option<DiagnosticKind> {
    let fields = tokenizer::tokenize(line);
    if invalid_label(&fields) {
        return Some(DiagnosticKind::InvalidLabelCharacters);
    }
    let start = fields
        .iter()
        .position(|f| f.text == classifier::DATA_DIRECTIVE)?;
    if fields.len() == start + 1 {
        return Some(DiagnosticKind::MissingArguments);
    }
    fields[start + 1..]
        .iter()
        .find(|f| f.text.parse::<i32>().is_err())
        .map(|_| DiagnosticKind::InvalidDataValue)
}

fn check_string(line: &str) -> Option<DiagnosticKind> {
    let fields = tokenizer::tokenize(line);
    if invalid_label(&fields) {
        return Some(DiagnosticKind::InvalidLabelCharacters);
    }
    let chars: Vec<char> = line.chars().collect();
    let first = chars.iter().position(|&c| c == '"');
    let last = chars.iter().rposition(|&c| c == '"');
    match (first, last) {
        (Some(open), Some(close)) if close > open => None,
        _ => Some(DiagnosticKind::UnterminatedString),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Diagnostic;

    fn check(source: &str) -> Vec<Diagnostic> {
        let mut ctx = CompileContext::new();
        check_program(source, &mut ctx);
        ctx.diagnostics
    }

    fn single_fault(source: &str) -> DiagnosticKind {
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1, "expected one diagnostic for {source:?}");
        diagnostics[0].kind
    }

    #[test]
    fn test_clean_program() {
        assert!(check("MAIN: mov @r1, @r2\nprn -5\nstop\n").is_empty());
    }

    #[test]
    fn test_missing_comma() {
        assert_eq!(single_fault("add @r1 @r2\n"), DiagnosticKind::MissingComma);
    }

    #[test]
    fn test_illegal_comma_after_mnemonic() {
        assert_eq!(single_fault("add, @r1, @r2\n"), DiagnosticKind::IllegalComma);
    }

    #[test]
    fn test_illegal_comma_after_label() {
        assert_eq!(
            single_fault("LOOP:, add @r1, @r2\n"),
            DiagnosticKind::IllegalComma
        );
    }

    #[test]
    fn test_consecutive_commas() {
        assert_eq!(
            single_fault("add @r1,,@r2\n"),
            DiagnosticKind::ConsecutiveCommas
        );
        assert_eq!(
            single_fault("add @r1,,,@r2\n"),
            DiagnosticKind::ConsecutiveCommas
        );
    }

    #[test]
    fn test_undefined_command() {
        assert_eq!(single_fault("mova @r1, @r2\n"), DiagnosticKind::UndefinedCommand);
    }

    #[test]
    fn test_bare_label_is_an_undefined_command() {
        assert_eq!(single_fault("LOOP:\n"), DiagnosticKind::UndefinedCommand);
    }

    #[test]
    fn test_invalid_label_characters() {
        assert_eq!(
            single_fault("1X: mov @r1, @r2\n"),
            DiagnosticKind::InvalidLabelCharacters
        );
    }

    #[test]
    fn test_argument_counts() {
        assert_eq!(single_fault("mov @r1\n"), DiagnosticKind::MissingArguments);
        assert_eq!(
            single_fault("mov @r1, @r2, @r3\n"),
            DiagnosticKind::TooManyArguments
        );
        assert_eq!(single_fault("stop @r1\n"), DiagnosticKind::TooManyArguments);
    }

    #[test]
    fn test_extraneous_trailing_comma() {
        assert_eq!(
            single_fault("mov @r1, @r2,\n"),
            DiagnosticKind::ExtraneousText
        );
    }

    #[test]
    fn test_disallowed_addressing() {
        // lea's source operand must be a label
        assert_eq!(
            single_fault("lea @r1, @r2\n"),
            DiagnosticKind::InvalidOperandType
        );
        // mov cannot store into an immediate
        assert_eq!(
            single_fault("mov @r1, 5\n"),
            DiagnosticKind::InvalidOperandType
        );
        // a malformed register is not any addressing form
        assert_eq!(single_fault("jmp @r9\n"), DiagnosticKind::InvalidOperandType);
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            single_fault(".extern\n"),
            DiagnosticKind::DeclarationWithoutLabel
        );
        assert_eq!(single_fault(".extern A B\n"), DiagnosticKind::ExtraneousText);
        assert_eq!(
            single_fault(".entry 1A\n"),
            DiagnosticKind::InvalidLabelCharacters
        );
        assert!(check("LAB: .extern K\n").is_empty());
    }

    #[test]
    fn test_unrecognized_declaration() {
        assert_eq!(
            single_fault(".dta 5\n"),
            DiagnosticKind::UnrecognizedDeclaration
        );
    }

    #[test]
    fn test_data_values() {
        assert_eq!(
            single_fault("X: .data 7, a\n"),
            DiagnosticKind::InvalidDataValue
        );
        assert_eq!(single_fault(".data\n"), DiagnosticKind::MissingArguments);
        assert!(check("X: .data 7, -3, +2\n").is_empty());
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            single_fault(".string \"abc\n"),
            DiagnosticKind::UnterminatedString
        );
        assert!(check(".string \"abc\"\n").is_empty());
    }

    #[test]
    fn test_one_fault_per_line() {
        // both a bad comma and a bad count; only the comma is reported
        let diagnostics = check("add @r1 @r2 @r3\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingComma);
    }

    #[test]
    fn test_memory_overflow_is_program_wide() {
        let mut ctx = CompileContext::new();
        ctx.final_ic = 1000;
        ctx.final_dc = 200;
        check_program("stop\n", &mut ctx);
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].row, -1);
        assert_eq!(ctx.diagnostics[0].kind, DiagnosticKind::MemoryOverflow);
    }

    #[test]
    fn test_overflow_not_reported_alongside_line_errors() {
        let mut ctx = CompileContext::new();
        ctx.final_ic = 2000;
        check_program("add @r1 @r2\n", &mut ctx);
        assert!(
            ctx.diagnostics
                .iter()
                .all(|d| d.kind != DiagnosticKind::MemoryOverflow)
        );
    }
}
