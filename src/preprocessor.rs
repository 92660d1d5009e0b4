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

//! Macro discovery and expansion, run before any other pass.

use crate::errors::{Diagnostic, DiagnosticKind};
use crate::tokenizer;

pub const MACRO_START: &str = "mcro";
pub const MACRO_END: &str = "endmcro";

/// A macro definition. The body is captured by reference as a line range in
/// the source the table was built from: the lines strictly between
/// `start_index` and `finish_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub start_index: usize,
    pub finish_index: usize,
}

/// Expands every macro call in `source` and returns the expanded text.
/// Definition blocks and call lines disappear from the output; bodies are
/// inlined in their place, repeatedly, until nothing is left to substitute.
/// Problems with the definitions themselves are reported as diagnostics.
pub fn expand_macros(source: &str, diagnostics: &mut Vec<Diagnostic>) -> String {
    let source_lines: Vec<String> = source.lines().map(str::to_string).collect();
    let macros = collect_macros(&source_lines, diagnostics);

    let mut current = source_lines.clone();
    let mut rounds = 0;
    loop {
        let (next, substituted) = expand_round(&current, &macros, &source_lines);
        current = next;
        if !substituted {
            break;
        }
        rounds += 1;
        // an acyclic chain of calls needs at most one round per table entry
        if rounds > macros.len() {
            diagnostics.push(Diagnostic::new(-1, DiagnosticKind::RecursiveMacro));
            break;
        }
    }

    if current.is_empty() {
        return String::new();
    }
    let mut expanded = current.join("\n");
    expanded.push('\n');
    expanded
}

/// Walks the source once and records every macro definition. A definition
/// opens on a `mcro NAME` line and closes on a single-field `endmcro` line.
fn collect_macros(lines: &[String], diagnostics: &mut Vec<Diagnostic>) -> Vec<Macro> {
    let mut macros: Vec<Macro> = Vec::new();
    let mut open: Option<Macro> = None;

    for (index, line) in lines.iter().enumerate() {
        let fields = tokenizer::tokenize(line);

        if open.is_some() {
            if fields.len() == 1 && fields[0].text == MACRO_END {
                if let Some(mut definition) = open.take() {
                    definition.finish_index = index;
                    if macros.iter().any(|m| m.name == definition.name) {
                        diagnostics.push(Diagnostic::new(
                            definition.start_index as i32 + 1,
                            DiagnosticKind::DuplicateMacro,
                        ));
                    } else {
                        macros.push(definition);
                    }
                }
            } else if fields.first().is_some_and(|f| f.text == MACRO_START) {
                diagnostics.push(Diagnostic::new(
                    index as i32 + 1,
                    DiagnosticKind::NestedMacroDefinition,
                ));
            }
            continue;
        }

        if fields.len() >= 2 && fields[0].text == MACRO_START {
            open = Some(Macro {
                name: fields[1].text.clone(),
                start_index: index,
                finish_index: index,
            });
        }
    }

    if let Some(definition) = open {
        diagnostics.push(Diagnostic::new(
            definition.start_index as i32 + 1,
            DiagnosticKind::UnterminatedMacro,
        ));
    }
    macros
}

/// One substitution round. Definition blocks are dropped, single-field lines
/// naming a known macro are replaced by its body, everything else is copied
/// through verbatim.
fn expand_round(
    input: &[String],
    macros: &[Macro],
    source_lines: &[String],
) -> (Vec<String>, bool) {
    let mut output = Vec::new();
    let mut substituted = false;
    let mut inside_definition = false;

    for line in input {
        let fields = tokenizer::tokenize(line);

        if inside_definition {
            if fields.len() == 1 && fields[0].text == MACRO_END {
                inside_definition = false;
            }
            continue;
        }
        if fields.len() >= 2 && fields[0].text == MACRO_START {
            inside_definition = true;
            continue;
        }
        if fields.len() == 1 {
            if let Some(called) = macros.iter().find(|m| m.name == fields[0].text) {
                for body_line in &source_lines[called.start_index + 1..called.finish_index] {
                    output.push(body_line.clone());
                }
                substituted = true;
                continue;
            }
        }
        output.push(line.clone());
    }
    (output, substituted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(source: &str) -> (String, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let expanded = expand_macros(source, &mut diagnostics);
        (expanded, diagnostics)
    }

    #[test]
    fn test_expansion_is_identity_without_macros() {
        let source = "mov @r1, @r2\nstop\n";
        let (expanded, diagnostics) = expand(source);
        assert_eq!(expanded, source);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_calls_are_inlined_and_definitions_removed() {
        let source = "mcro M\n inc @r2\nendmcro\nM\nM\nstop\n";
        let (expanded, diagnostics) = expand(source);
        assert_eq!(expanded, " inc @r2\n inc @r2\nstop\n");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_nested_calls_reach_a_fixed_point() {
        let source = "mcro A\nB\nendmcro\nmcro B\nstop\nendmcro\nA\n";
        let (expanded, diagnostics) = expand(source);
        assert_eq!(expanded, "stop\n");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_definition() {
        let source = "mcro M\ninc @r2\n";
        let (expanded, diagnostics) = expand(source);
        assert_eq!(expanded, "");
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(1, DiagnosticKind::UnterminatedMacro)]
        );
    }

    #[test]
    fn test_duplicate_definition_keeps_the_first() {
        let source = "mcro M\nstop\nendmcro\nmcro M\nrts\nendmcro\nM\n";
        let (expanded, diagnostics) = expand(source);
        assert_eq!(expanded, "stop\n");
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(4, DiagnosticKind::DuplicateMacro)]
        );
    }

    #[test]
    fn test_nested_definition_is_reported() {
        let source = "mcro A\nmcro B\nendmcro\nstop\n";
        let (_, diagnostics) = expand(source);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(2, DiagnosticKind::NestedMacroDefinition)]
        );
    }

    #[test]
    fn test_self_reference_is_reported() {
        let source = "mcro M\nM\nendmcro\nM\n";
        let (_, diagnostics) = expand(source);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::RecursiveMacro)
        );
    }
}
