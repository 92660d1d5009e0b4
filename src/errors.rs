use std::fmt;
use thiserror::Error;

/// Conditions that abort a compile outright, as opposed to diagnostics in
/// the user's program, which are collected and reported together.
#[derive(Error, Debug, PartialEq)]
pub enum AssemblyError {
    #[error("Internal error on line {line}: {reason}")]
    Internal { line: usize, reason: String },
}

/// Everything the checks can complain about in a user program.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[error("Undefined command!")]
    UndefinedCommand,

    #[error("Missing arguments!")]
    MissingArguments,

    #[error("Too many arguments!")]
    TooManyArguments,

    #[error("Label name contains invalid characters!")]
    InvalidLabelCharacters,

    #[error("Extraneous text after end of command!")]
    ExtraneousText,

    #[error("Invalid operand type!")]
    InvalidOperandType,

    #[error("External label was also defined in this file!")]
    ExternConflict,

    #[error("Multiple definitions of the same label!")]
    DuplicateLabel,

    #[error("Undefined register name!")]
    UndefinedRegister,

    #[error("Label was declared both as entry and as external!")]
    ExternAndEntry,

    #[error("Entry label was not defined in this file!")]
    EntryNotDefined,

    #[error("Undefined label!")]
    UndefinedLabel,

    #[error("Illegal comma!")]
    IllegalComma,

    #[error("Missing comma!")]
    MissingComma,

    #[error("Multiple consecutive commas!")]
    ConsecutiveCommas,

    #[error("Unrecognized declaration!")]
    UnrecognizedDeclaration,

    #[error("The .extern/.entry declaration does not name a label!")]
    DeclarationWithoutLabel,

    #[error("Unterminated string literal!")]
    UnterminatedString,

    #[error("Invalid integer in .data declaration!")]
    InvalidDataValue,

    #[error("Macro defined inside another macro definition!")]
    NestedMacroDefinition,

    #[error("Macro definition is never closed!")]
    UnterminatedMacro,

    #[error("Multiple definitions of the same macro!")]
    DuplicateMacro,

    #[error("Macro expansion does not terminate!")]
    RecursiveMacro,

    #[error("The program consumes more memory than the machine has!")]
    MemoryOverflow,
}

/// One reported problem. `row` is the 1-based source row; program-wide
/// problems use row -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub row: i32,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(row: i32, kind: DiagnosticKind) -> Self {
        Diagnostic { row, kind }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row: {}\t|  Error: {}", self.row, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_rendering() {
        let diagnostic = Diagnostic::new(4, DiagnosticKind::MissingComma);
        assert_eq!(diagnostic.to_string(), "Row: 4\t|  Error: Missing comma!");

        let program_wide = Diagnostic::new(-1, DiagnosticKind::MemoryOverflow);
        assert_eq!(
            program_wide.to_string(),
            "Row: -1\t|  Error: The program consumes more memory than the machine has!"
        );
    }
}
