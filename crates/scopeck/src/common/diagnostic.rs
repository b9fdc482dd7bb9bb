//! User-facing semantic diagnostics
//!
//! Diagnostics are plain values: every check pushes them into a `Vec` and
//! keeps walking. Nothing in the analyzer prints.

use std::fmt;

/// Category of a reported problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Name already bound in the active scope
    DuplicateDefinition,
    /// Field name repeated inside one struct body
    RepeatedField,
    /// Unknown type name referenced by a declaration
    UndefinedType,
    /// Identifier used without a visible declaration
    UndefinedVariable,
    /// Type name used where a variable was expected
    NameExpected,
    /// Struct chain segment that is not a field of the current struct
    UnknownField,
    /// Chain segment used with a shape its declaration does not allow
    WrongCall,
    /// Non-void function without any return statement
    MissingReturn,
    /// Bare `return` in a non-void function
    MissingReturnValue,
    /// `return`, `break` or `skip` outside of its valid context
    MisplacedKeyword,
}

/// A problem found by one of the semantic passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: u32,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
        }
    }

    pub fn duplicate(name: &str, prior: &str, line: u32) -> Self {
        Self::new(
            DiagnosticKind::DuplicateDefinition,
            format!("\"{name}\" already defined as \"{prior}\""),
            line,
        )
    }

    pub fn undefined_type(ty: &str, line: u32) -> Self {
        Self::new(
            DiagnosticKind::UndefinedType,
            format!("undefined type \"{ty}\" used"),
            line,
        )
    }

    pub fn undefined_variable(name: &str, line: u32) -> Self {
        Self::new(
            DiagnosticKind::UndefinedVariable,
            format!("usage of undefined variable \"{name}\""),
            line,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Semantic error at line {}: {}", self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_line() {
        let diag = Diagnostic::undefined_variable("x", 7);
        assert_eq!(
            diag.to_string(),
            "Semantic error at line 7: usage of undefined variable \"x\""
        );
    }

    #[test]
    fn test_duplicate_message() {
        let diag = Diagnostic::duplicate("Point", "struct", 3);
        assert_eq!(diag.kind, DiagnosticKind::DuplicateDefinition);
        assert_eq!(diag.message, "\"Point\" already defined as \"struct\"");
    }
}
