//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic as Report, Label};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

use super::{Diagnostic, Span};
use crate::tree::NodeKind;

/// Hard failure: the input cannot be analyzed at all
///
/// These are distinct from [`Diagnostic`]s. A diagnostic is a problem in the
/// analyzed program; a `SemaError` means the tree producer and the analyzer
/// disagree about the tree shape, or the tree dump could not be read.
#[derive(Error, Debug)]
pub enum SemaError {
    #[error("Syntax error at {span:?}: {message}")]
    Syntax { message: String, span: Span },

    #[error("Malformed {kind} node at line {line}: {message}")]
    MalformedNode {
        kind: NodeKind,
        line: u32,
        message: String,
    },

    #[error("Unexpected {kind} node at line {line} while {context}")]
    UnexpectedNode {
        kind: NodeKind,
        line: u32,
        context: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SemaError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn malformed(kind: NodeKind, line: u32, message: impl Into<String>) -> Self {
        Self::MalformedNode {
            kind,
            line,
            message: message.into(),
        }
    }

    pub fn unexpected(kind: NodeKind, line: u32, context: &'static str) -> Self {
        Self::UnexpectedNode {
            kind,
            line,
            context,
        }
    }
}

pub type SemaResult<T> = Result<T, SemaError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(choice: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(choice),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    /// Report a hard error against the tree dump it came from
    pub fn report_error(&self, file_id: usize, error: &SemaError) {
        let report = match error {
            SemaError::Syntax { message, span } => Report::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message),
                ]),

            SemaError::MalformedNode { .. } | SemaError::UnexpectedNode { .. } => {
                Report::bug().with_message(error.to_string())
            }

            SemaError::Io(err) => Report::error().with_message(format!("IO error: {err}")),
        };

        self.emit(&report);
    }

    /// Report a semantic diagnostic
    ///
    /// With `program` set, the diagnostic is labelled on that file's line;
    /// otherwise only the message and line number are shown.
    pub fn report_diagnostic(&self, program: Option<usize>, diagnostic: &Diagnostic) {
        let line_index = diagnostic.line.saturating_sub(1) as usize;
        let range = program.and_then(|id| {
            self.files
                .line_range(id, line_index)
                .ok()
                .map(|range| (id, range))
        });

        let report = match range {
            Some((id, range)) => Report::error()
                .with_message("Semantic error")
                .with_labels(vec![
                    Label::primary(id, range).with_message(&diagnostic.message),
                ]),
            None => Report::error().with_message(diagnostic.to_string()),
        };

        self.emit(&report);
    }

    fn emit(&self, report: &Report<usize>) {
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, report);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
