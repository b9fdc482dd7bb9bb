//! Common infrastructure shared by the tree reader, the passes and the driver

mod diagnostic;
mod error;
mod span;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{DiagnosticReporter, SemaError, SemaResult};
pub use span::Span;
