//! Scopeck - semantic analysis for a small C-like language
//!
//! Given the syntax tree produced by the front end's parser, scopeck checks:
//! - variable, function and struct declarations against lexical scopes
//! - identifier uses and struct field-access chains
//! - return statements against declared return types
//! - placement of `return`, `break` and `skip`
//!
//! ## Architecture
//!
//! - **Tree** (`tree/`): arena syntax tree and the tree-dump reader
//! - **Sema** (`sema/`): type registry, symbol table and the passes
//! - **Driver** (`driver/`): pass pipeline and report aggregation
//! - **Common** (`common/`): diagnostics, errors, reporting

pub mod common;
pub mod driver;
pub mod sema;
pub mod tree;

// Re-exports for convenience
pub use common::{Diagnostic, DiagnosticKind, DiagnosticReporter, SemaError, SemaResult, Span};
pub use driver::{AnalysisConfig, Pipeline, Report, SemanticPass};
pub use tree::{NodeId, NodeKind, Tree, TreeReader};
