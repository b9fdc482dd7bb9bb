//! Semantic analysis passes
//!
//! - `checker`: declarations, uses, scopes and struct chains
//! - `flow`: return contracts and return/break/skip placement
//! - `resolve` / `atom`: tree-based name and type lookup for later passes

mod atom;
mod checker;
mod flow;
mod resolve;
mod scope;
mod types;

pub use atom::atom_type;
pub use checker::{check, DeclarationChecker};
pub use flow::{check_keywords, check_returns};
pub use resolve::{find_declaration, lookup, nearest_scope, ScopeView};
pub use scope::{Binding, DeclKind, ScopeMark, SymbolTable};
pub use types::{array_of, element_of, Field, FieldLayout, TypeEntry, TypeRegistry, PRIMITIVES, VOID};
