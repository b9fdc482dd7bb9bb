//! Symbol table with lexical-scope rollback

use std::collections::HashMap;
use std::fmt;

use crate::tree::NodeKind;

/// Category of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Variable,
    VariableArray,
    Struct,
    Function,
}

impl DeclKind {
    /// Declaration kind introduced by a node, if it declares anything
    pub fn of(kind: NodeKind) -> Option<DeclKind> {
        match kind {
            NodeKind::Variable => Some(DeclKind::Variable),
            NodeKind::VariableArray => Some(DeclKind::VariableArray),
            NodeKind::Struct => Some(DeclKind::Struct),
            NodeKind::Function => Some(DeclKind::Function),
            _ => None,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclKind::Variable => "variable",
            DeclKind::VariableArray => "array",
            DeclKind::Struct => "struct",
            DeclKind::Function => "function",
        };
        f.write_str(name)
    }
}

/// What a name is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub kind: DeclKind,
    pub ty: String,
}

impl Binding {
    pub fn new(kind: DeclKind, ty: impl Into<String>) -> Self {
        Self { kind, ty: ty.into() }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DeclKind::Function => write!(f, "function {}", self.ty),
            _ => f.write_str(&self.ty),
        }
    }
}

/// Names visible while one function or global scope is analyzed
///
/// Every definition is also pushed on an undo log. A scope records
/// [`SymbolTable::mark`] on entry and calls [`SymbolTable::rollback`] on exit,
/// which removes exactly the names declared since.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    bindings: HashMap<String, Binding>,
    declared: Vec<String>,
}

/// Position in the undo log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMark(usize);

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bind a name; returns the existing binding if the name is taken
    pub fn define(&mut self, name: &str, binding: Binding) -> Result<(), &Binding> {
        if self.bindings.contains_key(name) {
            return Err(&self.bindings[name]);
        }
        self.bindings.insert(name.to_string(), binding);
        self.declared.push(name.to_string());
        Ok(())
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark(self.declared.len())
    }

    /// Drop every name defined after `mark`; returns how many were dropped
    pub fn rollback(&mut self, mark: ScopeMark) -> usize {
        let dropped = self.declared.len().saturating_sub(mark.0);
        for name in self.declared.drain(mark.0..) {
            self.bindings.remove(&name);
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
