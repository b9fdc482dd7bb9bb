//! Declared type of an expression atom

use super::resolve::lookup;
use super::types::element_of;
use crate::common::{SemaError, SemaResult};
use crate::tree::{NodeId, NodeKind, Tree};

/// Type recorded by a declaration node
///
/// Structs are their own type; functions report their return type.
fn declaration_type(tree: &Tree, decl: NodeId) -> SemaResult<&str> {
    match tree.kind(decl) {
        NodeKind::Struct => tree.declared_name(decl),
        _ => tree.declared_type(decl),
    }
}

/// Resolve the declared type of `atom`
///
/// Constants, variables and array allocations carry their type. Identifiers,
/// calls and array elements are looked up from their position in the tree;
/// `None` means the name has no visible declaration.
pub fn atom_type(tree: &Tree, atom: NodeId) -> SemaResult<Option<&str>> {
    match tree.kind(atom) {
        NodeKind::Const | NodeKind::Variable | NodeKind::VariableArray | NodeKind::ArrayAlloc => {
            tree.declared_type(atom).map(Some)
        }
        NodeKind::ArrayElement => {
            let name = tree.declared_name(atom)?;
            let index = tree
                .children(atom)
                .iter()
                .copied()
                .find(|&child| tree.kind(child) != NodeKind::Id)
                .unwrap_or(atom);
            match lookup(tree, name, index)? {
                Some(decl) => Ok(Some(element_of(declaration_type(tree, decl)?))),
                None => Ok(None),
            }
        }
        NodeKind::FuncCall | NodeKind::Id => {
            let name = tree.declared_name(atom)?;
            match lookup(tree, name, atom)? {
                Some(decl) => declaration_type(tree, decl).map(Some),
                None => Ok(None),
            }
        }
        kind @ (NodeKind::Function
        | NodeKind::Struct
        | NodeKind::Assign
        | NodeKind::ChainCall
        | NodeKind::Scope
        | NodeKind::Content
        | NodeKind::FuncArgs
        | NodeKind::Type
        | NodeKind::DataType
        | NodeKind::Return
        | NodeKind::Break
        | NodeKind::Skip
        | NodeKind::While
        | NodeKind::DoWhile) => Err(SemaError::unexpected(
            kind,
            tree.line(atom),
            "resolving the type of an atom",
        )),
    }
}
