//! Scope resolution and declaration lookup over the tree itself
//!
//! Unlike the checker, which threads a [`SymbolTable`](super::SymbolTable)
//! through its walk, these helpers answer "where is `name` declared, as seen
//! from this node?" by walking parent links.

use crate::common::SemaResult;
use crate::tree::{NodeId, NodeKind, Tree};

/// A scope node, plus the parameter list of the function it is the body of
///
/// Parameters are presented as if they were declared at the top of the body
/// without touching the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeView {
    pub scope: NodeId,
    pub params: Option<NodeId>,
}

impl ScopeView {
    /// Direct children of the scope, followed by the function parameters
    pub fn entries(self, tree: &Tree) -> impl Iterator<Item = NodeId> + '_ {
        let params = self
            .params
            .map(|args| tree.children(args))
            .unwrap_or_default();
        tree.children(self.scope)
            .iter()
            .chain(params)
            .copied()
    }
}

/// Closest SCOPE or CONTENT node above `node`
pub fn nearest_scope(tree: &Tree, node: NodeId) -> Option<ScopeView> {
    let mut current = node;
    loop {
        let parent = tree.parent(current)?;
        if tree.kind(parent).is_scope() {
            let params = tree
                .parent(parent)
                .filter(|&owner| tree.kind(owner) == NodeKind::Function)
                .and_then(|func| tree.child_of_kind(func, NodeKind::FuncArgs));
            return Some(ScopeView {
                scope: parent,
                params,
            });
        }
        current = parent;
    }
}

/// Nearest declaration of `name`, searching `scope` and then outward
pub fn find_declaration(tree: &Tree, name: &str, scope: ScopeView) -> SemaResult<Option<NodeId>> {
    let mut view = Some(scope);
    while let Some(current) = view {
        for entry in current.entries(tree) {
            let decl = if tree.kind(entry) == NodeKind::Assign {
                match tree.children(entry).first() {
                    Some(&target) => target,
                    None => continue,
                }
            } else {
                entry
            };

            if tree.kind(decl).is_declaration() && tree.declared_name(decl)? == name {
                return Ok(Some(decl));
            }
        }
        view = nearest_scope(tree, current.scope);
    }
    Ok(None)
}

/// Declaration of `name` visible from `node`
pub fn lookup(tree: &Tree, name: &str, node: NodeId) -> SemaResult<Option<NodeId>> {
    match nearest_scope(tree, node) {
        Some(scope) => find_declaration(tree, name, scope),
        None => Ok(None),
    }
}
