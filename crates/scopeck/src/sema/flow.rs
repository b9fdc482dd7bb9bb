//! Control-flow checks: return contracts and keyword placement
//!
//! Both checks are independent of the declaration walk and of each other.
//! Neither proves reachability: a non-void function with one valued `return`
//! is accepted even if another path falls through.

use super::types::VOID;
use crate::common::{Diagnostic, DiagnosticKind, SemaResult};
use crate::tree::{NodeId, NodeKind, Tree};

/// RETURN nodes belonging to `body`, skipping nested function bodies
fn own_returns(tree: &Tree, body: NodeId) -> Vec<NodeId> {
    let mut returns = Vec::new();
    let mut stack = vec![body];
    while let Some(id) = stack.pop() {
        match tree.kind(id) {
            NodeKind::Return => returns.push(id),
            NodeKind::Function => continue,
            _ => {}
        }
        stack.extend(tree.children(id).iter().rev());
    }
    returns
}

/// Every function's returns must match its declared type
pub fn check_returns(tree: &Tree) -> SemaResult<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();

    for func in tree.preorder(tree.root()) {
        if tree.kind(func) != NodeKind::Function {
            continue;
        }
        let ret = tree.declared_type(func)?;
        let body = tree.expect_child(func, NodeKind::Scope)?;
        let returns = own_returns(tree, body);

        if ret == VOID {
            continue;
        }
        if returns.is_empty() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingReturn,
                format!("expected return statement of type {ret}"),
                tree.line(func),
            ));
        }
        for r in returns {
            if tree.value(r).is_none() && tree.children(r).is_empty() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MissingReturnValue,
                    format!("function of type {ret} must return a value"),
                    tree.line(r),
                ));
            }
        }
    }
    Ok(diagnostics)
}

/// Innermost construct that `break` / `skip` / `return` relate to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Function,
    Loop,
}

/// Context handed down to each child
#[derive(Debug, Clone, Copy, Default)]
struct Placement {
    anchor: Option<Anchor>,
    in_function: bool,
}

/// `return` only inside functions; `break` and `skip` only inside loops
///
/// A function body is a new anchor, so a loop around a function definition
/// does not make `break` valid inside that function.
pub fn check_keywords(tree: &Tree) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut stack = vec![(tree.root(), Placement::default())];

    while let Some((id, outer)) = stack.pop() {
        let mut ctx = outer;
        match tree.kind(id) {
            NodeKind::Function => {
                ctx.anchor = Some(Anchor::Function);
                ctx.in_function = true;
            }
            NodeKind::While | NodeKind::DoWhile => ctx.anchor = Some(Anchor::Loop),
            NodeKind::Return if !ctx.in_function => diagnostics.push(Diagnostic::new(
                DiagnosticKind::MisplacedKeyword,
                "unexpected return outside function",
                tree.line(id),
            )),
            kind @ (NodeKind::Break | NodeKind::Skip) if ctx.anchor != Some(Anchor::Loop) => {
                let keyword = if kind == NodeKind::Break { "break" } else { "skip" };
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MisplacedKeyword,
                    format!("unexpected {keyword} outside loop"),
                    tree.line(id),
                ));
            }
            _ => {}
        }
        stack.extend(tree.children(id).iter().rev().map(|&child| (child, ctx)));
    }
    diagnostics
}
