//! Declaration and scope checker
//!
//! One depth-first walk over the tree, driven by an explicit work stack so
//! nesting depth is bounded by the heap rather than the call stack. At every
//! node, the direct children that declare or use a name are handled first (in
//! order); every other child is then walked with the same type registry and
//! symbol table. Leaving a SCOPE or CONTENT node rolls the symbol table back to
//! its state on entry.
//!
//! Function bodies are checked against a fresh table holding only the
//! function's parameters: nothing from the enclosing scope is captured.

use log::{debug, trace};

use super::scope::{Binding, DeclKind, ScopeMark, SymbolTable};
use super::types::{element_of, Field, FieldLayout, TypeRegistry, VOID};
use crate::common::{Diagnostic, DiagnosticKind, SemaError, SemaResult};
use crate::tree::{NodeId, NodeKind, Tree};

/// How the checker treats a node appearing as a child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Struct,
    Function,
    Declaration,
    Use,
    Assign,
    Chain,
    /// Not a declaration or use itself; search its subtree
    Walk,
}

impl Role {
    fn of(kind: NodeKind) -> Role {
        match kind {
            NodeKind::Struct => Role::Struct,
            NodeKind::Function => Role::Function,
            NodeKind::Variable | NodeKind::VariableArray => Role::Declaration,
            NodeKind::Id => Role::Use,
            NodeKind::Assign => Role::Assign,
            NodeKind::ChainCall => Role::Chain,
            NodeKind::FuncCall
            | NodeKind::ArrayElement
            | NodeKind::ArrayAlloc
            | NodeKind::Scope
            | NodeKind::Content
            | NodeKind::FuncArgs
            | NodeKind::Type
            | NodeKind::DataType
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Skip
            | NodeKind::While
            | NodeKind::DoWhile
            | NodeKind::Const => Role::Walk,
        }
    }
}

/// Pending step of the walk
///
/// Every task runs against the table on top of the table stack, which is the
/// table that was current when the task was scheduled.
#[derive(Debug, Clone, Copy)]
enum Task {
    /// Handle a node according to its role
    Visit(NodeId),
    /// Visit the declaring children of a node, then walk the rest
    Children(NodeId),
    /// Roll back to the mark if the node is a scope
    Leave(NodeId, ScopeMark),
    /// Resolve a chain's segments once its arguments are checked
    Chain(NodeId),
    /// Drop the parameter table of a finished function body
    EndFunction,
}

/// Declaration kind a chain segment's shape asks for
fn implied_kind(tree: &Tree, segment: NodeId) -> SemaResult<DeclKind> {
    match tree.kind(segment) {
        NodeKind::Id => Ok(DeclKind::Variable),
        NodeKind::ArrayElement => Ok(DeclKind::VariableArray),
        NodeKind::FuncCall => Ok(DeclKind::Function),
        kind => Err(SemaError::unexpected(
            kind,
            tree.line(segment),
            "resolving a chain segment",
        )),
    }
}

/// Check declarations and uses below `node`
///
/// Bindings made while checking are visible through `variables` until the
/// enclosing scope node is left; if `node` itself is a scope, `variables` is
/// returned to the caller unchanged.
pub fn check(
    tree: &Tree,
    node: NodeId,
    types: &mut TypeRegistry,
    variables: &mut SymbolTable,
) -> SemaResult<Vec<Diagnostic>> {
    let mut checker = DeclarationChecker::new(tree, types);
    checker.check_node(node, variables)?;
    Ok(checker.into_diagnostics())
}

/// Walk state: the tree, the type registry and the diagnostics so far
pub struct DeclarationChecker<'a> {
    tree: &'a Tree,
    types: &'a mut TypeRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> DeclarationChecker<'a> {
    pub fn new(tree: &'a Tree, types: &'a mut TypeRegistry) -> Self {
        Self {
            tree,
            types,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Check the children of `node`, rolling back on scope exit
    pub fn check_node(&mut self, node: NodeId, vars: &mut SymbolTable) -> SemaResult<()> {
        let tree = self.tree;
        let mut tasks = vec![Task::Children(node)];
        // Parameter tables of the function bodies being checked, innermost last
        let mut locals: Vec<SymbolTable> = Vec::new();

        while let Some(task) = tasks.pop() {
            let table = match locals.last_mut() {
                Some(table) => table,
                None => &mut *vars,
            };
            match task {
                Task::Visit(child) => {
                    if let Some((body, params)) = self.visit(child, table, &mut tasks)? {
                        locals.push(params);
                        tasks.push(Task::EndFunction);
                        tasks.push(Task::Children(body));
                    }
                }
                Task::Children(parent) => {
                    tasks.push(Task::Leave(parent, table.mark()));
                    // Reversed so they pop in order: declaring children first.
                    let children = tree.children(parent);
                    tasks.extend(
                        children
                            .iter()
                            .rev()
                            .filter(|&&child| Role::of(tree.kind(child)) == Role::Walk)
                            .map(|&child| Task::Children(child)),
                    );
                    tasks.extend(
                        children
                            .iter()
                            .rev()
                            .filter(|&&child| Role::of(tree.kind(child)) != Role::Walk)
                            .map(|&child| Task::Visit(child)),
                    );
                }
                Task::Leave(scope, mark) => {
                    if tree.kind(scope).is_scope() {
                        let dropped = table.rollback(mark);
                        if dropped > 0 {
                            trace!(
                                "leaving {} at line {}: dropped {dropped} bindings",
                                tree.kind(scope),
                                tree.line(scope)
                            );
                        }
                    }
                }
                Task::Chain(chain) => self.check_chain(chain, table)?,
                Task::EndFunction => {
                    locals.pop();
                }
            }
        }
        Ok(())
    }

    /// Handle one node according to its role
    ///
    /// Work on descendants is pushed onto `tasks`. A function whose header
    /// checks out yields its body and a table seeded with its parameters.
    fn visit(
        &mut self,
        node: NodeId,
        vars: &mut SymbolTable,
        tasks: &mut Vec<Task>,
    ) -> SemaResult<Option<(NodeId, SymbolTable)>> {
        match Role::of(self.tree.kind(node)) {
            Role::Struct => self.check_struct(node)?,
            Role::Function => return self.check_function(node, vars),
            Role::Declaration => self.declare(node, vars)?,
            Role::Use => self.check_use(node, vars)?,
            Role::Assign => self.schedule_assign(node, tasks)?,
            Role::Chain => self.schedule_chain(node, tasks),
            Role::Walk => tasks.push(Task::Children(node)),
        }
        Ok(None)
    }

    fn check_struct(&mut self, node: NodeId) -> SemaResult<()> {
        let tree = self.tree;
        let name = tree.declared_name(node)?;
        let line = tree.line(node);

        if let Some(prior) = self.types.entry(name) {
            self.diagnostics
                .push(Diagnostic::duplicate(name, &prior.recorded, line));
            return Ok(());
        }

        let content = tree.expect_child(node, NodeKind::Content)?;
        let mut layout = FieldLayout::new();
        for &member in tree.children(content) {
            let field = match tree.kind(member) {
                NodeKind::Assign => *tree.children(member).first().ok_or_else(|| {
                    SemaError::malformed(NodeKind::Assign, tree.line(member), "missing target")
                })?,
                _ => member,
            };
            let kind = match DeclKind::of(tree.kind(field)) {
                Some(kind @ (DeclKind::Variable | DeclKind::VariableArray)) => kind,
                _ => {
                    return Err(SemaError::unexpected(
                        tree.kind(field),
                        tree.line(field),
                        "reading a struct field",
                    ));
                }
            };

            let field_name = tree.declared_name(field)?;
            let field_type = tree.declared_type(field)?;
            let field_line = tree.line(field);

            if !self.types.contains(field_type) {
                self.diagnostics
                    .push(Diagnostic::undefined_type(field_type, field_line));
            } else if layout.contains_key(field_name) {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::RepeatedField,
                    format!("repeat definition of field \"{field_name}\" in struct \"{name}\""),
                    field_line,
                ));
            } else {
                layout.insert(field_name.to_string(), Field::new(kind, field_type));
            }
        }

        debug!("registered struct {name} with {} fields", layout.len());
        self.types.register_struct(name, layout);
        Ok(())
    }

    fn check_function(
        &mut self,
        node: NodeId,
        vars: &mut SymbolTable,
    ) -> SemaResult<Option<(NodeId, SymbolTable)>> {
        let tree = self.tree;
        let name = tree.declared_name(node)?;
        let ret = tree.declared_type(node)?;
        let line = tree.line(node);

        if ret != VOID && !self.types.contains(ret) {
            self.diagnostics.push(Diagnostic::undefined_type(ret, line));
            return Ok(None);
        }
        if let Err(prior) = vars.define(name, Binding::new(DeclKind::Function, ret)) {
            self.diagnostics
                .push(Diagnostic::duplicate(name, &prior.to_string(), line));
            return Ok(None);
        }

        debug!("checking body of function {name} (line {line})");
        let mut params = SymbolTable::new();
        if let Some(args) = tree.child_of_kind(node, NodeKind::FuncArgs) {
            for &param in tree.children(args) {
                self.declare(param, &mut params)?;
            }
        }
        let body = tree.expect_child(node, NodeKind::Scope)?;
        Ok(Some((body, params)))
    }

    /// Bind a VARIABLE or VARIABLE_ARRAY declaration
    fn declare(&mut self, node: NodeId, vars: &mut SymbolTable) -> SemaResult<()> {
        let tree = self.tree;
        let kind = match DeclKind::of(tree.kind(node)) {
            Some(kind @ (DeclKind::Variable | DeclKind::VariableArray)) => kind,
            _ => {
                return Err(SemaError::unexpected(
                    tree.kind(node),
                    tree.line(node),
                    "declaring a variable",
                ));
            }
        };
        let name = tree.declared_name(node)?;
        let ty = tree.declared_type(node)?;
        let line = tree.line(node);

        if !self.types.contains(ty) {
            self.diagnostics.push(Diagnostic::undefined_type(ty, line));
            return Ok(());
        }
        if let Err(prior) = vars.define(name, Binding::new(kind, ty)) {
            self.diagnostics
                .push(Diagnostic::duplicate(name, &prior.to_string(), line));
        }
        Ok(())
    }

    /// An identifier used as a value
    fn check_use(&mut self, node: NodeId, vars: &SymbolTable) -> SemaResult<()> {
        let name = self.tree.declared_name(node)?;
        let line = self.tree.line(node);

        if self.types.contains(name) {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::NameExpected,
                format!("variable name expected, found type \"{name}\""),
                line,
            ));
        } else if !vars.contains(name) {
            self.diagnostics
                .push(Diagnostic::undefined_variable(name, line));
        }
        Ok(())
    }

    /// Value first, then the target, so `int x = x;` sees no `x`
    fn schedule_assign(&self, node: NodeId, tasks: &mut Vec<Task>) -> SemaResult<()> {
        let tree = self.tree;
        let Some((&target, values)) = tree.children(node).split_first() else {
            return Err(SemaError::malformed(
                NodeKind::Assign,
                tree.line(node),
                "missing target",
            ));
        };

        tasks.push(Task::Visit(target));
        tasks.extend(values.iter().rev().map(|&value| Task::Visit(value)));
        Ok(())
    }

    /// Segments of a chain, with left-nested chains flattened
    fn chain_segments(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.tree;
        let mut segments = Vec::new();
        let mut pending: Vec<NodeId> = tree.children(node).iter().rev().copied().collect();
        while let Some(child) = pending.pop() {
            if tree.kind(child) == NodeKind::ChainCall {
                pending.extend(tree.children(child).iter().rev());
            } else {
                segments.push(child);
            }
        }
        segments
    }

    /// Index and argument expressions are ordinary uses, checked before the
    /// segments themselves are resolved
    fn schedule_chain(&self, node: NodeId, tasks: &mut Vec<Task>) {
        let tree = self.tree;
        let mut args = Vec::new();
        for segment in self.chain_segments(node) {
            let name_node = tree.child_of_kind(segment, NodeKind::Id);
            args.extend(
                tree.children(segment)
                    .iter()
                    .copied()
                    .filter(|&arg| Some(arg) != name_node),
            );
        }

        tasks.push(Task::Chain(node));
        tasks.extend(args.into_iter().rev().map(Task::Visit));
    }

    fn check_chain(&mut self, node: NodeId, vars: &SymbolTable) -> SemaResult<()> {
        let tree = self.tree;
        let segments = self.chain_segments(node);

        let Some((&head, rest)) = segments.split_first() else {
            return Err(SemaError::malformed(
                NodeKind::ChainCall,
                tree.line(node),
                "empty chain",
            ));
        };

        let name = tree.declared_name(head)?;
        let shape = implied_kind(tree, head)?;
        let line = tree.line(head);

        if self.types.contains(name) {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::NameExpected,
                format!("variable name expected, found type \"{name}\""),
                line,
            ));
            return Ok(());
        }
        let Some(binding) = vars.get(name) else {
            self.diagnostics
                .push(Diagnostic::undefined_variable(name, line));
            return Ok(());
        };
        if binding.kind != shape {
            self.diagnostics
                .push(wrong_call(binding.kind, name, shape, line));
        }

        let mut current = binding.ty.clone();
        for (i, &segment) in rest.iter().enumerate() {
            let name = tree.declared_name(segment)?;
            let shape = implied_kind(tree, segment)?;
            let line = tree.line(segment);

            let field = self
                .types
                .field_layout(&current)
                .and_then(|layout| layout.get(name))
                .cloned();
            let Some(field) = field else {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnknownField,
                    format!(
                        "struct {} has no property named {name}",
                        element_of(&current)
                    ),
                    line,
                ));
                return Ok(());
            };

            // The last segment may be a call whose kind is validated elsewhere.
            let is_last = i + 1 == rest.len();
            if !is_last && field.kind != shape {
                self.diagnostics
                    .push(wrong_call(field.kind, name, shape, line));
            }
            current = field.ty;
        }
        Ok(())
    }
}

fn wrong_call(declared: DeclKind, name: &str, implied: DeclKind, line: u32) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::WrongCall,
        format!("wrong call of {declared} \"{name}\"; treated as {implied}"),
        line,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeReader;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Vec<Diagnostic> {
        let tree = TreeReader::read(source).unwrap();
        let mut types = TypeRegistry::with_primitives();
        let mut vars = SymbolTable::new();
        check(&tree, tree.root(), &mut types, &mut vars).unwrap()
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<(DiagnosticKind, u32)> {
        diagnostics.iter().map(|d| (d.kind, d.line)).collect()
    }

    const POINT: &str = "
        (STRUCT @1 (ID Point)
          (CONTENT (VARIABLE @2 (TYPE int) (ID x)) (VARIABLE @3 (TYPE int) (ID y))))";

    #[test]
    fn test_valid_program_is_clean() {
        let diags = run(&format!(
            "(SCOPE {POINT}
               (VARIABLE @4 (TYPE Point) (ID p))
               (ASSIGN @5 (VARIABLE (TYPE int) (ID n)) (CONST (TYPE int) 3))
               (WHILE @6 (ID n)
                 (SCOPE (ASSIGN @7 (ID n) (CHAIN_CALL (ID p) (ID x))))))"
        ));
        assert_eq!(diags, Vec::<Diagnostic>::new());
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let diags = run("
            (SCOPE
              (VARIABLE @1 (TYPE int) (ID x))
              (VARIABLE @2 (TYPE int) (ID x)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::DuplicateDefinition, 2)]);
        assert_eq!(diags[0].message, "\"x\" already defined as \"int\"");
    }

    #[test]
    fn test_sibling_scopes_reuse_names() {
        let diags = run("
            (SCOPE
              (WHILE @1 (CONST (TYPE boolean) true) (SCOPE (VARIABLE @2 (TYPE int) (ID x))))
              (DO_WHILE @3 (SCOPE (VARIABLE @4 (TYPE string) (ID x))) (CONST (TYPE boolean) false)))");
        assert_eq!(diags, Vec::<Diagnostic>::new());
    }

    #[test]
    fn test_scope_exit_hides_locals() {
        let diags = run("
            (SCOPE
              (WHILE @1 (CONST (TYPE boolean) true) (SCOPE (VARIABLE @2 (TYPE int) (ID x))))
              (WHILE @3 (ID x) (SCOPE)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UndefinedVariable, 3)]);
    }

    #[test]
    fn test_root_scope_restores_caller_table() {
        let tree = TreeReader::read("(SCOPE (VARIABLE (TYPE int) (ID x)))").unwrap();
        let mut types = TypeRegistry::with_primitives();
        let mut vars = SymbolTable::new();
        check(&tree, tree.root(), &mut types, &mut vars).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_undefined_type_and_variable() {
        let diags = run("
            (SCOPE
              (VARIABLE @1 (TYPE Vector) (ID v))
              (ASSIGN @2 (ID v) (ID w)))");
        assert_eq!(
            kinds(&diags),
            vec![
                (DiagnosticKind::UndefinedType, 1),
                (DiagnosticKind::UndefinedVariable, 2),
                (DiagnosticKind::UndefinedVariable, 2),
            ]
        );
        assert_eq!(diags[0].message, "undefined type \"Vector\" used");
    }

    #[test]
    fn test_assign_checks_value_before_declaring() {
        let diags = run("(SCOPE (ASSIGN @1 (VARIABLE (TYPE int) (ID x)) (ID x)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UndefinedVariable, 1)]);
    }

    #[test]
    fn test_type_name_used_as_value() {
        let diags = run("(SCOPE (ASSIGN @1 (VARIABLE (TYPE int) (ID x)) (ID int)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::NameExpected, 1)]);
    }

    #[test]
    fn test_type_name_as_assignment_target() {
        let diags = run("(SCOPE (ASSIGN @1 (ID int) (CONST (TYPE int) 1)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::NameExpected, 1)]);
        assert_eq!(diags[0].message, "variable name expected, found type \"int\"");
    }

    #[test]
    fn test_struct_redefinition_is_not_registered_twice() {
        let diags = run(&format!(
            "(SCOPE {POINT}
               (STRUCT @5 (ID Point) (CONTENT (VARIABLE @6 (TYPE float) (ID z))))
               (VARIABLE @7 (TYPE Point) (ID p))
               (ASSIGN @8 (ID p) (CHAIN_CALL (ID p) (ID z))))"
        ));
        assert_eq!(
            kinds(&diags),
            vec![
                (DiagnosticKind::DuplicateDefinition, 5),
                (DiagnosticKind::UnknownField, 8),
            ]
        );
        assert_eq!(diags[0].message, "\"Point\" already defined as \"struct\"");
    }

    #[test]
    fn test_struct_field_errors() {
        let diags = run("
            (SCOPE
              (STRUCT @1 (ID Bad)
                (CONTENT
                  (VARIABLE @2 (TYPE Missing) (ID a))
                  (VARIABLE @3 (TYPE int) (ID b))
                  (VARIABLE @4 (TYPE float) (ID b)))))");
        assert_eq!(
            kinds(&diags),
            vec![
                (DiagnosticKind::UndefinedType, 2),
                (DiagnosticKind::RepeatedField, 4),
            ]
        );
    }

    #[test]
    fn test_struct_with_primitive_name() {
        let diags = run("(SCOPE (STRUCT @1 (ID int) (CONTENT)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::DuplicateDefinition, 1)]);
        assert_eq!(diags[0].message, "\"int\" already defined as \"int\"");
    }

    #[test]
    fn test_function_sees_only_parameters() {
        let diags = run("
            (SCOPE
              (VARIABLE @1 (TYPE int) (ID g))
              (FUNCTION @2 (ID f)
                (FUNC_ARGS (VARIABLE (TYPE int) (ID a)))
                (TYPE int)
                (SCOPE (RETURN @3 (ID a)) (RETURN @4 (ID g))))
              (ASSIGN @5 (ID g) (FUNC_CALL (ID f) (ID g))))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UndefinedVariable, 4)]);
    }

    #[test]
    fn test_function_return_type_and_name() {
        let diags = run("
            (SCOPE
              (FUNCTION @1 (ID f) (FUNC_ARGS) (TYPE Nope) (SCOPE (ID unchecked)))
              (FUNCTION @2 (ID g) (FUNC_ARGS) (TYPE void) (SCOPE))
              (FUNCTION @3 (ID g) (FUNC_ARGS) (TYPE int) (SCOPE)))");
        assert_eq!(
            kinds(&diags),
            vec![
                (DiagnosticKind::UndefinedType, 1),
                (DiagnosticKind::DuplicateDefinition, 3),
            ]
        );
        assert_eq!(diags[1].message, "\"g\" already defined as \"function void\"");
    }

    #[test]
    fn test_parameters_are_validated() {
        let diags = run("
            (SCOPE
              (FUNCTION @1 (ID f)
                (FUNC_ARGS
                  (VARIABLE @1 (TYPE int) (ID a))
                  (VARIABLE @1 (TYPE int) (ID a))
                  (VARIABLE_ARRAY @1 (DATATYPE Thing[]) (ID t)))
                (TYPE void)
                (SCOPE)))");
        assert_eq!(
            kinds(&diags),
            vec![
                (DiagnosticKind::DuplicateDefinition, 1),
                (DiagnosticKind::UndefinedType, 1),
            ]
        );
    }

    #[test]
    fn test_function_locals_do_not_leak() {
        let diags = run("
            (SCOPE
              (FUNCTION @1 (ID f) (FUNC_ARGS (VARIABLE (TYPE int) (ID a))) (TYPE void)
                (SCOPE (VARIABLE @2 (TYPE int) (ID b))))
              (ASSIGN @3 (VARIABLE (TYPE int) (ID c)) (ID a))
              (ID @4 b))");
        assert_eq!(
            kinds(&diags),
            vec![
                (DiagnosticKind::UndefinedVariable, 3),
                (DiagnosticKind::UndefinedVariable, 4),
            ]
        );
    }

    const NESTED: &str = "
        (STRUCT @1 (ID A) (CONTENT (VARIABLE (TYPE int) (ID v))))
        (STRUCT @2 (ID B)
          (CONTENT (VARIABLE (TYPE A) (ID a)) (VARIABLE_ARRAY (DATATYPE A[]) (ID items))))
        (VARIABLE @3 (TYPE B) (ID b))";

    #[test]
    fn test_chain_resolves_nested_structs() {
        let diags = run(&format!(
            "(SCOPE {NESTED} (CHAIN_CALL @4 (ID b) (ID a) (ID v)))"
        ));
        assert_eq!(diags, Vec::<Diagnostic>::new());
    }

    #[test]
    fn test_chain_unknown_field_reported_at_segment() {
        let diags = run(&format!(
            "(SCOPE {NESTED} (CHAIN_CALL @4 (ID b) (ID a) (ID @5 w)))"
        ));
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UnknownField, 5)]);
        assert_eq!(diags[0].message, "struct A has no property named w");
    }

    #[test]
    fn test_left_nested_chain_is_flattened() {
        let diags = run(&format!(
            "(SCOPE {NESTED} (CHAIN_CALL @4 (CHAIN_CALL (ID b) (ID a)) (ID v)))"
        ));
        assert_eq!(diags, Vec::<Diagnostic>::new());
    }

    #[test]
    fn test_chain_head_kind_mismatch() {
        let diags = run(&format!(
            "(SCOPE {NESTED} (CHAIN_CALL @4 (ARRAY_ELEMENT (ID b) (CONST (TYPE int) 0)) (ID a)))"
        ));
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::WrongCall, 4)]);
        assert_eq!(diags[0].message, "wrong call of variable \"b\"; treated as array");
    }

    #[test]
    fn test_chain_middle_segment_kind_mismatch() {
        let diags = run(&format!(
            "(SCOPE {NESTED}
               (CHAIN_CALL @4 (ID b) (ID @5 items) (ID v))
               (CHAIN_CALL @6 (ID b) (ARRAY_ELEMENT (ID items) (CONST (TYPE int) 1)) (ID v)))"
        ));
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::WrongCall, 5)]);
        assert_eq!(diags[0].message, "wrong call of array \"items\"; treated as variable");
    }

    #[test]
    fn test_chain_last_segment_shape_is_not_checked() {
        let diags = run(&format!(
            "(SCOPE {NESTED} (CHAIN_CALL @4 (ID b) (ID items)))"
        ));
        assert_eq!(diags, Vec::<Diagnostic>::new());
    }

    #[test]
    fn test_chain_index_expressions_are_uses() {
        let diags = run(&format!(
            "(SCOPE {NESTED} (CHAIN_CALL @4 (ID b) (ARRAY_ELEMENT (ID items) (ID @5 i)) (ID v)))"
        ));
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UndefinedVariable, 5)]);
    }

    #[test]
    fn test_chain_through_call_result() {
        let diags = run(&format!(
            "(SCOPE {POINT}
               (FUNCTION @4 (ID make) (FUNC_ARGS) (TYPE Point)
                 (SCOPE (VARIABLE @5 (TYPE Point) (ID p)) (RETURN @5 (ID p))))
               (CHAIN_CALL @6 (FUNC_CALL (ID make)) (ID x)))"
        ));
        assert_eq!(diags, Vec::<Diagnostic>::new());
    }

    #[test]
    fn test_chain_call_arguments_are_uses() {
        let diags = run(&format!(
            "(SCOPE {POINT}
               (FUNCTION @4 (ID make) (FUNC_ARGS) (TYPE Point) (SCOPE))
               (CHAIN_CALL @6 (FUNC_CALL (ID make) (ID @7 seed)) (ID x)))"
        ));
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UndefinedVariable, 7)]);
    }

    #[test]
    fn test_function_used_as_chain_variable() {
        let diags = run(&format!(
            "(SCOPE {POINT}
               (FUNCTION @4 (ID make) (FUNC_ARGS) (TYPE Point) (SCOPE))
               (CHAIN_CALL @6 (ID make) (ID x)))"
        ));
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::WrongCall, 6)]);
        assert_eq!(
            diags[0].message,
            "wrong call of function \"make\"; treated as variable"
        );
    }

    #[test]
    fn test_field_called_as_function_mid_chain() {
        let diags = run(&format!(
            "(SCOPE {NESTED} (CHAIN_CALL @4 (ID b) (FUNC_CALL @5 (ID a)) (ID v)))"
        ));
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::WrongCall, 5)]);
        assert_eq!(diags[0].message, "wrong call of variable \"a\"; treated as function");
    }

    #[test]
    fn test_chain_on_undeclared_head() {
        let diags = run("(SCOPE (CHAIN_CALL @2 (ID nobody) (ID field)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UndefinedVariable, 2)]);
    }

    #[test]
    fn test_chain_into_primitive() {
        let diags = run("
            (SCOPE
              (VARIABLE @1 (TYPE int) (ID n))
              (CHAIN_CALL @2 (ID n) (ID size)))");
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UnknownField, 2)]);
        assert_eq!(diags[0].message, "struct int has no property named size");
    }

    #[test]
    fn test_checker_shares_registry_across_subtrees() {
        let tree = TreeReader::read(&format!(
            "(SCOPE (SCOPE {POINT}) (SCOPE (VARIABLE @9 (TYPE Point) (ID p))))"
        ))
        .unwrap();
        let mut types = TypeRegistry::with_primitives();
        let mut vars = SymbolTable::new();
        let mut checker = DeclarationChecker::new(&tree, &mut types);
        for &block in tree.children(tree.root()) {
            checker.check_node(block, &mut vars).unwrap();
        }
        assert_eq!(checker.diagnostics(), &[] as &[Diagnostic]);
        assert!(vars.is_empty());
    }

    #[test]
    fn test_deeply_nested_scopes() {
        let depth = 100_000;
        let mut tree = Tree::new(NodeKind::Scope, 1);
        let mut scope = tree.root();
        let decl = tree.push(scope, NodeKind::Variable, None, 1);
        tree.push(decl, NodeKind::Type, Some("int"), 1);
        tree.push(decl, NodeKind::Id, Some("x"), 1);
        for line in 2..depth + 2 {
            let looped = tree.push(scope, NodeKind::While, None, line);
            tree.push(looped, NodeKind::Id, Some("x"), line);
            scope = tree.push(looped, NodeKind::Scope, None, line);
        }
        tree.push(scope, NodeKind::Id, Some("y"), depth + 2);

        let mut types = TypeRegistry::with_primitives();
        let mut vars = SymbolTable::new();
        let diags = check(&tree, tree.root(), &mut types, &mut vars).unwrap();
        assert_eq!(kinds(&diags), vec![(DiagnosticKind::UndefinedVariable, depth + 2)]);
        assert!(vars.is_empty());
    }

    #[test]
    fn test_nested_function_tables_are_released() {
        let diags = run("
            (SCOPE
              (FUNCTION @1 (ID outer) (FUNC_ARGS (VARIABLE (TYPE int) (ID a))) (TYPE void)
                (SCOPE
                  (FUNCTION @2 (ID inner) (FUNC_ARGS (VARIABLE (TYPE int) (ID b))) (TYPE void)
                    (SCOPE (ID @3 b) (ID @3 a)))
                  (ID @4 a)
                  (ID @4 b)))
              (ID @5 a))");
        assert_eq!(
            kinds(&diags),
            vec![
                (DiagnosticKind::UndefinedVariable, 3),
                (DiagnosticKind::UndefinedVariable, 4),
                (DiagnosticKind::UndefinedVariable, 5),
            ]
        );
    }

    #[test]
    fn test_unknown_field_shape_is_a_hard_error() {
        let tree = TreeReader::read("(SCOPE (STRUCT (ID S) (CONTENT (BREAK))))").unwrap();
        let mut types = TypeRegistry::with_primitives();
        let mut vars = SymbolTable::new();
        let err = check(&tree, tree.root(), &mut types, &mut vars).unwrap_err();
        assert!(matches!(err, SemaError::UnexpectedNode { kind: NodeKind::Break, .. }));
    }
}
