//! Syntax tree consumed by the semantic passes
//!
//! The tree is produced by an external parser. Nodes live in an arena owned by
//! [`Tree`]; children are owned top-down and the parent link is a plain
//! [`NodeId`] used only for upward scope search.
//!
//! The `reader` submodule reads the textual tree dump the driver consumes.

mod reader;
mod token;

use std::fmt;
use std::str::FromStr;

use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::common::{SemaError, SemaResult};

pub use reader::TreeReader;
pub use token::{Token, TokenKind};

/// Closed set of node tags emitted by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Id,
    Function,
    Struct,
    Variable,
    VariableArray,
    FuncCall,
    ArrayElement,
    ArrayAlloc,
    Assign,
    ChainCall,
    Scope,
    Content,
    FuncArgs,
    Type,
    DataType,
    Return,
    Break,
    Skip,
    While,
    DoWhile,
    Const,
}

impl NodeKind {
    pub const ALL: [NodeKind; 21] = [
        NodeKind::Id,
        NodeKind::Function,
        NodeKind::Struct,
        NodeKind::Variable,
        NodeKind::VariableArray,
        NodeKind::FuncCall,
        NodeKind::ArrayElement,
        NodeKind::ArrayAlloc,
        NodeKind::Assign,
        NodeKind::ChainCall,
        NodeKind::Scope,
        NodeKind::Content,
        NodeKind::FuncArgs,
        NodeKind::Type,
        NodeKind::DataType,
        NodeKind::Return,
        NodeKind::Break,
        NodeKind::Skip,
        NodeKind::While,
        NodeKind::DoWhile,
        NodeKind::Const,
    ];

    /// Tag name as written by the parser
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Id => "ID",
            NodeKind::Function => "FUNCTION",
            NodeKind::Struct => "STRUCT",
            NodeKind::Variable => "VARIABLE",
            NodeKind::VariableArray => "VARIABLE_ARRAY",
            NodeKind::FuncCall => "FUNC_CALL",
            NodeKind::ArrayElement => "ARRAY_ELEMENT",
            NodeKind::ArrayAlloc => "ARRAY_ALLOC",
            NodeKind::Assign => "ASSIGN",
            NodeKind::ChainCall => "CHAIN_CALL",
            NodeKind::Scope => "SCOPE",
            NodeKind::Content => "CONTENT",
            NodeKind::FuncArgs => "FUNC_ARGS",
            NodeKind::Type => "TYPE",
            NodeKind::DataType => "DATATYPE",
            NodeKind::Return => "RETURN",
            NodeKind::Break => "BREAK",
            NodeKind::Skip => "SKIP",
            NodeKind::While => "WHILE",
            NodeKind::DoWhile => "DO_WHILE",
            NodeKind::Const => "CONST",
        }
    }

    /// SCOPE and CONTENT bound the visibility of declarations
    pub fn is_scope(self) -> bool {
        matches!(self, NodeKind::Scope | NodeKind::Content)
    }

    /// Nodes that introduce a name into the enclosing scope
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Variable | NodeKind::VariableArray | NodeKind::Struct | NodeKind::Function
        )
    }

    /// TYPE and DATATYPE name a declared type
    pub fn is_type(self) -> bool {
        matches!(self, NodeKind::Type | NodeKind::DataType)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Index of a node inside its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A tagged tree element
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub value: Option<DefaultSymbol>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub line: u32,
}

/// Parent-linked syntax tree with interned payloads
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    names: DefaultStringInterner,
}

impl Tree {
    /// Create a tree holding only its root
    pub fn new(root: NodeKind, line: u32) -> Self {
        Self {
            nodes: vec![Node {
                kind: root,
                value: None,
                children: Vec::new(),
                parent: None,
                line,
            }],
            names: DefaultStringInterner::default(),
        }
    }

    /// Append a node as the last child of `parent`
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, value: Option<&str>, line: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let value = value.map(|v| self.names.get_or_intern(v));
        self.nodes.push(Node {
            kind,
            value,
            children: Vec::new(),
            parent: Some(parent),
            line,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        let sym = self.names.get_or_intern(value);
        self.nodes[id.index()].value = Some(sym);
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn line(&self, id: NodeId) -> u32 {
        self.node(id).line
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Literal payload of a node, if any
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.node(id).value.and_then(|sym| self.names.resolve(sym))
    }

    /// Depth-first, left-to-right walk of the subtree rooted at `from`
    pub fn preorder(&self, from: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![from],
        }
    }

    /// First direct child of the given kind
    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.kind(child) == kind)
    }

    /// First direct child of the given kind, or a malformed-node error
    pub fn expect_child(&self, id: NodeId, kind: NodeKind) -> SemaResult<NodeId> {
        self.child_of_kind(id, kind).ok_or_else(|| {
            SemaError::malformed(self.kind(id), self.line(id), format!("missing {kind} child"))
        })
    }

    /// Identifier introduced or referenced by a node
    ///
    /// `ID` nodes carry the name themselves; declarations, calls and array
    /// element accesses carry it in their first `ID` child.
    pub fn declared_name(&self, id: NodeId) -> SemaResult<&str> {
        let name_node = match self.kind(id) {
            NodeKind::Id => id,
            NodeKind::Variable
            | NodeKind::VariableArray
            | NodeKind::Function
            | NodeKind::Struct
            | NodeKind::FuncCall
            | NodeKind::ArrayElement => self.expect_child(id, NodeKind::Id)?,
            kind => return Err(SemaError::unexpected(kind, self.line(id), "resolving a name")),
        };
        self.value(name_node).ok_or_else(|| {
            SemaError::malformed(NodeKind::Id, self.line(name_node), "identifier without a name")
        })
    }

    /// Type name written in a node's first TYPE or DATATYPE child
    pub fn declared_type(&self, id: NodeId) -> SemaResult<&str> {
        let ty = self
            .children(id)
            .iter()
            .copied()
            .find(|&child| self.kind(child).is_type())
            .ok_or_else(|| {
                SemaError::malformed(self.kind(id), self.line(id), "missing TYPE child")
            })?;
        self.value(ty).ok_or_else(|| {
            SemaError::malformed(self.kind(ty), self.line(ty), "type without a name")
        })
    }
}

/// Iterator returned by [`Tree::preorder`]
pub struct Preorder<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev());
        Some(id)
    }
}
