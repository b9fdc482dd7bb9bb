//! Type registry: type names and struct field layouts

use std::collections::HashMap;
use std::rc::Rc;

use super::scope::DeclKind;

/// Names seeded before analysis, each with an implicit `T[]` form
pub const PRIMITIVES: [&str; 5] = ["int", "string", "float", "boolean", "null"];

/// Pseudo-type accepted only as a function return type
pub const VOID: &str = "void";

/// A struct field: how it was declared and its type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: DeclKind,
    pub ty: String,
}

impl Field {
    pub fn new(kind: DeclKind, ty: impl Into<String>) -> Self {
        Self { kind, ty: ty.into() }
    }
}

/// Field name to field, for one struct type
pub type FieldLayout = HashMap<String, Field>;

/// A registered type
#[derive(Debug, Clone)]
pub struct TypeEntry {
    /// What the name is bound to, for "already defined as" messages
    pub recorded: String,
    /// `T` and `T[]` of a struct share one layout; primitives have none
    pub fields: Rc<FieldLayout>,
}

/// Mapping from type name to field layout
///
/// Entries are only ever added. A second definition of a name is reported by
/// the checker and never reaches the registry.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the primitive set
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry.register_primitive_set();
        registry
    }

    pub fn register_primitive_set(&mut self) {
        let empty = Rc::new(FieldLayout::new());
        for name in PRIMITIVES {
            for ty in [name.to_string(), array_of(name)] {
                self.types.insert(
                    ty.clone(),
                    TypeEntry {
                        recorded: ty,
                        fields: Rc::clone(&empty),
                    },
                );
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Add `name` and `name[]`; the caller has checked that `name` is free
    pub fn register_struct(&mut self, name: &str, layout: FieldLayout) {
        let fields = Rc::new(layout);
        for ty in [name.to_string(), array_of(name)] {
            self.types.insert(
                ty,
                TypeEntry {
                    recorded: "struct".to_string(),
                    fields: Rc::clone(&fields),
                },
            );
        }
    }

    pub fn field_layout(&self, name: &str) -> Option<&FieldLayout> {
        self.types.get(name).map(|entry| entry.fields.as_ref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// `T` -> `T[]`
pub fn array_of(name: &str) -> String {
    format!("{name}[]")
}

/// `T[]` -> `T`; other names are returned unchanged
pub fn element_of(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}
