//! Type nodes: the closed, immutable representation every later stage
//! works on.
//!
//! Nodes live in one arena owned by the [`TypeRegistry`](crate::registry::TypeRegistry)
//! and link to each other by [`NodeId`]. Defined types carry a [`Scope`]
//! from which their fully-qualified path derives; references carry the
//! enclosing definition they occur in (`context`) so nested-type scoping can
//! be reproduced at resolution time.

use crate::metadata::{Literal, NativeType, TargetKind};

/// Index of a node in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a defined type lives: its namespace and the chain of enclosing
/// type names ending in its own local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub namespace: String,
    pub chain: Vec<String>,
}

impl Scope {
    /// Fully-qualified path: `namespace.Outer.Inner`.
    pub fn path(&self) -> String {
        let mut path = self.namespace.clone();
        for part in &self.chain {
            path.push('.');
            path.push_str(part);
        }
        path
    }

    /// Flattened emitted name: enclosing chain joined with `_`, each part
    /// cleaned of the corpus' synthetic decorations.
    pub fn flat_name(&self) -> String {
        self.chain
            .iter()
            .map(|part| clean_name(part))
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Strip the `_e__Struct` / `_e__Union` suffixes and leading underscores the
/// corpus gives anonymous nested types (`_Anonymous_e__Union` → `Anonymous`).
pub fn clean_name(name: &str) -> String {
    let name = name
        .strip_suffix("_e__Struct")
        .or_else(|| name.strip_suffix("_e__Union"))
        .unwrap_or(name);
    let trimmed = name.trim_start_matches('_');
    if trimmed.is_empty() {
        name.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub name: String,
    pub kind: Kind,
    /// Set for defined types only.
    pub scope: Option<Scope>,
    /// Innermost enclosing definition (for references and nested types).
    pub context: Option<NodeId>,
    /// Nested type declarations, in declaration order.
    pub nested: Vec<NodeId>,
}

impl TypeNode {
    pub fn path(&self) -> Option<String> {
        self.scope.as_ref().map(Scope::path)
    }
}

/// A symbolic reference to a type defined elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub name: String,
    pub api: String,
    pub parents: Vec<String>,
    pub target_kind: TargetKind,
}

impl SymbolRef {
    /// Namespace-level path: `api.parent1.parent2.name`.
    pub fn global_path(&self) -> String {
        let mut path = self.api.clone();
        for p in &self.parents {
            path.push('.');
            path.push_str(p);
        }
        path.push('.');
        path.push_str(&self.name);
        path
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: NodeId,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: NodeId,
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub params: Vec<Param>,
    /// `None` for `void`.
    pub return_type: Option<NodeId>,
    pub set_last_error: bool,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub value: Literal,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub flags: bool,
    pub base: NativeType,
    pub values: Vec<EnumValue>,
}

/// Struct or union body.
#[derive(Debug, Clone)]
pub struct Composite {
    pub fields: Vec<Field>,
    /// `#pragma pack(N)`; `None` for natural packing.
    pub packing: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
}

#[derive(Debug, Clone)]
pub struct ComDef {
    pub guid: Option<String>,
    /// Reference node naming the super interface.
    pub base: Option<NodeId>,
    pub methods: Vec<Method>,
}

/// The closed set of node kinds.
#[derive(Debug, Clone)]
pub enum Kind {
    Native(NativeType),
    Pointer(NodeId),
    Array { element: NodeId, count: usize },
    Reference(SymbolRef),
    Alias(NodeId),
    Enum(EnumDef),
    Struct(Composite),
    Union(Composite),
    FunctionPointer(Signature),
    ComInterface(ComDef),
    ComClassId(String),
    Void,
    /// Any kind tag outside the set above; fatal wherever it is reached.
    Unsupported,
}

impl Kind {
    pub fn describe(&self) -> &'static str {
        match self {
            Kind::Native(_) => "native scalar",
            Kind::Pointer(_) => "pointer",
            Kind::Array { .. } => "array",
            Kind::Reference(_) => "reference",
            Kind::Alias(_) => "alias",
            Kind::Enum(_) => "enum",
            Kind::Struct(_) => "struct",
            Kind::Union(_) => "union",
            Kind::FunctionPointer(_) => "function pointer",
            Kind::ComInterface(_) => "COM interface",
            Kind::ComClassId(_) => "COM class id",
            Kind::Void => "void",
            Kind::Unsupported => "unknown kind",
        }
    }
}
