//! Global type registry.
//!
//! Lowers every decoded namespace into one arena of [`TypeNode`]s, indexes
//! each defined type by its fully-qualified path, and resolves symbolic
//! references with nested-type scoping. The registry is immutable once
//! built and shared by reference across worker threads.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::{GenError, Result};
use crate::exceptions;
use crate::layout::SizeInfo;
use crate::metadata::{self, Literal, NativeType, TypeBody, TypeRef};
use crate::types::{
    ComDef, Composite, EnumDef, EnumValue, Field, Kind, Method, NodeId, Param, Scope, Signature,
    SymbolRef, TypeNode,
};

// ---------------------------------------------------------------------------
// Per-namespace declarations
// ---------------------------------------------------------------------------

/// A namespace's top-level declarations, pointing into the registry arena.
#[derive(Debug)]
pub struct Namespace {
    pub name: String,
    pub constants: Vec<ConstantDecl>,
    /// Top-level type definitions, in declaration order.
    pub types: Vec<NodeId>,
    pub functions: Vec<FunctionDecl>,
    pub unicode_aliases: Vec<String>,
}

#[derive(Debug)]
pub struct ConstantDecl {
    pub name: String,
    pub ty: NodeId,
    pub value_type: Option<NativeType>,
    pub value: Literal,
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub name: String,
    /// Import library as declared (`KERNEL32`).
    pub library: String,
    pub signature: Signature,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TypeRegistry {
    nodes: Vec<TypeNode>,
    by_path: HashMap<String, NodeId>,
}

impl TypeRegistry {
    /// Lower and index every namespace. Fails on the first duplicate path.
    pub fn build(apis: Vec<metadata::Api>) -> Result<(Self, Vec<Namespace>)> {
        let mut lowering = Lowering::default();
        let namespaces = apis
            .into_iter()
            .map(|api| lowering.namespace(api))
            .collect::<Result<Vec<_>>>()?;

        let registry = TypeRegistry {
            nodes: lowering.nodes,
            by_path: lowering.by_path,
        };
        info!(
            namespaces = namespaces.len(),
            nodes = registry.nodes.len(),
            defined = registry.by_path.len(),
            "built type registry"
        );
        Ok((registry, namespaces))
    }

    pub fn node(&self, id: NodeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    /// Defined type at a fully-qualified path.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    /// Iterate every defined type with its path.
    pub fn defined(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.by_path.iter().map(|(path, id)| (path.as_str(), *id))
    }

    /// Two-tier lookup: the enclosing definition's scope first, then the
    /// namespace-level path.
    pub fn resolve_symbol(&self, symbol: &SymbolRef, context: Option<NodeId>) -> Option<NodeId> {
        if let Some(ctx_path) = context.and_then(|c| self.node(c).path()) {
            let scoped = format!("{ctx_path}.{}", symbol.name);
            if let Some(id) = self.lookup(&scoped) {
                return Some(id);
            }
        }
        self.lookup(&symbol.global_path())
    }

    /// Resolve a reference node. `None` for a miss or a non-reference node.
    pub fn resolve(&self, reference: NodeId) -> Option<NodeId> {
        let node = self.node(reference);
        match &node.kind {
            Kind::Reference(symbol) => self.resolve_symbol(symbol, node.context),
            _ => None,
        }
    }

    /// Where a node occurs, for error messages.
    pub fn site(&self, id: NodeId) -> String {
        let node = self.node(id);
        if let Some(path) = node.path() {
            return format!("`{path}`");
        }
        match node.context.and_then(|c| self.node(c).path()) {
            Some(path) => format!("`{path}`"),
            None => "namespace scope".to_string(),
        }
    }

    /// Display name of a node: its path when defined, its name otherwise.
    pub fn display_name(&self, id: NodeId) -> String {
        let node = self.node(id);
        node.path().unwrap_or_else(|| node.name.clone())
    }

    pub(crate) fn unresolved(&self, id: NodeId) -> GenError {
        let node = self.node(id);
        let api = match &node.kind {
            Kind::Reference(symbol) => symbol.api.clone(),
            _ => String::new(),
        };
        GenError::Unresolved {
            name: node.name.clone(),
            api,
            context: self.site(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Lowering metadata trees into the arena
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Lowering {
    nodes: Vec<TypeNode>,
    by_path: HashMap<String, NodeId>,
}

impl Lowering {
    fn push(&mut self, node: TypeNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn namespace(&mut self, api: metadata::Api) -> Result<Namespace> {
        let name = api.name;
        let types = api
            .types
            .into_iter()
            .map(|decl| self.define(decl, &name, &[], None))
            .collect::<Result<Vec<_>>>()?;

        let constants = api
            .constants
            .into_iter()
            .map(|c| ConstantDecl {
                name: c.name,
                ty: self.reference(c.ty, None),
                value_type: c.value_type.as_deref().and_then(NativeType::from_name),
                value: c.value,
            })
            .collect();

        let functions = api
            .functions
            .into_iter()
            .map(|f| FunctionDecl {
                name: f.name,
                library: f.dll_import.unwrap_or_default(),
                signature: self.signature(f.set_last_error, f.return_type, f.params, None),
            })
            .collect();

        debug!(namespace = %name, types = types.len(), "indexed namespace");
        Ok(Namespace {
            name,
            constants,
            types,
            functions,
            unicode_aliases: api.unicode_aliases,
        })
    }

    fn define(
        &mut self,
        decl: metadata::TypeDecl,
        namespace: &str,
        parents: &[String],
        enclosing: Option<NodeId>,
    ) -> Result<NodeId> {
        let mut chain = parents.to_vec();
        chain.push(decl.name.clone());
        let scope = Scope {
            namespace: namespace.to_string(),
            chain: chain.clone(),
        };
        let path = scope.path();
        if self.by_path.contains_key(&path) {
            return Err(GenError::DuplicatePath { path });
        }

        // Reserve the slot first so nested types and references can point
        // back at it.
        let id = self.push(TypeNode {
            name: decl.name,
            kind: Kind::Unsupported,
            scope: Some(scope),
            context: enclosing,
            nested: Vec::new(),
        });
        self.by_path.insert(path, id);

        let nested = decl
            .nested_types
            .into_iter()
            .map(|n| self.define(n, namespace, &chain, Some(id)))
            .collect::<Result<Vec<_>>>()?;
        let kind = self.body(decl.body, id);

        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.nested = nested;
        Ok(id)
    }

    fn body(&mut self, body: TypeBody, owner: NodeId) -> Kind {
        let ctx = Some(owner);
        match body {
            TypeBody::NativeTypedef { def } => Kind::Alias(self.reference(def, ctx)),
            TypeBody::Enum {
                flags,
                integer_base,
                values,
            } => Kind::Enum(EnumDef {
                flags,
                base: integer_base.unwrap_or(NativeType::Int32),
                values: values
                    .into_iter()
                    .map(|v| EnumValue {
                        name: v.name,
                        value: v.value,
                    })
                    .collect(),
            }),
            TypeBody::Struct {
                packing_size,
                fields,
            } => Kind::Struct(self.composite(packing_size, fields, owner)),
            TypeBody::Union {
                packing_size,
                fields,
            } => Kind::Union(self.composite(packing_size, fields, owner)),
            TypeBody::Com {
                guid,
                interface,
                methods,
            } => Kind::ComInterface(ComDef {
                guid,
                base: interface.map(|i| self.reference(i, ctx)),
                methods: methods
                    .into_iter()
                    .map(|m| Method {
                        name: m.name,
                        signature: self.signature(m.set_last_error, m.return_type, m.params, ctx),
                    })
                    .collect(),
            }),
            TypeBody::ComClassId { guid } => Kind::ComClassId(guid),
            TypeBody::FunctionPointer {
                set_last_error,
                return_type,
                params,
            } => Kind::FunctionPointer(self.signature(set_last_error, return_type, params, ctx)),
            TypeBody::Unsupported => Kind::Unsupported,
        }
    }

    fn composite(
        &mut self,
        packing: Option<usize>,
        fields: Vec<metadata::FieldDecl>,
        owner: NodeId,
    ) -> Composite {
        Composite {
            fields: fields
                .into_iter()
                .map(|f| Field {
                    name: f.name,
                    ty: self.reference(f.ty, Some(owner)),
                })
                .collect(),
            packing: packing.filter(|&p| p > 0),
        }
    }

    fn signature(
        &mut self,
        set_last_error: bool,
        return_type: Option<TypeRef>,
        params: Vec<metadata::ParamDecl>,
        context: Option<NodeId>,
    ) -> Signature {
        let return_type = return_type
            .filter(|r| {
                !matches!(
                    r,
                    TypeRef::Native {
                        name: NativeType::Void
                    }
                )
            })
            .map(|r| self.reference(r, context));
        Signature {
            params: params
                .into_iter()
                .enumerate()
                .map(|(i, p)| Param {
                    name: if p.name.is_empty() {
                        format!("param{i}")
                    } else {
                        p.name
                    },
                    ty: self.reference(p.ty, context),
                })
                .collect(),
            return_type,
            set_last_error,
        }
    }

    /// Lower a type in reference position into a fresh node.
    fn reference(&mut self, ty: TypeRef, context: Option<NodeId>) -> NodeId {
        let (name, kind) = match ty {
            TypeRef::Native {
                name: NativeType::Void,
            } => ("Void".to_string(), Kind::Void),
            TypeRef::Native { name } => (format!("{name:?}"), Kind::Native(name)),
            TypeRef::PointerTo { child } => {
                let target = self.reference(*child, context);
                (String::new(), Kind::Pointer(target))
            }
            TypeRef::Array { shape, child } => {
                let element = self.reference(*child, context);
                let count = shape.map_or(0, |s| s.size);
                (String::new(), Kind::Array { element, count })
            }
            TypeRef::ApiRef {
                name,
                target_kind,
                api,
                parents,
            } => (
                name.clone(),
                Kind::Reference(SymbolRef {
                    name,
                    api,
                    parents,
                    target_kind,
                }),
            ),
            TypeRef::Unsupported => ("unknown".to_string(), Kind::Unsupported),
        };
        self.push(TypeNode {
            name,
            kind,
            scope: None,
            context,
            nested: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Memoizing resolver
// ---------------------------------------------------------------------------

/// What a type ultimately denotes once references and aliases are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underlying {
    /// A non-reference, non-alias node.
    Node(NodeId),
    /// Listed pointer-like handle (`HKL`).
    Word,
    /// Listed opaque platform type.
    Opaque(SizeInfo),
}

/// Follows reference and alias chains, caching per node.
///
/// Single-threaded by construction; one per namespace worker.
pub struct Resolver<'r> {
    registry: &'r TypeRegistry,
    cache: RefCell<HashMap<NodeId, Underlying>>,
    in_progress: RefCell<HashSet<NodeId>>,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    pub fn underlying(&self, id: NodeId) -> Result<Underlying> {
        if let Some(hit) = self.cache.borrow().get(&id) {
            return Ok(*hit);
        }
        if !self.in_progress.borrow_mut().insert(id) {
            return Err(GenError::Cycle {
                action: "resolving",
                name: self.registry.display_name(id),
            });
        }
        let result = self.follow(id);
        self.in_progress.borrow_mut().remove(&id);

        let target = result?;
        self.cache.borrow_mut().insert(id, target);
        Ok(target)
    }

    fn follow(&self, id: NodeId) -> Result<Underlying> {
        let registry = self.registry;
        match &registry.node(id).kind {
            Kind::Reference(symbol) => {
                if exceptions::is_pointer_like_word(&symbol.name) {
                    return Ok(Underlying::Word);
                }
                match registry.resolve(id) {
                    Some(target) => self.underlying(target),
                    None => exceptions::opaque_layout(&symbol.name)
                        .map(Underlying::Opaque)
                        .ok_or_else(|| registry.unresolved(id)),
                }
            }
            Kind::Alias(def) => self.underlying(*def),
            _ => Ok(Underlying::Node(id)),
        }
    }
}
