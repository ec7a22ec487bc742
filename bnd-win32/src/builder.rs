//! Resolved metadata → [`BindingModel`], one namespace at a time.
//!
//! Every declaration lands in exactly one model bucket. Structs are
//! flattened, unions get a storage representation, constants get their
//! final encoding, COM interfaces get their full dispatch table, and every
//! parameter gets its marshal class. Whatever the emitter needs is decided
//! here.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{GenError, Result};
use crate::exceptions;
use crate::layout::{LayoutEngine, SizeInfo};
use crate::metadata::{Literal, NativeType};
use crate::model::{
    Accessor, AliasKind, Binding, BindingModel, ComInterface, ComMethod, Constant, ConstantValue,
    DispatchSlot, Enum, EnumMember, Field, Function, MarshalClass, Param, Return, Scalar,
    ShortAlias, Struct, StructKind, TypeAlias, TypeExpr,
};
use crate::registry::{ConstantDecl, FunctionDecl, Namespace, Resolver, TypeRegistry, Underlying};
use crate::types::{ComDef, Composite, EnumDef, Kind, NodeId, Signature};

/// The only interface allowed to declare no super interface.
pub const ROOT_INTERFACE: &str = "IUnknown";

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub pointer_width: usize,
    pub check_duplicate_names: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            pointer_width: 8,
            check_duplicate_names: true,
        }
    }
}

pub struct BindingModelBuilder<'r> {
    registry: &'r TypeRegistry,
    resolver: Resolver<'r>,
    layout: LayoutEngine<'r>,
    options: BuildOptions,
}

impl<'r> BindingModelBuilder<'r> {
    pub fn new(registry: &'r TypeRegistry, options: BuildOptions) -> Self {
        Self {
            registry,
            resolver: Resolver::new(registry),
            layout: LayoutEngine::new(registry, options.pointer_width),
            options,
        }
    }

    pub fn build(&self, namespace: &Namespace) -> Result<BindingModel> {
        let mut model = BindingModel::new(&namespace.name, self.options.pointer_width);

        for decl in &namespace.constants {
            if let Some(constant) = self.constant(decl)? {
                model.constants.push(constant);
            }
        }
        for &id in &namespace.types {
            self.declaration(id, &mut model)?;
        }
        for decl in &namespace.functions {
            model.functions.push(self.free_function(decl)?);
        }
        self.short_aliases(namespace, &mut model);

        if self.options.check_duplicate_names {
            model.check_duplicate_names()?;
        }
        debug!(
            namespace = %model.namespace,
            constants = model.constants.len(),
            structs = model.structs.len(),
            functions = model.functions.len(),
            interfaces = model.interfaces.len(),
            "built binding model"
        );
        Ok(model)
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    fn declaration(&self, id: NodeId, model: &mut BindingModel) -> Result<()> {
        let node = self.registry.node(id);
        match &node.kind {
            Kind::Alias(def) => model.type_aliases.push(TypeAlias {
                name: self.defined_name(id)?,
                target: self.type_expr(*def)?,
            }),
            Kind::Enum(e) => model.enums.push(self.enumeration(id, e)?),
            Kind::Struct(_) | Kind::Union(_) => self.flatten(id, &mut model.structs)?,
            Kind::ComInterface(com) => model.interfaces.push(self.interface(id, com)?),
            Kind::ComClassId(_) => {
                trace!(name = %node.name, "class id declarations emit nothing");
            }
            Kind::FunctionPointer(sig) => model
                .function_pointers
                .push(self.function(&self.defined_name(id)?, sig, None)?),
            Kind::Native(_)
            | Kind::Pointer(_)
            | Kind::Array { .. }
            | Kind::Reference(_)
            | Kind::Void
            | Kind::Unsupported => {
                return Err(GenError::UnsupportedKind {
                    kind: node.kind.describe().to_string(),
                    context: format!("declaration {}", self.registry.site(id)),
                });
            }
        }
        Ok(())
    }

    fn defined_name(&self, id: NodeId) -> Result<String> {
        self.registry
            .node(id)
            .scope
            .as_ref()
            .map(|s| s.flat_name())
            .ok_or_else(|| GenError::UnsupportedKind {
                kind: "anonymous type".to_string(),
                context: self.registry.site(id),
            })
    }

    fn enumeration(&self, id: NodeId, e: &EnumDef) -> Result<Enum> {
        let name = self.defined_name(id)?;
        let base = integer_scalar(e.base).ok_or_else(|| GenError::UnsupportedKind {
            kind: format!("enum base `{:?}`", e.base),
            context: format!("enum `{name}`"),
        })?;
        let width = self.native_width(e.base, &name)?;
        let members = e
            .values
            .iter()
            .map(|v| {
                Ok(EnumMember {
                    name: v.name.clone(),
                    value: integer_literal(&v.name, &v.value, e.base.is_unsigned(), width)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Enum {
            name,
            base,
            flags: e.flags,
            members,
        })
    }

    fn native_width(&self, ty: NativeType, owner: &str) -> Result<usize> {
        crate::layout::native_layout(ty, self.options.pointer_width)
            .map(|info| info.size * 8)
            .ok_or_else(|| GenError::Layout {
                name: owner.to_string(),
                reason: format!("native `{ty:?}` has no size"),
            })
    }

    // -----------------------------------------------------------------------
    // Structs and unions
    // -----------------------------------------------------------------------

    /// Emit nested declarations first, then the struct itself.
    fn flatten(&self, id: NodeId, out: &mut Vec<Struct>) -> Result<()> {
        let node = self.registry.node(id);
        for &nested in &node.nested {
            match &self.registry.node(nested).kind {
                Kind::Struct(_) | Kind::Union(_) => self.flatten(nested, out)?,
                other => {
                    return Err(GenError::UnsupportedKind {
                        kind: other.describe().to_string(),
                        context: format!("nested declaration {}", self.registry.site(nested)),
                    });
                }
            }
        }

        let name = self.defined_name(id)?;
        let info = self.layout.size_of(id)?;
        let built = match &node.kind {
            Kind::Struct(c) => self.structure(name, info, c)?,
            Kind::Union(c) => self.union(name, info, c)?,
            other => {
                return Err(GenError::UnsupportedKind {
                    kind: other.describe().to_string(),
                    context: format!("struct flattening of {}", self.registry.site(id)),
                });
            }
        };
        trace!(name = %built.name, size = info.size, align = info.align, "flattened");
        out.push(built);
        Ok(())
    }

    fn structure(&self, name: String, info: SizeInfo, c: &Composite) -> Result<Struct> {
        let mut embedded_taken = false;
        let mut fields = Vec::with_capacity(c.fields.len());
        for field in &c.fields {
            let embedded = !embedded_taken
                && info.size > 0
                && field.name.starts_with("Anonymous")
                && self.layout.size_of(field.ty)?.size == info.size;
            embedded_taken |= embedded;
            fields.push(Field {
                name: field.name.clone(),
                ty: self.type_expr(field.ty)?,
                embedded,
            });
        }
        Ok(Struct {
            name,
            kind: StructKind::Struct,
            layout: info,
            packing: c.packing,
            align_override: None,
            fields,
            accessors: Vec::new(),
        })
    }

    fn union(&self, name: String, info: SizeInfo, c: &Composite) -> Result<Struct> {
        let mut representative = None;
        for (i, field) in c.fields.iter().enumerate() {
            let member = self.layout.size_of(field.ty)?;
            if representative.is_none() && info.size > 0 && member.size == info.size {
                representative = Some((i, member));
            }
        }

        let mut packing = c.packing;
        let (fields, align_override) = match representative {
            Some((i, member)) => {
                let field = &c.fields[i];
                let align_override = (member.align < info.align).then_some(info.align);
                if align_override.is_some() {
                    // repr(packed) and repr(align) cannot be combined.
                    packing = None;
                }
                let embedded = Field {
                    name: field.name.clone(),
                    ty: self.type_expr(field.ty)?,
                    embedded: true,
                };
                (vec![embedded], align_override)
            }
            None => {
                let element = storage_scalar(info.align).ok_or_else(|| GenError::Layout {
                    name: name.clone(),
                    reason: format!("no storage element for alignment {}", info.align),
                })?;
                let storage = Field {
                    name: "Data".to_string(),
                    ty: TypeExpr::Array(Box::new(TypeExpr::Scalar(element)), info.size / info.align),
                    embedded: false,
                };
                (vec![storage], None)
            }
        };

        let accessors = c
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| representative.is_none_or(|(r, _)| r != *i))
            .map(|(_, f)| {
                Ok(Accessor {
                    name: f.name.clone(),
                    ty: self.type_expr(f.ty)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Struct {
            name,
            kind: StructKind::Union,
            layout: info,
            packing,
            align_override,
            fields,
            accessors,
        })
    }

    // -----------------------------------------------------------------------
    // COM
    // -----------------------------------------------------------------------

    fn interface(&self, id: NodeId, com: &ComDef) -> Result<ComInterface> {
        let name = self.defined_name(id)?;
        let chain = self.interface_chain(id)?;

        let mut slots = Vec::new();
        for &iface in &chain {
            if let Kind::ComInterface(def) = &self.registry.node(iface).kind {
                let owner = self.defined_name(iface)?;
                slots.extend(def.methods.iter().map(|m| DispatchSlot {
                    interface: owner.clone(),
                    method: m.name.clone(),
                }));
            }
        }
        let inherited = slots.len() - com.methods.len();

        let methods = com
            .methods
            .iter()
            .enumerate()
            .map(|(i, m)| {
                Ok(ComMethod {
                    function: self.function(&m.name, &m.signature, None)?,
                    slot: inherited + i,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let base = match chain.len() {
            0 | 1 => None,
            n => Some(self.declared(chain[n - 2])?),
        };
        let iid = com
            .guid
            .as_deref()
            .map(|g| parse_guid(&name, g))
            .transpose()?;

        Ok(ComInterface {
            name,
            iid,
            base,
            methods,
            slots,
        })
    }

    /// Root-first inheritance chain ending in `id`.
    fn interface_chain(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = id;
        loop {
            let node = self.registry.node(current);
            if !seen.insert(current) {
                return Err(GenError::Cycle {
                    action: "walking the inheritance of",
                    name: self.registry.display_name(id),
                });
            }
            let Kind::ComInterface(def) = &node.kind else {
                return Err(GenError::MalformedComRoot {
                    name: self.registry.display_name(id),
                    reason: format!("super `{}` is a {}", node.name, node.kind.describe()),
                });
            };
            chain.push(current);
            match def.base {
                Some(base) => current = self.super_interface(current, base)?,
                None if node.name == ROOT_INTERFACE => break,
                None => {
                    return Err(GenError::MalformedComRoot {
                        name: self.registry.display_name(current),
                        reason: format!("declares no super interface; only `{ROOT_INTERFACE}` may"),
                    });
                }
            }
        }
        chain.reverse();
        Ok(chain)
    }

    fn super_interface(&self, owner: NodeId, base: NodeId) -> Result<NodeId> {
        match self.resolver.underlying(base)? {
            Underlying::Node(target) => Ok(target),
            Underlying::Word | Underlying::Opaque(_) => Err(GenError::MalformedComRoot {
                name: self.registry.display_name(owner),
                reason: format!("super `{}` is not an interface", self.registry.node(base).name),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Functions
    // -----------------------------------------------------------------------

    fn free_function(&self, decl: &FunctionDecl) -> Result<Function> {
        let library = import_library(&decl.library);
        self.function(&decl.name, &decl.signature, Some(library))
    }

    fn function(&self, name: &str, sig: &Signature, library: Option<String>) -> Result<Function> {
        let params = sig
            .params
            .iter()
            .map(|p| {
                Ok(Param {
                    name: p.name.clone(),
                    ty: self.type_expr(p.ty)?,
                    class: self.marshal_class(p.ty)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let ret = sig
            .return_type
            .map(|r| {
                Ok(Return {
                    ty: self.type_expr(r)?,
                    class: self.marshal_class(r)?,
                })
            })
            .transpose()?;
        Ok(Function {
            name: name.to_string(),
            params,
            ret,
            set_last_error: sig.set_last_error,
            library,
        })
    }

    /// How a value of this type crosses the call boundary.
    fn marshal_class(&self, id: NodeId) -> Result<MarshalClass> {
        if let Kind::Reference(symbol) = &self.registry.node(id).kind
            && let Some(scalar) = exceptions::scalar_substitute(&symbol.name)
        {
            return Ok(scalar_class(scalar));
        }
        if let Kind::Reference(symbol) = &self.registry.node(id).kind
            && exceptions::is_pointer_like_word(&symbol.name)
        {
            return Ok(MarshalClass::RawWord);
        }
        let target = match self.resolver.underlying(id)? {
            Underlying::Word => return Ok(MarshalClass::RawWord),
            Underlying::Opaque(info) => return Ok(self.aggregate_class(info)),
            Underlying::Node(target) => target,
        };
        let node = self.registry.node(target);
        let class = match &node.kind {
            Kind::Native(NativeType::Single | NativeType::Double) => MarshalClass::Float,
            Kind::Native(NativeType::IntPtr | NativeType::UIntPtr) => MarshalClass::RawWord,
            Kind::Native(NativeType::String) => MarshalClass::Pointer,
            Kind::Native(NativeType::Guid) => self.aggregate_class(self.layout.size_of(target)?),
            Kind::Native(NativeType::Void | NativeType::Unsupported) | Kind::Void => {
                return Err(GenError::UnsupportedKind {
                    kind: "void value".to_string(),
                    context: self.registry.site(id),
                });
            }
            Kind::Native(native) => match native_expr(*native) {
                Some(TypeExpr::Scalar(scalar)) => scalar_class(scalar),
                _ => {
                    return Err(GenError::UnsupportedKind {
                        kind: format!("native `{native:?}`"),
                        context: format!("parameter or return in {}", self.registry.site(id)),
                    });
                }
            },
            Kind::Pointer(_) | Kind::ComInterface(_) => MarshalClass::Pointer,
            Kind::Array { .. } => MarshalClass::ByAddress,
            Kind::Enum(e) => MarshalClass::Extend {
                scalar: integer_scalar(e.base).ok_or_else(|| GenError::UnsupportedKind {
                    kind: format!("enum base `{:?}`", e.base),
                    context: self.registry.site(id),
                })?,
                wrapped: true,
            },
            Kind::Struct(_) | Kind::Union(_) => self.aggregate_class(self.layout.size_of(target)?),
            Kind::FunctionPointer(_) => MarshalClass::RawWord,
            Kind::Reference(_) | Kind::Alias(_) | Kind::ComClassId(_) | Kind::Unsupported => {
                return Err(GenError::UnsupportedKind {
                    kind: node.kind.describe().to_string(),
                    context: format!("parameter or return in {}", self.registry.site(id)),
                });
            }
        };
        Ok(class)
    }

    fn aggregate_class(&self, info: SizeInfo) -> MarshalClass {
        if info.size > self.options.pointer_width {
            MarshalClass::ByAddress
        } else {
            MarshalClass::ByValue
        }
    }

    // -----------------------------------------------------------------------
    // Type expressions
    // -----------------------------------------------------------------------

    fn type_expr(&self, id: NodeId) -> Result<TypeExpr> {
        let node = self.registry.node(id);
        match &node.kind {
            Kind::Native(ty) => native_expr(*ty).ok_or_else(|| GenError::UnsupportedKind {
                kind: format!("native `{ty:?}`"),
                context: self.registry.site(id),
            }),
            Kind::Void => Ok(TypeExpr::Void),
            Kind::Pointer(target) => Ok(TypeExpr::Pointer(Box::new(self.type_expr(*target)?))),
            Kind::Array { element, count } => Ok(TypeExpr::Array(
                Box::new(self.type_expr(*element)?),
                (*count).max(1),
            )),
            Kind::Reference(symbol) => {
                if let Some(scalar) = exceptions::scalar_substitute(&symbol.name) {
                    return Ok(TypeExpr::Scalar(scalar));
                }
                if exceptions::is_pointer_like_word(&symbol.name) {
                    return Ok(TypeExpr::Scalar(Scalar::USize));
                }
                match self.registry.resolve(id) {
                    Some(target) => self.named(target),
                    None => match exceptions::opaque_layout(&symbol.name) {
                        Some(info) => opaque_storage(info).ok_or_else(|| GenError::Layout {
                            name: symbol.name.clone(),
                            reason: format!("no storage element for alignment {}", info.align),
                        }),
                        None => Err(self.registry.unresolved(id)),
                    },
                }
            }
            Kind::Alias(_)
            | Kind::Enum(_)
            | Kind::Struct(_)
            | Kind::Union(_)
            | Kind::FunctionPointer(_)
            | Kind::ComInterface(_) => self.named(id),
            Kind::ComClassId(_) | Kind::Unsupported => Err(GenError::UnsupportedKind {
                kind: node.kind.describe().to_string(),
                context: self.registry.site(id),
            }),
        }
    }

    /// Name of a defined type in reference position; interfaces are always
    /// held by pointer.
    fn named(&self, id: NodeId) -> Result<TypeExpr> {
        let node = self.registry.node(id);
        match node.kind {
            Kind::ComInterface(_) => Ok(TypeExpr::Pointer(Box::new(self.declared(id)?))),
            Kind::ComClassId(_) | Kind::Unsupported => Err(GenError::UnsupportedKind {
                kind: node.kind.describe().to_string(),
                context: format!("named reference to {}", self.registry.site(id)),
            }),
            _ => self.declared(id),
        }
    }

    fn declared(&self, id: NodeId) -> Result<TypeExpr> {
        let scope = self.registry.node(id).scope.as_ref().ok_or_else(|| {
            GenError::UnsupportedKind {
                kind: "anonymous type".to_string(),
                context: self.registry.site(id),
            }
        })?;
        Ok(TypeExpr::named(&scope.namespace, &scope.flat_name()))
    }

    // -----------------------------------------------------------------------
    // Constants
    // -----------------------------------------------------------------------

    fn constant(&self, decl: &ConstantDecl) -> Result<Option<Constant>> {
        let node = self.registry.node(decl.ty);
        if let Kind::Reference(symbol) = &node.kind
            && exceptions::is_skipped_constant_type(&symbol.name)
        {
            trace!(name = %decl.name, ty = %symbol.name, "skipping constant with no representation");
            return Ok(None);
        }

        // Text constants are declared either as native strings or through a
        // string pointer alias (`PWSTR`) with a `String` value type. GUIDs
        // share that value type and parse below.
        let text_typed = matches!(node.kind, Kind::Native(NativeType::String))
            || decl.value_type == Some(NativeType::String);
        if text_typed && !self.is_guid(decl.ty)? {
            let Literal::Text(text) = &decl.value else {
                return Err(GenError::InvalidConstant {
                    name: decl.name.clone(),
                    reason: "string-typed constant without a string value".to_string(),
                });
            };
            return self.text_constant(decl, text).map(Some);
        }

        let ty = self.type_expr(decl.ty)?;
        let value = self.constant_value(&decl.name, decl.ty, &decl.value)?;
        let binding = if self.is_computed(decl.ty)? {
            Binding::Computed
        } else {
            Binding::Literal
        };
        Ok(Some(Constant {
            name: decl.name.clone(),
            ty,
            value,
            binding,
        }))
    }

    fn is_guid(&self, ty: NodeId) -> Result<bool> {
        Ok(match self.resolver.underlying(ty)? {
            Underlying::Node(target) => {
                matches!(self.registry.node(target).kind, Kind::Native(NativeType::Guid))
            }
            Underlying::Word | Underlying::Opaque(_) => false,
        })
    }

    /// Native strings stay `&str` literals; string pointers point at a
    /// NUL-terminated array in the pointer's character width.
    fn text_constant(&self, decl: &ConstantDecl, text: &str) -> Result<Constant> {
        let invalid = |reason: String| GenError::InvalidConstant {
            name: decl.name.clone(),
            reason,
        };
        let target = match self.resolver.underlying(decl.ty)? {
            Underlying::Node(target) => target,
            Underlying::Word | Underlying::Opaque(_) => {
                return Err(invalid("text value for a non-pointer type".to_string()));
            }
        };
        let pointee = match &self.registry.node(target).kind {
            Kind::Native(NativeType::String) => {
                return Ok(Constant {
                    name: decl.name.clone(),
                    ty: TypeExpr::Str,
                    value: ConstantValue::Text(text.to_string()),
                    binding: Binding::Literal,
                });
            }
            Kind::Pointer(pointee) => *pointee,
            other => return Err(invalid(format!("text value for a {}", other.describe()))),
        };
        let wide = match self.resolver.underlying(pointee)? {
            Underlying::Node(unit) => match self.registry.node(unit).kind {
                Kind::Native(NativeType::Char | NativeType::UInt16) => true,
                Kind::Native(NativeType::Byte | NativeType::SByte) => false,
                ref other => {
                    return Err(invalid(format!("text behind a pointer to {}", other.describe())));
                }
            },
            Underlying::Word | Underlying::Opaque(_) => {
                return Err(invalid("text behind a pointer to a non-character type".to_string()));
            }
        };
        let ty = self.type_expr(decl.ty)?;
        Ok(Constant {
            name: decl.name.clone(),
            ty: ty.clone(),
            value: ConstantValue::TextPointer {
                ty,
                text: text.to_string(),
                wide,
            },
            binding: Binding::Computed,
        })
    }

    fn constant_value(&self, owner: &str, ty: NodeId, literal: &Literal) -> Result<ConstantValue> {
        let invalid = |reason: &str| GenError::InvalidConstant {
            name: owner.to_string(),
            reason: reason.to_string(),
        };

        if let Kind::Reference(symbol) = &self.registry.node(ty).kind
            && let Some(scalar) = exceptions::scalar_substitute(&symbol.name)
        {
            let width = scalar_width(scalar).unwrap_or(64);
            return integer_literal(owner, literal, scalar_is_unsigned(scalar), width);
        }

        let target = match self.resolver.underlying(ty)? {
            Underlying::Word => {
                return integer_literal(owner, literal, true, self.options.pointer_width * 8);
            }
            Underlying::Opaque(_) => return Err(invalid("opaque type")),
            Underlying::Node(target) => target,
        };

        match &self.registry.node(target).kind {
            Kind::Native(NativeType::Guid) => match literal {
                Literal::Text(text) => Ok(ConstantValue::Guid(parse_guid(owner, text)?)),
                _ => Err(invalid("GUID constant without a string value")),
            },
            Kind::Native(NativeType::Single | NativeType::Double) => match literal {
                Literal::Float(v) => Ok(ConstantValue::Float(*v)),
                Literal::Unsigned(v) => Ok(ConstantValue::Float(*v as f64)),
                Literal::Signed(v) => Ok(ConstantValue::Float(*v as f64)),
                _ => Err(invalid("expected a number")),
            },
            Kind::Native(NativeType::Boolean) => literal
                .as_integer()
                .map(|v| ConstantValue::Bool(v != 0))
                .ok_or_else(|| invalid("expected an integer")),
            Kind::Native(_) => {
                let unsigned = self.is_unsigned(ty)?;
                let width = self.layout.size_of(ty)?.size * 8;
                integer_literal(owner, literal, unsigned, width)
            }
            Kind::Enum(e) => {
                let width = self.native_width(e.base, owner)?;
                let value = integer_literal(owner, literal, e.base.is_unsigned(), width)?;
                Ok(ConstantValue::Wrapped {
                    ty: self.type_expr(ty)?,
                    value: Box::new(value),
                })
            }
            Kind::Pointer(_) | Kind::ComInterface(_) => {
                let value = literal
                    .as_integer()
                    .ok_or_else(|| invalid("expected an integer address"))?;
                Ok(ConstantValue::Address {
                    ty: self.type_expr(ty)?,
                    value,
                })
            }
            Kind::Struct(c) => match literal {
                Literal::Structured(map) => Ok(ConstantValue::Fields {
                    ty: self.type_expr(ty)?,
                    fields: self.struct_fields(owner, c, map)?,
                }),
                _ => Err(invalid("struct-typed constant without a structured value")),
            },
            other => Err(invalid(&format!("{} has no literal form", other.describe()))),
        }
    }

    /// Map structured values onto the struct's fields by case-insensitive
    /// name, in field order.
    fn struct_fields(
        &self,
        owner: &str,
        c: &Composite,
        map: &Map<String, Value>,
    ) -> Result<Vec<(String, ConstantValue)>> {
        if map.len() != c.fields.len() {
            return Err(GenError::InvalidConstant {
                name: owner.to_string(),
                reason: format!("{} values for {} fields", map.len(), c.fields.len()),
            });
        }
        c.fields
            .iter()
            .map(|field| {
                let value = map
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(&field.name))
                    .map(|(_, v)| v)
                    .ok_or_else(|| GenError::InvalidConstant {
                        name: owner.to_string(),
                        reason: format!("no value for field `{}`", field.name),
                    })?;
                let literal: Literal =
                    serde_json::from_value(value.clone()).map_err(|e| GenError::InvalidConstant {
                        name: owner.to_string(),
                        reason: format!("field `{}`: {e}", field.name),
                    })?;
                let value = self.constant_value(owner, field.ty, &literal)?;
                Ok((field.name.clone(), value))
            })
            .collect()
    }

    fn is_unsigned(&self, ty: NodeId) -> Result<bool> {
        if let Kind::Reference(symbol) = &self.registry.node(ty).kind
            && exceptions::is_pointer_like_word(&symbol.name)
        {
            return Ok(true);
        }
        Ok(match self.resolver.underlying(ty)? {
            Underlying::Word => true,
            Underlying::Opaque(_) => false,
            Underlying::Node(target) => match self.registry.node(target).kind {
                Kind::Native(native) => native.is_unsigned(),
                _ => false,
            },
        })
    }

    /// Pointer- and struct-typed constants need a constructor expression.
    fn is_computed(&self, ty: NodeId) -> Result<bool> {
        Ok(match self.resolver.underlying(ty)? {
            Underlying::Word => false,
            Underlying::Opaque(_) => true,
            Underlying::Node(target) => matches!(
                self.registry.node(target).kind,
                Kind::Pointer(_)
                    | Kind::ComInterface(_)
                    | Kind::Struct(_)
                    | Kind::Union(_)
                    | Kind::Native(NativeType::Guid)
            ),
        })
    }

    // -----------------------------------------------------------------------
    // Short-name aliases
    // -----------------------------------------------------------------------

    fn short_aliases(&self, namespace: &Namespace, model: &mut BindingModel) {
        for alias in &namespace.unicode_aliases {
            let wide = format!("{alias}W");
            let kind = if model.structs.iter().any(|s| s.name == wide) {
                AliasKind::Struct
            } else if model.functions.iter().any(|f| f.name == wide) {
                AliasKind::Function
            } else {
                trace!(alias = %alias, namespace = %namespace.name, "no wide variant here; alias omitted");
                continue;
            };
            model.aliases.push(ShortAlias {
                name: alias.clone(),
                target: wide,
                kind,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `KERNEL32` → `kernel32.dll`; names with an extension are only lowercased.
pub fn import_library(declared: &str) -> String {
    let lower = declared.to_ascii_lowercase();
    if lower.contains('.') {
        lower
    } else {
        format!("{lower}.dll")
    }
}

/// Parse `{6b29fc40-ca47-1067-b31d-00dd010662da}` (braces optional).
pub fn parse_guid(owner: &str, text: &str) -> Result<u128> {
    let invalid = || GenError::InvalidGuid {
        owner: owner.to_string(),
        value: text.to_string(),
    };
    let trimmed = text.trim().trim_start_matches('{').trim_end_matches('}');
    let groups: Vec<&str> = trimmed.split('-').collect();
    let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    if lengths != [8, 4, 4, 4, 12] {
        return Err(invalid());
    }
    u128::from_str_radix(&groups.concat(), 16).map_err(|_| invalid())
}

/// Encode an integer literal for a target of `width` bits. A negative value
/// in an unsigned target becomes its two's-complement bit pattern,
/// `!(-value - 1)`.
pub fn integer_literal(
    owner: &str,
    literal: &Literal,
    unsigned: bool,
    width: usize,
) -> Result<ConstantValue> {
    let value = literal.as_integer().ok_or_else(|| GenError::InvalidConstant {
        name: owner.to_string(),
        reason: format!("expected an integer, found {literal:?}"),
    })?;
    if value < 0 && unsigned {
        let magnitude = (-value - 1) as u128;
        let mask = if width >= 64 {
            u64::MAX as u128
        } else {
            (1u128 << width) - 1
        };
        return Ok(ConstantValue::BitPattern {
            bits: (!magnitude & mask) as u64,
            width: width.min(64),
        });
    }
    Ok(ConstantValue::Integer(value))
}

fn native_expr(ty: NativeType) -> Option<TypeExpr> {
    let scalar = match ty {
        NativeType::SByte => Scalar::I8,
        NativeType::Byte => Scalar::U8,
        NativeType::Int16 => Scalar::I16,
        NativeType::UInt16 => Scalar::U16,
        NativeType::Char => Scalar::Char16,
        NativeType::Int32 => Scalar::I32,
        NativeType::UInt32 => Scalar::U32,
        NativeType::Int64 => Scalar::I64,
        NativeType::UInt64 => Scalar::U64,
        NativeType::Single => Scalar::F32,
        NativeType::Double => Scalar::F64,
        // Handles and pointer-sized integers are unsigned words.
        NativeType::IntPtr | NativeType::UIntPtr => Scalar::USize,
        NativeType::Boolean => Scalar::Bool,
        NativeType::Guid => return Some(TypeExpr::Guid),
        NativeType::String => return Some(TypeExpr::Pointer(Box::new(TypeExpr::Scalar(Scalar::Char16)))),
        NativeType::Void => return Some(TypeExpr::Void),
        NativeType::Unsupported => return None,
    };
    Some(TypeExpr::Scalar(scalar))
}

fn integer_scalar(ty: NativeType) -> Option<Scalar> {
    match native_expr(ty)? {
        TypeExpr::Scalar(Scalar::F32 | Scalar::F64 | Scalar::Bool) => None,
        TypeExpr::Scalar(s) => Some(s),
        _ => None,
    }
}

fn scalar_width(s: Scalar) -> Option<usize> {
    match s {
        Scalar::I8 | Scalar::U8 | Scalar::Bool => Some(8),
        Scalar::I16 | Scalar::U16 | Scalar::Char16 => Some(16),
        Scalar::I32 | Scalar::U32 | Scalar::F32 => Some(32),
        Scalar::I64 | Scalar::U64 | Scalar::F64 => Some(64),
        Scalar::ISize | Scalar::USize => None,
    }
}

fn scalar_is_unsigned(s: Scalar) -> bool {
    matches!(
        s,
        Scalar::U8 | Scalar::U16 | Scalar::U32 | Scalar::U64 | Scalar::USize | Scalar::Char16
    )
}

fn scalar_class(s: Scalar) -> MarshalClass {
    match s {
        Scalar::F32 | Scalar::F64 => MarshalClass::Float,
        Scalar::ISize | Scalar::USize => MarshalClass::RawWord,
        scalar => MarshalClass::Extend {
            scalar,
            wrapped: false,
        },
    }
}

fn storage_scalar(align: usize) -> Option<Scalar> {
    match align {
        1 => Some(Scalar::U8),
        2 => Some(Scalar::U16),
        4 => Some(Scalar::U32),
        8 => Some(Scalar::U64),
        _ => None,
    }
}

fn opaque_storage(info: SizeInfo) -> Option<TypeExpr> {
    let element = storage_scalar(info.align)?;
    Some(TypeExpr::Array(
        Box::new(TypeExpr::Scalar(element)),
        info.size / info.align,
    ))
}
