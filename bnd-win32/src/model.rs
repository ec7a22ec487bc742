//! Binding model: the target-agnostic description of one namespace's
//! bindings, produced by the [`builder`](crate::builder) and consumed by the
//! [`emit`](crate::emit) stage.
//!
//! Everything the emitter needs is decided here: flattened names, marshal
//! classes, dispatch slots, constant encodings. The emitter never looks
//! back at metadata.

use std::collections::{BTreeSet, HashSet};

use crate::error::{GenError, Result};
use crate::layout::SizeInfo;

/// Module name a namespace is rendered into (`UI.Shell` → `UI_Shell`).
pub fn module_name(namespace: &str) -> String {
    namespace.replace('.', "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    ISize,
    USize,
    Bool,
    /// UTF-16 code unit.
    Char16,
}

/// A type as it is spelled in bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Only meaningful behind a pointer.
    Void,
    Scalar(Scalar),
    Guid,
    /// Static string (string-typed constants only).
    Str,
    /// A type emitted by some namespace, possibly this one.
    Named { namespace: String, name: String },
    Pointer(Box<TypeExpr>),
    Array(Box<TypeExpr>, usize),
}

impl TypeExpr {
    pub fn named(namespace: &str, name: &str) -> Self {
        TypeExpr::Named {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    fn namespaces(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeExpr::Named { namespace, .. } => {
                out.insert(namespace.clone());
            }
            TypeExpr::Pointer(inner) | TypeExpr::Array(inner, _) => inner.namespaces(out),
            TypeExpr::Void | TypeExpr::Scalar(_) | TypeExpr::Guid | TypeExpr::Str => {}
        }
    }
}

/// How a value crosses the call boundary as a machine word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarshalClass {
    /// Integer or bool, zero/sign-extended to a word. `scalar` is the
    /// resolved integer type behind any aliases; `wrapped` marks an enum
    /// newtype over it.
    Extend { scalar: Scalar, wrapped: bool },
    /// Floating point, passed in its own register class.
    Float,
    /// Raw address.
    Pointer,
    /// Pointer-sized handle or function pointer, bit-reinterpreted.
    RawWord,
    /// Aggregate that fits in a word, reinterpreted as one.
    ByValue,
    /// Aggregate larger than a word; its address is passed.
    ByAddress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub class: MarshalClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub ty: TypeExpr,
    pub class: MarshalClass,
}

/// A callable: free function, function-pointer type, or COM method.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<Return>,
    /// Also surface the platform last-error value.
    pub set_last_error: bool,
    /// Import library (`kernel32.dll`); free functions only.
    pub library: Option<String>,
}

impl Function {
    fn namespaces(&self, out: &mut BTreeSet<String>) {
        for p in &self.params {
            p.ty.namespaces(out);
        }
        if let Some(ret) = &self.ret {
            ret.ty.namespaces(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub target: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Integer(i128),
    /// Two's-complement pattern of a negative literal in an unsigned
    /// target of `width` bits.
    BitPattern { bits: u64, width: usize },
    Float(f64),
    Bool(bool),
    Text(String),
    Guid(u128),
    /// NUL-terminated text behind the string pointer type `ty`, in UTF-16
    /// units when `wide`, bytes otherwise.
    TextPointer {
        ty: TypeExpr,
        text: String,
        wide: bool,
    },
    /// Integer reinterpreted as a pointer of type `ty`.
    Address { ty: TypeExpr, value: i128 },
    /// Value of the distinct enum type `ty`.
    Wrapped {
        ty: TypeExpr,
        value: Box<ConstantValue>,
    },
    /// Literal of struct `ty`, in field declaration order.
    Fields {
        ty: TypeExpr,
        fields: Vec<(String, ConstantValue)>,
    },
}

impl ConstantValue {
    fn namespaces(&self, out: &mut BTreeSet<String>) {
        match self {
            ConstantValue::Address { ty, .. } | ConstantValue::TextPointer { ty, .. } => {
                ty.namespaces(out)
            }
            ConstantValue::Wrapped { ty, value } => {
                ty.namespaces(out);
                value.namespaces(out);
            }
            ConstantValue::Fields { ty, fields } => {
                ty.namespaces(out);
                for (_, value) in fields {
                    value.namespaces(out);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Plain literal.
    Literal,
    /// Pointer- or struct-typed; built from a constructor expression.
    Computed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub ty: TypeExpr,
    pub value: ConstantValue,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: ConstantValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub base: Scalar,
    pub flags: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    /// Spliced into the parent: the parent dereferences to this field.
    pub embedded: bool,
}

/// Union member reinterpreting the storage of its union.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub name: String,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub kind: StructKind,
    pub layout: SizeInfo,
    pub packing: Option<usize>,
    /// Explicit alignment the rendered type needs beyond its fields'.
    pub align_override: Option<usize>,
    pub fields: Vec<Field>,
    pub accessors: Vec<Accessor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSlot {
    pub interface: String,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComMethod {
    pub function: Function,
    /// Index into the dispatch table.
    pub slot: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComInterface {
    pub name: String,
    pub iid: Option<u128>,
    /// `None` only for the root interface.
    pub base: Option<TypeExpr>,
    pub methods: Vec<ComMethod>,
    /// Full dispatch table: inherited slots root-first, then own methods.
    pub slots: Vec<DispatchSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Struct,
    Function,
}

/// `Name` → `NameW`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortAlias {
    pub name: String,
    pub target: String,
    pub kind: AliasKind,
}

/// Everything one namespace emits.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingModel {
    pub namespace: String,
    pub pointer_width: usize,
    pub constants: Vec<Constant>,
    pub type_aliases: Vec<TypeAlias>,
    pub enums: Vec<Enum>,
    pub structs: Vec<Struct>,
    pub function_pointers: Vec<Function>,
    pub functions: Vec<Function>,
    pub interfaces: Vec<ComInterface>,
    pub aliases: Vec<ShortAlias>,
}

impl BindingModel {
    pub fn new(namespace: &str, pointer_width: usize) -> Self {
        Self {
            namespace: namespace.to_string(),
            pointer_width,
            constants: Vec::new(),
            type_aliases: Vec::new(),
            enums: Vec::new(),
            structs: Vec::new(),
            function_pointers: Vec::new(),
            functions: Vec::new(),
            interfaces: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn module_name(&self) -> String {
        module_name(&self.namespace)
    }

    /// Other namespaces this model's items refer to.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for a in &self.type_aliases {
            a.target.namespaces(&mut out);
        }
        for c in &self.constants {
            c.ty.namespaces(&mut out);
            c.value.namespaces(&mut out);
        }
        for s in &self.structs {
            for f in &s.fields {
                f.ty.namespaces(&mut out);
            }
            for a in &s.accessors {
                a.ty.namespaces(&mut out);
            }
        }
        for f in self.function_pointers.iter().chain(&self.functions) {
            f.namespaces(&mut out);
        }
        for i in &self.interfaces {
            if let Some(base) = &i.base {
                base.namespaces(&mut out);
            }
            for m in &i.methods {
                m.function.namespaces(&mut out);
            }
        }
        out.remove(&self.namespace);
        out
    }

    /// Fail if two emitted items would share a name in the type or value
    /// namespace of the rendered module, or two methods share a name on one
    /// interface.
    pub fn check_duplicate_names(&self) -> Result<()> {
        let mut types = NameSet::new(&self.namespace, "type");
        let mut values = NameSet::new(&self.namespace, "value");

        for a in &self.type_aliases {
            types.insert(&a.name)?;
        }
        for e in &self.enums {
            types.insert(&e.name)?;
            // Tuple-struct constructor.
            values.insert(&e.name)?;
            for m in &e.members {
                values.insert(&m.name)?;
            }
        }
        for s in &self.structs {
            types.insert(&s.name)?;
        }
        for f in &self.function_pointers {
            types.insert(&f.name)?;
        }
        for c in &self.constants {
            values.insert(&c.name)?;
        }
        for f in &self.functions {
            values.insert(&f.name)?;
        }
        for i in &self.interfaces {
            types.insert(&i.name)?;
            types.insert(&format!("{}_Vtbl", i.name))?;
            types.insert(&format!("{}_Impl", i.name))?;
            if i.iid.is_some() {
                values.insert(&format!("IID_{}", i.name))?;
            }
            let mut methods = NameSet::new(&i.name, "method");
            for m in &i.methods {
                methods.insert(&m.function.name)?;
            }
        }
        for a in &self.aliases {
            match a.kind {
                AliasKind::Struct => types.insert(&a.name)?,
                AliasKind::Function => values.insert(&a.name)?,
            }
        }
        Ok(())
    }
}

struct NameSet<'a> {
    owner: &'a str,
    scope: &'static str,
    seen: HashSet<String>,
}

impl<'a> NameSet<'a> {
    fn new(owner: &'a str, scope: &'static str) -> Self {
        Self {
            owner,
            scope,
            seen: HashSet::new(),
        }
    }

    fn insert(&mut self, name: &str) -> Result<()> {
        if self.seen.insert(name.to_string()) {
            Ok(())
        } else {
            Err(GenError::DuplicateName {
                namespace: self.owner.to_string(),
                name: name.to_string(),
                scope: self.scope,
            })
        }
    }
}
