//! Emitter: binding model → Rust source bytes.
//!
//! Rendering is pure and deterministic: the same model always produces the
//! same bytes, and nothing here consults metadata or the registry.

use tracing::debug;

use crate::model::*;

#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Path of the runtime crate as spelled in generated code.
    pub runtime: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            runtime: "::bnd_rt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeEmitter {
    options: EmitOptions,
}

impl CodeEmitter {
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Render one namespace module.
    pub fn render(&self, model: &BindingModel) -> Vec<u8> {
        let mut r = Renderer {
            model,
            rt: &self.options.runtime,
            out: Out::default(),
        };
        r.file();
        debug!(namespace = %model.namespace, bytes = r.out.buf.len(), "rendered module");
        r.out.buf.into_bytes()
    }

    /// Render the `mod.rs` index declaring every module, in the given order.
    pub fn render_index(&self, modules: &[String]) -> Vec<u8> {
        let mut out = Out::default();
        out.line("//! Generated by bnd-win32; do not edit.");
        out.line("");
        out.line("#![allow(non_snake_case)]");
        out.line("");
        for module in modules {
            out.line(&format!("pub mod {module};"));
        }
        out.buf.into_bytes()
    }
}

// ---------------------------------------------------------------------------
// Output buffer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Out {
    buf: String,
    depth: usize,
}

impl Out {
    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str("    ");
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// A valid Rust identifier for `name`: raw for keywords, suffixed for the
/// path keywords that cannot be raw.
pub fn ident(name: &str) -> String {
    match name {
        "self" | "Self" | "super" | "crate" => format!("{name}_"),
        "_" => "_0".to_string(),
        n if KEYWORDS.contains(&n) => format!("r#{n}"),
        n => n.to_string(),
    }
}

fn scalar_name(s: Scalar) -> &'static str {
    match s {
        Scalar::I8 => "i8",
        Scalar::U8 => "u8",
        Scalar::I16 => "i16",
        Scalar::U16 | Scalar::Char16 => "u16",
        Scalar::I32 => "i32",
        Scalar::U32 => "u32",
        Scalar::I64 => "i64",
        Scalar::U64 => "u64",
        Scalar::F32 => "f32",
        Scalar::F64 => "f64",
        Scalar::ISize => "isize",
        Scalar::USize => "usize",
        Scalar::Bool => "bool",
    }
}

fn signed_bits(s: Scalar) -> Option<u32> {
    match s {
        Scalar::I8 => Some(8),
        Scalar::I16 => Some(16),
        Scalar::I32 => Some(32),
        Scalar::I64 => Some(64),
        _ => None,
    }
}

/// Integer literal; values above a signed target's range are spelled as
/// their unsigned bit pattern cast back.
fn int_literal(value: i128, scalar: Option<Scalar>) -> String {
    if let Some(bits) = scalar.and_then(signed_bits) {
        let max = (1i128 << (bits - 1)) - 1;
        if value > max && value < (1i128 << bits) {
            return format!("{value:#X}u{bits} as i{bits}");
        }
    }
    value.to_string()
}

// ---------------------------------------------------------------------------
// Module rendering
// ---------------------------------------------------------------------------

struct Renderer<'m> {
    model: &'m BindingModel,
    rt: &'m str,
    out: Out,
}

impl Renderer<'_> {
    fn file(&mut self) {
        self.out.line(&format!("//! `{}` bindings.", self.model.namespace));
        self.out.line("//!");
        self.out.line("//! Generated by bnd-win32; do not edit.");
        self.out.line("");
        self.out.open("#![allow(");
        for lint in [
            "non_snake_case,",
            "non_camel_case_types,",
            "non_upper_case_globals,",
            "dead_code,",
            "overflowing_literals,",
            "clippy::all",
        ] {
            self.out.line(lint);
        }
        self.out.close(")]");

        let model = self.model;
        for a in &model.type_aliases {
            self.out.line("");
            self.out.line(&format!("pub type {} = {};", ident(&a.name), self.ty(&a.target)));
        }
        for e in &model.enums {
            self.enumeration(e);
        }
        for s in &model.structs {
            self.structure(s);
        }
        for f in &model.function_pointers {
            self.function_pointer(f);
        }
        self.constants(Binding::Literal);
        self.constants(Binding::Computed);
        for i in &model.interfaces {
            self.interface(i);
        }
        for f in &model.functions {
            self.out.line("");
            self.callable(f, None);
        }
        for a in &model.aliases {
            self.out.line("");
            match a.kind {
                AliasKind::Struct => self
                    .out
                    .line(&format!("pub type {} = {};", ident(&a.name), ident(&a.target))),
                AliasKind::Function => self
                    .out
                    .line(&format!("pub use self::{} as {};", ident(&a.target), ident(&a.name))),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    fn ty(&self, t: &TypeExpr) -> String {
        match t {
            TypeExpr::Void => "::core::ffi::c_void".to_string(),
            TypeExpr::Scalar(s) => scalar_name(*s).to_string(),
            TypeExpr::Guid => format!("{}::GUID", self.rt),
            TypeExpr::Str => "&str".to_string(),
            TypeExpr::Named { namespace, name } => self.path(namespace, &ident(name)),
            TypeExpr::Pointer(inner) => format!("*mut {}", self.ty(inner)),
            TypeExpr::Array(inner, n) => format!("[{}; {n}]", self.ty(inner)),
        }
    }

    fn path(&self, namespace: &str, item: &str) -> String {
        if namespace == self.model.namespace {
            item.to_string()
        } else {
            format!("super::{}::{item}", module_name(namespace))
        }
    }

    /// `Named` plus a suffix (`IUnknown` → `IUnknown_Vtbl`).
    fn suffixed(&self, t: &TypeExpr, suffix: &str) -> String {
        match t {
            TypeExpr::Named { namespace, name } => self.path(namespace, &format!("{name}{suffix}")),
            other => format!("{}{suffix}", self.ty(other)),
        }
    }

    /// The integer scalar behind a type, when this module can see it.
    fn scalar_of(&self, t: &TypeExpr) -> Option<Scalar> {
        match t {
            TypeExpr::Scalar(s) => Some(*s),
            TypeExpr::Named { namespace, name } if *namespace == self.model.namespace => {
                if let Some(e) = self.model.enums.iter().find(|e| e.name == *name) {
                    return Some(e.base);
                }
                self.model
                    .type_aliases
                    .iter()
                    .find(|a| a.name == *name)
                    .and_then(|a| self.scalar_of(&a.target))
            }
            _ => None,
        }
    }

    fn field_type(&self, owner: &TypeExpr, field: &str) -> Option<&TypeExpr> {
        let TypeExpr::Named { namespace, name } = owner else {
            return None;
        };
        if *namespace != self.model.namespace {
            return None;
        }
        let s = self.model.structs.iter().find(|s| s.name == *name)?;
        s.fields.iter().find(|f| f.name == field).map(|f| &f.ty)
    }

    // -----------------------------------------------------------------------
    // Constants
    // -----------------------------------------------------------------------

    fn value(&self, value: &ConstantValue, ty: &TypeExpr) -> String {
        match value {
            ConstantValue::Integer(v) => int_literal(*v, self.scalar_of(ty)),
            ConstantValue::BitPattern { bits, .. } => format!("{bits:#X}"),
            ConstantValue::Float(v) => format!("{v:?}"),
            ConstantValue::Bool(b) => b.to_string(),
            ConstantValue::Text(s) => format!("{s:?}"),
            ConstantValue::Guid(g) => format!("{rt}::GUID::from_u128({g:#034x})", rt = self.rt),
            ConstantValue::TextPointer { ty, text, wide } => {
                let (unit, units): (&str, Vec<String>) = if *wide {
                    ("u16", text.encode_utf16().chain([0]).map(|u| u.to_string()).collect())
                } else {
                    ("u8", text.bytes().chain([0]).map(|b| b.to_string()).collect())
                };
                format!(
                    "{{ const TEXT: &[{unit}] = &[{}]; TEXT.as_ptr() as {} }}",
                    units.join(", "),
                    self.ty(ty)
                )
            }
            ConstantValue::Address { ty, value } if *value < 0 => {
                format!("({value}isize) as {}", self.ty(ty))
            }
            ConstantValue::Address { ty, value } => format!("{value}usize as {}", self.ty(ty)),
            ConstantValue::Wrapped { ty, value } => {
                let base = self
                    .scalar_of(ty)
                    .map_or(TypeExpr::Void, TypeExpr::Scalar);
                format!("{}({})", self.ty(ty), self.value(value, &base))
            }
            ConstantValue::Fields { ty, fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(name, v)| {
                        let field_ty = self.field_type(ty, name).cloned().unwrap_or(TypeExpr::Void);
                        format!("{}: {}", ident(name), self.value(v, &field_ty))
                    })
                    .collect();
                format!("{} {{ {} }}", self.ty(ty), fields.join(", "))
            }
        }
    }

    fn constants(&mut self, binding: Binding) {
        let model = self.model;
        let mut first = true;
        for c in model.constants.iter().filter(|c| c.binding == binding) {
            if first {
                self.out.line("");
                first = false;
            }
            let line = format!(
                "pub const {}: {} = {};",
                ident(&c.name),
                self.ty(&c.ty),
                self.value(&c.value, &c.ty)
            );
            self.out.line(&line);
        }
    }

    // -----------------------------------------------------------------------
    // Enums
    // -----------------------------------------------------------------------

    fn enumeration(&mut self, e: &Enum) {
        let name = ident(&e.name);
        let base = scalar_name(e.base);
        self.out.line("");
        self.out.line("#[repr(transparent)]");
        self.out.line("#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]");
        self.out.line(&format!("pub struct {name}(pub {base});"));
        for m in &e.members {
            let value = self.value(&m.value, &TypeExpr::Scalar(e.base));
            self.out
                .line(&format!("pub const {}: {name} = {name}({value});", ident(&m.name)));
        }
        if e.flags {
            for (tr, method, op) in [("BitOr", "bitor", "|"), ("BitAnd", "bitand", "&")] {
                self.out.open(&format!("impl ::core::ops::{tr} for {name} {{"));
                self.out.line("type Output = Self;");
                self.out.open(&format!("fn {method}(self, rhs: Self) -> Self {{"));
                self.out.line(&format!("Self(self.0 {op} rhs.0)"));
                self.out.close("}");
                self.out.close("}");
                self.out.open(&format!("impl ::core::ops::{tr}Assign for {name} {{"));
                self.out.open(&format!("fn {method}_assign(&mut self, rhs: Self) {{"));
                self.out.line(&format!("self.0 {op}= rhs.0;"));
                self.out.close("}");
                self.out.close("}");
            }
            self.out.open(&format!("impl ::core::ops::Not for {name} {{"));
            self.out.line("type Output = Self;");
            self.out.open("fn not(self) -> Self {");
            self.out.line("Self(!self.0)");
            self.out.close("}");
            self.out.close("}");
        }
    }

    // -----------------------------------------------------------------------
    // Structs and unions
    // -----------------------------------------------------------------------

    fn structure(&mut self, s: &Struct) {
        let name = ident(&s.name);
        let mut repr = vec!["C".to_string()];
        if let Some(n) = s.packing {
            repr.push(format!("packed({n})"));
        }
        if let Some(a) = s.align_override {
            repr.push(format!("align({a})"));
        }

        self.out.line("");
        if s.kind == StructKind::Union {
            self.out.line(&format!("/// Union of {} bytes.", s.layout.size));
        }
        self.out.line(&format!("#[repr({})]", repr.join(", ")));
        self.out.line("#[derive(Clone, Copy)]");
        if s.fields.is_empty() {
            self.out.line(&format!("pub struct {name} {{}}"));
        } else {
            self.out.open(&format!("pub struct {name} {{"));
            for f in &s.fields {
                let line = format!("pub {}: {},", ident(&f.name), self.ty(&f.ty));
                self.out.line(&line);
            }
            self.out.close("}");
        }

        self.out.open(&format!("impl Default for {name} {{"));
        self.out.open("fn default() -> Self {");
        self.out.line("unsafe { ::core::mem::zeroed() }");
        self.out.close("}");
        self.out.close("}");

        // References into packed structs may be misaligned.
        if s.packing.is_none()
            && let Some(f) = s.fields.iter().find(|f| f.embedded)
        {
            let field = ident(&f.name);
            let target = self.ty(&f.ty);
            self.out.open(&format!("impl ::core::ops::Deref for {name} {{"));
            self.out.line(&format!("type Target = {target};"));
            self.out.open(&format!("fn deref(&self) -> &{target} {{"));
            self.out.line(&format!("&self.{field}"));
            self.out.close("}");
            self.out.close("}");
            self.out.open(&format!("impl ::core::ops::DerefMut for {name} {{"));
            self.out.open(&format!("fn deref_mut(&mut self) -> &mut {target} {{"));
            self.out.line(&format!("&mut self.{field}"));
            self.out.close("}");
            self.out.close("}");
        }

        if !s.accessors.is_empty() {
            self.out.open(&format!("impl {name} {{"));
            for a in &s.accessors {
                self.accessor(a, s.packing.is_some());
            }
            self.out.close("}");
        }

        let cfg = format!(
            "#[cfg(target_pointer_width = \"{}\")]",
            self.model.pointer_width * 8
        );
        self.out.line(&cfg);
        self.out.line(&format!(
            "const _: () = assert!(::core::mem::size_of::<{name}>() == {});",
            s.layout.size
        ));
        if s.layout.align > 0 {
            self.out.line(&cfg);
            self.out.line(&format!(
                "const _: () = assert!(::core::mem::align_of::<{name}>() == {});",
                s.layout.align
            ));
        }
    }

    fn accessor(&mut self, a: &Accessor, packed: bool) {
        let ty = self.ty(&a.ty);
        let by_ref = ident(&a.name);
        let by_value = ident(&format!("{}_val", a.name));
        if packed {
            self.out.open(&format!("pub fn {by_ref}(&mut self) -> *mut {ty} {{"));
            self.out.line(&format!("(self as *mut Self).cast::<{ty}>()"));
        } else {
            self.out.open(&format!("pub unsafe fn {by_ref}(&mut self) -> &mut {ty} {{"));
            self.out.line(&format!("unsafe {{ &mut *(self as *mut Self).cast::<{ty}>() }}"));
        }
        self.out.close("}");
        self.out.open(&format!("pub unsafe fn {by_value}(&self) -> {ty} {{"));
        self.out.line(&format!(
            "unsafe {{ (self as *const Self).cast::<{ty}>().read_unaligned() }}"
        ));
        self.out.close("}");
    }

    // -----------------------------------------------------------------------
    // Callables
    // -----------------------------------------------------------------------

    fn function_pointer(&mut self, f: &Function) {
        let params: Vec<String> = f.params.iter().map(|p| self.ty(&p.ty)).collect();
        let ret = f
            .ret
            .as_ref()
            .map(|r| format!(" -> {}", self.ty(&r.ty)))
            .unwrap_or_default();
        self.out.line("");
        self.out.line(&format!(
            "pub type {} = Option<unsafe extern \"system\" fn({}){ret}>;",
            ident(&f.name),
            params.join(", ")
        ));
    }

    fn params(&self, f: &Function) -> Vec<String> {
        f.params
            .iter()
            .map(|p| format!("{}: {}", ident(&p.name), self.ty(&p.ty)))
            .collect()
    }

    fn ret_type(&self, f: &Function) -> String {
        match (&f.ret, f.set_last_error) {
            (None, false) => String::new(),
            (None, true) => " -> u32".to_string(),
            (Some(r), false) => format!(" -> {}", self.ty(&r.ty)),
            (Some(r), true) => format!(" -> ({}, u32)", self.ty(&r.ty)),
        }
    }

    fn marshal(&self, p: &Param) -> String {
        let name = ident(&p.name);
        match p.class {
            // Signed bases sign-extend through the cast.
            MarshalClass::Extend { wrapped: true, .. } => format!("{name}.0 as usize"),
            MarshalClass::Extend { .. } | MarshalClass::Pointer => format!("{name} as usize"),
            MarshalClass::Float => name,
            MarshalClass::RawWord => format!(
                "::core::mem::transmute::<{}, usize>({name})",
                self.ty(&p.ty)
            ),
            MarshalClass::ByValue => format!("{}::word_from_value(&{name})", self.rt),
            MarshalClass::ByAddress => format!("&{name} as *const {} as usize", self.ty(&p.ty)),
        }
    }

    fn unmarshal(&self, r: &Return) -> String {
        let ty = self.ty(&r.ty);
        match r.class {
            // Only the low byte of a returned bool is defined.
            MarshalClass::Extend {
                scalar: Scalar::Bool,
                ..
            } => "__ret as u8 != 0".to_string(),
            MarshalClass::Extend {
                scalar,
                wrapped: true,
            } => format!("{ty} {{ 0: __ret as {} }}", scalar_name(scalar)),
            MarshalClass::Extend { scalar, .. } => format!("__ret as {}", scalar_name(scalar)),
            MarshalClass::Pointer => format!("__ret as {ty}"),
            MarshalClass::Float => "__ret".to_string(),
            MarshalClass::RawWord => format!("::core::mem::transmute::<usize, {ty}>(__ret)"),
            MarshalClass::ByValue | MarshalClass::ByAddress => {
                format!("{}::value_from_word::<{ty}>(__ret)", self.rt)
            }
        }
    }

    /// A free function (`slot == None`) or a COM method calling through
    /// dispatch slot `slot`.
    fn callable(&mut self, f: &Function, slot: Option<usize>) {
        let mut params = self.params(f);
        if slot.is_some() {
            params.insert(0, "&self".to_string());
        }
        self.out.open(&format!(
            "pub unsafe fn {}({}){} {{",
            ident(&f.name),
            params.join(", "),
            self.ret_type(f)
        ));
        if slot.is_none() {
            let library = f.library.as_deref().unwrap_or_default();
            self.out.line(&format!(
                "static __PROC: {rt}::LazyProc = {rt}::LazyProc::new(c{library:?}, c{:?});",
                f.name,
                rt = self.rt
            ));
        }
        self.out.open("unsafe {");

        let mut raw_params = Vec::new();
        let mut args = Vec::new();
        if slot.is_some() {
            raw_params.push("usize".to_string());
            args.push("self as *const Self as usize".to_string());
        }
        let hidden = f.ret.as_ref().filter(|r| r.class == MarshalClass::ByAddress);
        if let Some(r) = hidden {
            self.out.line(&format!(
                "let mut __out = ::core::mem::MaybeUninit::<{}>::uninit();",
                self.ty(&r.ty)
            ));
            raw_params.push("usize".to_string());
            args.push("__out.as_mut_ptr() as usize".to_string());
        }
        for p in &f.params {
            raw_params.push(match p.class {
                MarshalClass::Float => self.ty(&p.ty),
                _ => "usize".to_string(),
            });
            args.push(self.marshal(p));
        }
        let raw_ret = match &f.ret {
            None => String::new(),
            Some(r) if r.class == MarshalClass::Float => format!(" -> {}", self.ty(&r.ty)),
            Some(_) => " -> usize".to_string(),
        };

        let address = match slot {
            None => "__PROC.address()".to_string(),
            Some(index) => {
                self.out
                    .line("let __vtbl = *(self as *const Self).cast::<*const usize>();");
                format!("*__vtbl.add({index})")
            }
        };
        self.out.line(&format!(
            "let __fn: unsafe extern \"system\" fn({}){raw_ret} = ::core::mem::transmute({address});",
            raw_params.join(", ")
        ));

        let call = format!("__fn({})", args.join(", "));
        if f.ret.is_none() || hidden.is_some() {
            self.out.line(&format!("{call};"));
        } else {
            self.out.line(&format!("let __ret = {call};"));
        }
        if f.set_last_error {
            self.out
                .line(&format!("let __err = {}::last_error();", self.rt));
        }

        let result = match &f.ret {
            None => None,
            Some(_) if hidden.is_some() => Some("__out.assume_init()".to_string()),
            Some(r) => Some(self.unmarshal(r)),
        };
        match (result, f.set_last_error) {
            (Some(r), true) => self.out.line(&format!("({r}, __err)")),
            (Some(r), false) => self.out.line(&r),
            (None, true) => self.out.line("__err"),
            (None, false) => {}
        }
        self.out.close("}");
        self.out.close("}");
    }

    // -----------------------------------------------------------------------
    // COM interfaces
    // -----------------------------------------------------------------------

    fn interface(&mut self, i: &ComInterface) {
        let name = ident(&i.name);

        if let Some(iid) = i.iid {
            self.out.line("");
            self.out.line(&format!(
                "pub const IID_{}: {rt}::GUID = {rt}::GUID::from_u128({iid:#034x});",
                i.name,
                rt = self.rt
            ));
        }

        // Abstract method set.
        self.out.line("");
        let supertrait = i
            .base
            .as_ref()
            .map(|b| format!(": {}", self.suffixed(b, "_Impl")))
            .unwrap_or_default();
        if i.methods.is_empty() {
            self.out.line(&format!("pub trait {}_Impl{supertrait} {{}}", i.name));
        } else {
            self.out.open(&format!("pub trait {}_Impl{supertrait} {{", i.name));
            for m in &i.methods {
                let f = &m.function;
                let mut params = self.params(f);
                params.insert(0, "&self".to_string());
                let ret = f
                    .ret
                    .as_ref()
                    .map(|r| format!(" -> {}", self.ty(&r.ty)))
                    .unwrap_or_default();
                self.out
                    .line(&format!("unsafe fn {}({}){ret};", ident(&f.name), params.join(", ")));
            }
            self.out.close("}");
        }

        // Dispatch table.
        self.out.line("");
        let inherited = i.slots.len() - i.methods.len();
        self.out.line(&format!(
            "/// Dispatch table: {} slots, {inherited} inherited.",
            i.slots.len()
        ));
        self.out.line("#[repr(C)]");
        self.out.line("#[derive(Clone, Copy)]");
        self.out.open(&format!("pub struct {}_Vtbl {{", i.name));
        if let Some(base) = &i.base {
            let line = format!("pub base__: {},", self.suffixed(base, "_Vtbl"));
            self.out.line(&line);
        }
        for m in &i.methods {
            self.out.line(&format!("pub {}: usize,", ident(&m.function.name)));
        }
        self.out.close("}");

        // Handle.
        self.out.line("");
        self.out.line("#[repr(C)]");
        self.out.line("#[derive(Clone, Copy)]");
        self.out.open(&format!("pub struct {name} {{"));
        match &i.base {
            None => self.out.line(&format!("pub lpVtbl: *const {}_Vtbl,", i.name)),
            Some(base) => {
                let line = format!("pub base__: {},", self.ty(base));
                self.out.line(&line);
            }
        }
        self.out.close("}");
        if let Some(base) = &i.base {
            let target = self.ty(base);
            self.out.open(&format!("impl ::core::ops::Deref for {name} {{"));
            self.out.line(&format!("type Target = {target};"));
            self.out.open(&format!("fn deref(&self) -> &{target} {{"));
            self.out.line("&self.base__");
            self.out.close("}");
            self.out.close("}");
        }

        if !i.methods.is_empty() {
            self.out.open(&format!("impl {name} {{"));
            for m in &i.methods {
                self.callable(&m.function, Some(m.slot));
            }
            self.out.close("}");
        }
    }
}
