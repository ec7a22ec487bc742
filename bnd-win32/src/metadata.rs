//! Corpus ingestion: win32json files → serde wire types.
//!
//! Each `<Namespace>.json` file holds one API namespace with its constants,
//! (arbitrarily nested) type declarations, functions, and short-name alias
//! requests. Nothing here interprets the data beyond the architecture and
//! import-library filtering the core expects to have already happened.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// One decoded namespace tree.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Api {
    /// Namespace name, taken from the file stem (e.g. `UI.Shell`).
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub unicode_aliases: Vec<String>,
}

/// Declared numeric kind of a native scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum NativeType {
    SByte,
    Byte,
    Int16,
    UInt16,
    Char,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    IntPtr,
    UIntPtr,
    Guid,
    Boolean,
    String,
    Void,
    #[serde(other)]
    Unsupported,
}

impl NativeType {
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::UInt16
                | Self::Char
                | Self::UInt32
                | Self::UInt64
                | Self::IntPtr
                | Self::UIntPtr
        )
    }

    /// Parses the `ValueType` spelling of a constant.
    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(name.to_string()))
            .ok()
            .filter(|t| *t != Self::Unsupported)
    }
}

/// A type in reference position: field, parameter, return, typedef target.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "Kind", rename_all_fields = "PascalCase")]
pub enum TypeRef {
    Native {
        name: NativeType,
    },
    #[serde(alias = "LPArray")]
    PointerTo {
        child: Box<TypeRef>,
    },
    Array {
        #[serde(default)]
        shape: Option<Shape>,
        child: Box<TypeRef>,
    },
    ApiRef {
        name: String,
        #[serde(default)]
        target_kind: TargetKind,
        api: String,
        #[serde(default)]
        parents: Vec<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shape {
    #[serde(default)]
    pub size: usize,
}

/// What an `ApiRef` points at, as recorded by the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TargetKind {
    #[default]
    Default,
    Com,
    FunctionPointer,
    #[serde(other)]
    Other,
}

/// A type declaration (possibly nested inside a struct or union).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub architectures: Vec<String>,
    #[serde(default)]
    pub nested_types: Vec<TypeDecl>,
    #[serde(flatten)]
    pub body: TypeBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "Kind", rename_all_fields = "PascalCase")]
pub enum TypeBody {
    NativeTypedef {
        def: TypeRef,
    },
    Enum {
        #[serde(default)]
        flags: bool,
        #[serde(default)]
        integer_base: Option<NativeType>,
        #[serde(default)]
        values: Vec<EnumValue>,
    },
    Struct {
        #[serde(default)]
        packing_size: Option<usize>,
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    Union {
        #[serde(default)]
        packing_size: Option<usize>,
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    Com {
        #[serde(default)]
        guid: Option<String>,
        #[serde(default)]
        interface: Option<TypeRef>,
        #[serde(default)]
        methods: Vec<Method>,
    },
    #[serde(rename = "ComClassID")]
    ComClassId {
        guid: String,
    },
    FunctionPointer {
        #[serde(default)]
        set_last_error: bool,
        #[serde(default)]
        return_type: Option<TypeRef>,
        #[serde(default)]
        params: Vec<ParamDecl>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnumValue {
    pub name: String,
    pub value: Literal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "Type")]
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "Type")]
    pub ty: TypeRef,
}

/// A COM interface method.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub set_last_error: bool,
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

/// An exported free function.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub set_last_error: bool,
    #[serde(default)]
    pub dll_import: Option<String>,
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub architectures: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Constant {
    pub name: String,
    #[serde(rename = "Type")]
    pub ty: TypeRef,
    /// Spelling of the literal's own type, e.g. `Int32` for `-1`.
    #[serde(default)]
    pub value_type: Option<String>,
    pub value: Literal,
}

/// A literal as it appears in the corpus.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Structured(serde_json::Map<String, serde_json::Value>),
}

impl Literal {
    /// The value as a wide integer, if it is integral.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Literal::Unsigned(v) => Some(*v as i128),
            Literal::Signed(v) => Some(*v as i128),
            _ => None,
        }
    }
}

/// Parse one namespace from JSON text.
pub fn parse_api(name: &str, json: &str) -> serde_json::Result<Api> {
    let mut api: Api = serde_json::from_str(json)?;
    api.name = name.to_string();
    Ok(api)
}

/// Load every `*.json` file in `dir`, sorted by namespace name.
pub fn load_dir(dir: &Path) -> Result<Vec<Api>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading metadata directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut apis = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("non UTF-8 metadata file name {}", path.display()))?;
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let api = parse_api(name, &json).with_context(|| format!("parsing {}", path.display()))?;
        debug!(
            namespace = %api.name,
            constants = api.constants.len(),
            types = api.types.len(),
            functions = api.functions.len(),
            "loaded namespace"
        );
        apis.push(api);
    }

    info!(dir = %dir.display(), namespaces = apis.len(), "loaded metadata corpus");
    Ok(apis)
}

/// Drop declarations that are out of scope for this run: types and
/// functions restricted to other architectures, and functions imported from
/// libraries outside `libraries` (compared case-insensitively; an empty list
/// admits every library).
pub fn retain_in_scope(api: &mut Api, arch: &str, libraries: &[String]) {
    let before = (api.types.len(), api.functions.len());
    retain_types(&mut api.types, arch);
    api.functions.retain(|f| {
        if !arch_matches(&f.architectures, arch) {
            return false;
        }
        if libraries.is_empty() {
            return true;
        }
        f.dll_import.as_deref().is_some_and(|dll| {
            let dll = dll.to_ascii_lowercase();
            let dll = dll.strip_suffix(".dll").unwrap_or(&dll);
            libraries.iter().any(|l| l.eq_ignore_ascii_case(dll))
        })
    });
    debug!(
        namespace = %api.name,
        dropped_types = before.0 - api.types.len(),
        dropped_functions = before.1 - api.functions.len(),
        "filtered namespace"
    );
}

fn retain_types(types: &mut Vec<TypeDecl>, arch: &str) {
    types.retain(|t| arch_matches(&t.architectures, arch));
    for t in types.iter_mut() {
        retain_types(&mut t.nested_types, arch);
    }
}

/// An empty architecture list means "all architectures".
fn arch_matches(architectures: &[String], arch: &str) -> bool {
    architectures.is_empty() || architectures.iter().any(|a| a == arch)
}
