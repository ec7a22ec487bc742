//! Fatal corpus-integrity errors.
//!
//! Every variant aborts the run. Expected omissions (skipped constant types,
//! absent wide variants) are never reported through this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// Two declarations map to the same fully-qualified path.
    #[error("duplicate type path `{path}`")]
    DuplicatePath { path: String },

    /// A symbolic reference names no indexed type and is not a listed exception.
    #[error("unresolved type reference `{name}` (api `{api}`) in {context}")]
    Unresolved {
        name: String,
        api: String,
        context: String,
    },

    /// A node kind outside the closed set, or a kind that cannot appear here.
    #[error("unsupported {kind} in {context}")]
    UnsupportedKind { kind: String, context: String },

    /// An interface other than the root declares no super interface, or a
    /// super reference does not name an interface.
    #[error("malformed interface `{name}`: {reason}")]
    MalformedComRoot { name: String, reason: String },

    /// A layout that the native ABI rules do not cover.
    #[error("cannot lay out `{name}`: {reason}")]
    Layout { name: String, reason: String },

    /// Re-entrant resolution of the same node.
    #[error("cycle detected while {action} `{name}`")]
    Cycle { action: &'static str, name: String },

    #[error("constant `{name}` has no literal form: {reason}")]
    InvalidConstant { name: String, reason: String },

    #[error("malformed GUID `{value}` on `{owner}`")]
    InvalidGuid { owner: String, value: String },

    /// Two emitted items share a name within one namespace.
    #[error("namespace `{namespace}` emits `{name}` more than once ({scope} namespace)")]
    DuplicateName {
        namespace: String,
        name: String,
        scope: &'static str,
    },
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
