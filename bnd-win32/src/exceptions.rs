//! Names the corpus leaves undefined or that need treatment regardless of
//! how they are declared.

use crate::layout::SizeInfo;
use crate::model::Scalar;

/// Platform types with no definition in the corpus, and their fixed layout.
const OPAQUE: &[(&str, SizeInfo)] = &[
    ("POINTER_TOUCH_INFO", SizeInfo::new(144, 8)),
    ("POINTER_PEN_INFO", SizeInfo::new(120, 8)),
];

/// Handles held as unsigned pointer-sized words, whatever the corpus
/// declares them as (some are declared as function pointers).
const POINTER_LIKE_WORDS: &[&str] = &["HKL", "HTASK"];

/// Constants of these types have no representation and are skipped.
const SKIPPED_CONSTANT_TYPES: &[&str] = &["PROPERTYKEY"];

/// References rendered as a plain scalar instead of their declared union.
const SCALAR_SUBSTITUTES: &[(&str, Scalar)] = &[
    ("LARGE_INTEGER", Scalar::I64),
    ("ULARGE_INTEGER", Scalar::U64),
];

/// Layout of an unresolvable but known platform type.
pub fn opaque_layout(name: &str) -> Option<SizeInfo> {
    OPAQUE.iter().find(|(n, _)| *n == name).map(|(_, info)| *info)
}

pub fn is_pointer_like_word(name: &str) -> bool {
    POINTER_LIKE_WORDS.contains(&name)
}

pub fn is_skipped_constant_type(name: &str) -> bool {
    SKIPPED_CONSTANT_TYPES.contains(&name)
}

pub fn scalar_substitute(name: &str) -> Option<Scalar> {
    SCALAR_SUBSTITUTES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, s)| *s)
}
