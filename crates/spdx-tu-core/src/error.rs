//! Error types for the transfer unit core.

use thiserror::Error;

use crate::defaults::DefaultField;
use crate::iri::Iri;
use crate::path::FieldPath;

/// Core errors that can occur while encoding, decoding or transcoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("transcode error at {path}: {message}")]
    Transcode { path: FieldPath, message: String },
}

/// Errors in the declarative type description or in a type lookup.
///
/// These are fatal: they indicate a broken catalog or a caller asking for a
/// type that does not exist, never bad data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown type reference: {0}")]
    UnknownType(String),

    #[error("type {0} is declared more than once")]
    DuplicateType(String),

    #[error("type {type_name}: duplicate field {field}")]
    DuplicateField { type_name: String, field: String },

    #[error("type {type_name}: unknown base type {base}")]
    InvalidBase { type_name: String, base: String },

    #[error("type {type_name}: invalid option {option:?}")]
    InvalidOption { type_name: String, option: String },

    #[error("type {type_name}: invalid pattern: {message}")]
    InvalidPattern { type_name: String, message: String },

    #[error("malformed type description: {0}")]
    Malformed(String),
}

/// A single structural violation, tagged with the path of the offending value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ViolationKind,
}

impl ValidationError {
    pub fn new(path: FieldPath, kind: ViolationKind) -> Self {
        Self { path, kind }
    }
}

/// What went wrong at a [`ValidationError`]'s path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Error)]
pub enum ViolationKind {
    #[error("expected {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("cardinality [{min}..{}] violated: found {found}", max_label(.max))]
    Cardinality {
        min: u64,
        max: Option<u64>,
        found: u64,
    },

    #[error("unknown field {0}")]
    UnknownField(String),

    #[error("key {0} given more than once")]
    RepeatedKey(String),

    #[error("choice must carry exactly one tag, found {0}")]
    ChoiceTagCount(usize),

    #[error("unknown choice tag {0}")]
    UnknownChoiceTag(String),

    #[error("undeclared enumerant {0}")]
    UndeclaredEnumerant(String),

    #[error("invalid {format}: {value:?}")]
    Format { format: &'static str, value: String },

    #[error("{value:?} does not match {pattern}")]
    Pattern { pattern: String, value: String },

    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("size {actual} outside [{}..{}]", bound_label(.min), bound_label(.max))]
    OutOfRange {
        min: Option<i64>,
        max: Option<i64>,
        actual: i64,
    },

    #[error("duplicate of item {0}")]
    Duplicate(usize),

    #[error("unknown license id {0:?}")]
    UnknownLicense(String),

    #[error("verifiedUsing is only meaningful for artifacts, not {0}")]
    IntegrityOnNonArtifact(String),
}

fn max_label(max: &Option<u64>) -> String {
    match max {
        Some(n) => n.to_string(),
        None => "*".to_string(),
    }
}

fn bound_label(bound: &Option<i64>) -> String {
    match bound {
        Some(n) => n.to_string(),
        None => "*".to_string(),
    }
}

/// An Element lacks a provenance value and the Payload supplies no default.
///
/// Fatal to the affected Element only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("element {element}: no value or payload default for {}", field_list(.missing))]
pub struct MissingRequiredDefaultError {
    pub element: Iri,
    pub missing: Vec<DefaultField>,
}

fn field_list(fields: &[DefaultField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_display() {
        let err = ValidationError::new(
            FieldPath::root().field("to"),
            ViolationKind::Cardinality {
                min: 1,
                max: None,
                found: 0,
            },
        );
        assert_eq!(err.to_string(), "to: cardinality [1..*] violated: found 0");
    }

    #[test]
    fn test_missing_default_display() {
        let err = MissingRequiredDefaultError {
            element: Iri::from("https://example.com/a"),
            missing: vec![DefaultField::Created, DefaultField::DataLicense],
        };
        assert_eq!(
            err.to_string(),
            "element https://example.com/a: no value or payload default for created, dataLicense"
        );
    }
}
