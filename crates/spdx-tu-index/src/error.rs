//! Error types for identity and link resolution.

use thiserror::Error;

use spdx_tu_core::{CoreError, FieldPath, Iri};

/// Errors that can occur while resolving ids or building an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateIdError),

    #[error("cannot resolve id {token:?}: {reason}")]
    UnresolvableId { token: String, reason: String },

    #[error("element {source_id}: {path} is not an absolute IRI: {target:?}")]
    InvalidLink {
        source_id: Iri,
        path: FieldPath,
        target: String,
    },

    #[error("prefix {prefix} bound to both {existing} and {other}")]
    PrefixConflict {
        prefix: String,
        existing: Iri,
        other: Iri,
    },

    #[error("canonical encoding failed: {0}")]
    Encoding(#[from] CoreError),
}

/// An id already bound to different content.
///
/// Fatal to the whole decode or merge: ids are permanent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("id {id} is already bound to different content")]
pub struct DuplicateIdError {
    pub id: Iri,
}

/// A Link whose target is neither indexed nor covered by an ExternalMap.
///
/// Non-fatal; fetching the target is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Error)]
#[error("element {source_id}: {path} refers to {target}, which is neither present nor imported")]
pub struct DanglingReferenceWarning {
    pub source_id: Iri,
    pub path: FieldPath,
    pub target: Iri,
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
