//! Error types for the Codec.

use std::fmt;

use thiserror::Error;

use spdx_tu_core::{CoreError, Iri, MissingRequiredDefaultError, SchemaError, ValidationError};
use spdx_tu_index::{DanglingReferenceWarning, DuplicateIdError, IndexError};
use spdx_tu_integrity::{IntegrityError, IntegrityMismatchError};

/// Errors that abort a Codec operation.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input bytes are neither JSON nor CBOR.
    #[error("cannot parse transfer unit: {0}")]
    Parse(String),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Duplicate(#[from] DuplicateIdError),

    #[error("encoding error: {0}")]
    Core(#[from] CoreError),

    #[error("identity error: {0}")]
    Index(IndexError),

    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// Strict mode: a stage reported issues.
    #[error("{stage} stage rejected the transfer unit with {} issue(s)", .issues.len())]
    Rejected { stage: Stage, issues: Vec<Issue> },

    #[error("no element with id {0}")]
    UnknownElement(Iri),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<IndexError> for CodecError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Duplicate(d) => CodecError::Duplicate(d),
            other => CodecError::Index(other),
        }
    }
}

/// Pipeline stage an [`Issue`] was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Validate,
    Convert,
    Defaults,
    Identity,
    Links,
    Integrity,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Validate => "validate",
            Stage::Convert => "convert",
            Stage::Defaults => "defaults",
            Stage::Identity => "identity",
            Stage::Links => "links",
            Stage::Integrity => "integrity",
        })
    }
}

/// A non-aborting problem found while decoding.
#[derive(Debug, Error)]
pub enum Issue {
    /// Structural violation. `index` is the Element's position, or `None`
    /// for the envelope.
    #[error("{}: {error}", location(.element, .index))]
    Validation {
        element: Option<String>,
        index: Option<usize>,
        error: ValidationError,
    },

    /// A value passed validation but did not map onto the data model.
    /// `index` is `None` for the envelope.
    #[error("{}: {error}", location(.element, .index))]
    Conversion {
        element: Option<String>,
        index: Option<usize>,
        error: CoreError,
    },

    #[error(transparent)]
    MissingDefault(MissingRequiredDefaultError),

    /// An id or Link could not be made absolute.
    #[error("element {element}: {error}")]
    Identity { element: Iri, error: IndexError },

    #[error(transparent)]
    Dangling(DanglingReferenceWarning),

    #[error(transparent)]
    Mismatch(IntegrityMismatchError),

    /// No declared integrity method matched. A signature counts when it is
    /// structurally present, or verified once a verifier is registered.
    #[error("element {element}: no integrity method could be verified")]
    Unverified { element: Iri },
}

impl Issue {
    pub fn stage(&self) -> Stage {
        match self {
            Issue::Validation { .. } => Stage::Validate,
            Issue::Conversion { .. } => Stage::Convert,
            Issue::MissingDefault(_) => Stage::Defaults,
            Issue::Identity { .. } => Stage::Identity,
            Issue::Dangling(_) => Stage::Links,
            Issue::Mismatch(_) | Issue::Unverified { .. } => Stage::Integrity,
        }
    }

    /// Id of the Element the issue is about, `None` for the envelope.
    pub fn element(&self) -> Option<&str> {
        match self {
            Issue::Validation { element, .. } | Issue::Conversion { element, .. } => {
                element.as_deref()
            }
            Issue::MissingDefault(e) => Some(e.element.as_str()),
            Issue::Identity { element, .. } | Issue::Unverified { element } => {
                Some(element.as_str())
            }
            Issue::Dangling(w) => Some(w.source_id.as_str()),
            Issue::Mismatch(m) => Some(m.element.as_str()),
        }
    }

    /// Warnings never reject a transfer unit, even in strict mode.
    pub fn is_warning(&self) -> bool {
        matches!(self, Issue::Dangling(_) | Issue::Mismatch(_))
    }
}

fn location(element: &Option<String>, index: &Option<usize>) -> String {
    match (element, index) {
        (Some(id), _) => format!("element {}", id),
        (None, Some(i)) => format!("element[{}]", i),
        (None, None) => "payload".to_string(),
    }
}

/// Sort issues by element id (envelope first), then by stage.
///
/// The sort is stable, so issues of one Element within one stage keep the
/// order the stage produced them in.
pub(crate) fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.element()
            .cmp(&b.element())
            .then(a.stage().cmp(&b.stage()))
    });
}

/// Result type for Codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
