//! Error types for the integrity engine.

use thiserror::Error;

use spdx_tu_core::{CoreError, HashAlgorithm, Iri};

/// Errors that stop a digest from being computed.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("{0} is not a package verification code algorithm")]
    Unsupported(HashAlgorithm),

    #[error("digest backend failed: {0}")]
    Backend(String),

    #[error("canonical encoding failed: {0}")]
    Encoding(#[from] CoreError),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature bytes")]
    InvalidSignature,
}

/// A declared digest that does not match the recomputed one.
///
/// Reported per algorithm; whether the Element as a whole passes is decided
/// by [`crate::IntegrityReport::satisfied`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("element {element}: {algorithm} mismatch (declared {declared}, computed {computed})")]
pub struct IntegrityMismatchError {
    pub element: Iri,
    pub algorithm: HashAlgorithm,
    pub declared: String,
    pub computed: String,
}

/// Result type for integrity operations.
pub type Result<T> = std::result::Result<T, IntegrityError>;
