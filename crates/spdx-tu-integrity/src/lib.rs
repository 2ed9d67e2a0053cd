//! # SPDX Transfer Unit Integrity
//!
//! Multi-algorithm digests, package verification codes and signature checks
//! over the canonical encoding of resolved Elements.
//!
//! ## Policy
//!
//! An Element's `verifiedUsing` is satisfied when at least one declared
//! method matches; every mismatch is still reported per algorithm.
//! Signatures count on structural presence alone until a
//! [`SignatureVerifier`] is registered for their algorithm.

pub mod digest;
pub mod engine;
pub mod error;
pub mod signature;

pub use digest::{digest, package_verification_code};
pub use engine::{HashOutcome, IntegrityEngine, IntegrityReport, SignatureOutcome};
pub use error::{IntegrityError, IntegrityMismatchError, Result};
pub use signature::{is_present, Ed25519Verifier, Keypair, SignatureVerifier, ED25519};
