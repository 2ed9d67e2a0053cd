//! # SPDX Transfer Unit
//!
//! The unified API for SPDX v3 transfer units: Payloads of Elements sharing
//! a namespace table and default provenance.
//!
//! ## Overview
//!
//! The [`Codec`] turns bytes into resolved Elements and back:
//!
//! - **Decode**: JSON or CBOR, validated against the type catalog, with
//!   provenance defaults applied, ids made absolute and Links resolved
//! - **Encode**: canonical CBOR of the compact form, or verbose JSON
//! - **Reshape**: merge units, split one across several, cut one out of a
//!   pool of Elements, compress
//! - **Check**: lint a unit without rejecting it
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spdx_tu::{Codec, CodecConfig};
//!
//! fn example(bytes: &[u8]) -> spdx_tu::Result<()> {
//!     let codec = Codec::spdx_v3(CodecConfig::default())?;
//!     let decoded = codec.decode(bytes)?;
//!     for element in &decoded.elements {
//!         println!("{} created {}", element.id(), element.provenance().created);
//!     }
//!     for issue in &decoded.issues {
//!         println!("warning: {}", issue);
//!     }
//!
//!     // Same bytes for the same content.
//!     let canonical = codec.encode(&decoded.payload)?;
//!     assert_eq!(codec.encode(&codec.decode(&canonical)?.payload)?, canonical);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `spdx_tu::core` - Catalog, validator, Element model, canonical encoding
//! - `spdx_tu::index` - Namespace table, identity index, Link resolution
//! - `spdx_tu::integrity` - Digests and signature verification

pub mod check;
pub mod codec;
pub mod compress;
pub mod config;
pub mod documents;
pub mod error;
pub mod framing;
pub mod merge;
pub mod split;

// Re-export component crates
pub use spdx_tu_core as core;
pub use spdx_tu_index as index;
pub use spdx_tu_integrity as integrity;

pub use check::CheckReport;
pub use codec::{Codec, Decoded, ELEMENT_FIELD};
pub use config::{CodecConfig, Framing};
pub use documents::{closure, payloads_from_documents, DocumentPayloads, MakeRequest};
pub use error::{CodecError, Issue, Result, Stage};

// Re-export commonly used core types
pub use spdx_tu_core::{
    Element, ElementType, Iri, Payload, ResolvedElement, Timestamp, TypeCatalog, Validator,
};
pub use spdx_tu_index::{DanglingReferenceWarning, DuplicateIdError, NamespaceMap};
pub use spdx_tu_integrity::{IntegrityMismatchError, IntegrityReport};
