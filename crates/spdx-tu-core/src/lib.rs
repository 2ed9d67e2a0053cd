//! # SPDX Transfer Unit Core
//!
//! Pure primitives for SPDX v3 transfer units: the type catalog, validation,
//! canonical encoding and the typed Element model.
//!
//! This crate contains no I/O and no networking.
//!
//! ## Key Types
//!
//! - [`TypeCatalog`] - Immutable registry of declared types
//! - [`Validator`] - Structural checks over raw value trees
//! - [`Element`] - The atomic graph node
//! - [`Payload`] - A transfer unit: Elements plus default provenance
//!
//! ## Forms
//!
//! Every value has a verbose form (field names, enumerant names, hex
//! binaries) and a compact form (ordinals, codes, byte strings). The compact
//! form, encoded as deterministic CBOR, is the canonical encoding. See
//! [`canonical`] and [`transcode`].

pub mod canonical;
pub mod catalog;
pub mod defaults;
pub mod element;
pub mod error;
pub mod iri;
pub mod license;
pub mod parallel;
pub mod path;
pub mod payload;
pub mod transcode;
pub mod types;
pub mod validate;

pub use canonical::{canonical_bytes, decode_value, is_canonical};
pub use catalog::{BaseType, FieldDef, Format, TypeCatalog, TypeDef, TypeOptions};
pub use defaults::{
    compact_defaults, resolve_defaults, DefaultField, PayloadDefaults, Provenance, ResolvedElement,
};
pub use element::{
    Annotation, AnnotationType, Collection, Element, ElementKind, ElementType, File, IdentityInfo,
    IsArtifact, IsCollection, IsIdentity, License, Package, PositiveRange, Relationship,
    RelationshipCompleteness, RelationshipType, Snippet, SpdxDocument,
};
pub use error::{
    CoreError, MissingRequiredDefaultError, Result, SchemaError, ValidationError, ViolationKind,
};
pub use iri::Iri;
pub use license::{LicenseRegistry, MemoryLicenseRegistry};
pub use parallel::fan_out;
pub use path::{FieldPath, PathSegment};
pub use payload::Payload;
pub use transcode::{canonical_encoding, compact_value, from_value, to_compact, to_verbose};
pub use types::{
    ExternalIdentifier, ExternalIdentifierType, ExternalMap, ExternalReference,
    ExternalReferenceType, HashAlgorithm, HashValues, HexBytes, IntegrityMethod,
    ProfileIdentifier, SignatureInfo, Timestamp,
};
pub use validate::{ItemReport, Validator, ValidatorConfig};

/// Catalog type name of an Element.
pub const ELEMENT_TYPE: &str = "Element";

/// Catalog type name of a Payload.
pub const PAYLOAD_TYPE: &str = "Payload";
