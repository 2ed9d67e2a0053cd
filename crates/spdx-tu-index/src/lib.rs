//! # SPDX Transfer Unit Index
//!
//! Identity and link resolution for SPDX v3 transfer units.
//!
//! ## Key Types
//!
//! - [`NamespaceMap`] - Expands id tokens to absolute IRIs and back
//! - [`ElementIndex`] - Write-once id → Element map
//! - [`LinkRef`] - A Link collected for later resolution
//!
//! ## Identity
//!
//! An id bound to content never rebinds. Re-inserting identical content is
//! idempotent; different content under a bound id is a [`DuplicateIdError`].

pub mod error;
pub mod index;
pub mod links;
pub mod namespace;

pub use error::{DanglingReferenceWarning, DuplicateIdError, IndexError, Result};
pub use index::{merge_indices, ElementIndex, InsertResult};
pub use links::{collect_links, external_ids, resolve_links, LinkRef};
pub use namespace::NamespaceMap;
