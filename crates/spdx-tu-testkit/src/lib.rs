//! # SPDX Transfer Unit Testkit
//!
//! Testing utilities for SPDX v3 transfer units.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known-answer digests for every hash backend
//! - **Generators**: Proptest strategies for Elements and Payloads
//! - **Fixtures**: A ready Codec, signing key and Payload builders
//!
//! ## Golden Vectors
//!
//! ```rust
//! use spdx_tu_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hex) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, hex);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use spdx_tu_testkit::{generators, TestFixture};
//!
//! proptest! {
//!     #[test]
//!     fn encoding_is_stable(p in generators::payload(8)) {
//!         let codec = TestFixture::new().codec;
//!         let bytes = codec.encode(&p).unwrap();
//!         let again = codec.encode(&codec.decode(&bytes).unwrap().payload).unwrap();
//!         prop_assert_eq!(bytes, again);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use spdx_tu_testkit::fixtures::{package, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let payload = fixture.payload(vec![package("pkg-1", "one")]);
//! let decoded = fixture.codec.resolve(payload).unwrap();
//! assert_eq!(decoded.elements[0].id(), &fixture.iri("pkg-1"));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{package, relationship, TestFixture};
pub use vectors::{all_vectors, verify_all_vectors, DigestVector};
