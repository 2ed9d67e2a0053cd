//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use spdx_tu::{Codec, CodecConfig};
use spdx_tu_core::{
    Element, ElementType, Iri, Package, Payload, ProfileIdentifier, Relationship,
    RelationshipType, Timestamp,
};
use spdx_tu_integrity::{Ed25519Verifier, Keypair};

/// Default namespace of fixture Payloads.
pub const NAMESPACE: &str = "https://example.com/doc/";

/// IRI bound to the `ex` prefix in fixture Payloads.
pub const EX: &str = "https://example.com/spdx/";

/// Envelope `created` of fixture Payloads.
pub const CREATED: &str = "2024-01-01T00:00:00Z";

/// A Codec with an Ed25519 verifier and a deterministic signing key.
pub struct TestFixture {
    pub codec: Codec,
    pub keypair: Keypair,
}

impl TestFixture {
    /// Strict fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        let codec = Codec::spdx_v3(config)
            .expect("built-in catalog loads")
            .with_verifier(Arc::new(Ed25519Verifier));
        Self {
            codec,
            keypair: Keypair::from_seed(&[0x42; 32]),
        }
    }

    /// `local` under the fixture namespace.
    pub fn iri(&self, local: &str) -> Iri {
        Iri::new(format!("{}{}", NAMESPACE, local))
    }

    /// A Payload carrying `elements` with a full set of defaults.
    pub fn payload(&self, elements: Vec<Element>) -> Payload {
        let mut p = Payload::new(elements);
        p.namespace = Some(Iri::from(NAMESPACE));
        p.namespace_map.insert("ex".into(), Iri::from(EX));
        p.creator = vec![Iri::from("ex:alice")];
        p.created = Some(created());
        p.spec_version = Some("3.0".into());
        p.profile = vec![ProfileIdentifier::Core];
        p.data_license = Some("CC0-1.0".into());
        p
    }

    /// The Element as a fixture Payload resolves it.
    pub fn resolve(&self, element: Element) -> Element {
        let mut decoded = self
            .codec
            .resolve(self.payload(vec![element]))
            .expect("fixture element resolves");
        decoded.elements.remove(0).into_element()
    }

    /// Resolve `element` and sign its canonical input with the fixture key.
    pub fn signed(&self, element: Element) -> Element {
        let resolved = self.resolve(element);
        let input = self
            .codec
            .integrity()
            .canonical_input(&resolved)
            .expect("canonical encoding");
        resolved.with_verified_using(self.keypair.sign(&input))
    }

    /// A noisy Payload of `n` Elements for stress tests.
    ///
    /// Every 7th Element has an invalid `specVersion` and every 11th is a
    /// Relationship with no targets; the rest are valid Packages and
    /// Relationships.
    pub fn noisy_payload(&self, n: usize) -> Payload {
        let elements = (0..n)
            .map(|i| {
                let id = format!("el-{}", i);
                let mut element = if i % 11 == 10 {
                    relationship(&id, "el-0", &[])
                } else if i % 2 == 1 {
                    relationship(&id, &format!("el-{}", i - 1), &["el-0"])
                } else {
                    package(&id, &format!("package {}", i))
                };
                if i % 7 == 6 {
                    element.spec_version = Some("3.14159262".into());
                }
                element
            })
            .collect();
        self.payload(elements)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn created() -> Timestamp {
    Timestamp::parse(CREATED).expect("valid timestamp")
}

pub fn package(id: &str, name: &str) -> Element {
    Element::new(id, ElementType::Package(Package::default())).with_name(name)
}

pub fn relationship(id: &str, from: &str, to: &[&str]) -> Element {
    Element::new(
        id,
        ElementType::Relationship(Relationship {
            relationship_type: RelationshipType::DependsOn,
            from: Iri::from(from),
            to: to.iter().map(|t| Iri::from(*t)).collect(),
            completeness: None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_element_verifies() {
        let fixture = TestFixture::new();
        let signed = fixture.signed(package("pkg-1", "one"));
        let report = fixture.codec.integrity().verify(&signed).unwrap();
        assert!(report.satisfied());
    }

    #[test]
    fn test_fixture_payload_decodes() {
        let fixture = TestFixture::new();
        let p = fixture.payload(vec![package("a", "a"), relationship("r", "a", &["ex:b"])]);
        let decoded = fixture.codec.decode(&fixture.codec.encode(&p).unwrap()).unwrap();
        assert_eq!(decoded.elements.len(), 2);
        assert!(decoded.issues.iter().all(|i| i.is_warning()));
    }
}
