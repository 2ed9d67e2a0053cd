//! Proptest generators for property-based testing.
//!
//! Everything generated here is valid against the built-in catalog.

use chrono::DateTime;
use proptest::prelude::*;

use spdx_tu_core::{
    Annotation, AnnotationType, Element, ElementType, HashAlgorithm, IntegrityMethod, Iri,
    Package, Payload, ProfileIdentifier, Relationship, RelationshipCompleteness,
    RelationshipType, Timestamp,
};

use crate::fixtures::{EX, NAMESPACE};

/// A bare local id.
pub fn local_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}".prop_map(String::from)
}

/// An id in one of the three written forms.
pub fn id_token() -> impl Strategy<Value = Iri> {
    prop_oneof![
        local_id().prop_map(Iri::new),
        local_id().prop_map(|l| Iri::new(format!("ex:{}", l))),
        local_id().prop_map(|l| Iri::new(format!("{}{}", EX, l))),
    ]
}

/// Whole seconds between 1970 and 2100.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (0i64..4_102_444_800).prop_filter_map("representable", |secs| {
        DateTime::from_timestamp(secs, 0).map(Timestamp)
    })
}

pub fn relationship_type() -> impl Strategy<Value = RelationshipType> {
    prop_oneof![
        Just(RelationshipType::Describes),
        Just(RelationshipType::Contains),
        Just(RelationshipType::DependsOn),
        Just(RelationshipType::Generates),
        Just(RelationshipType::CopyOf),
    ]
}

pub fn completeness() -> impl Strategy<Value = Option<RelationshipCompleteness>> {
    prop_oneof![
        Just(None),
        Just(Some(RelationshipCompleteness::Complete)),
        Just(Some(RelationshipCompleteness::Incomplete)),
        Just(Some(RelationshipCompleteness::Unknown)),
    ]
}

/// A sha256 `hash` method with random digest bytes.
pub fn sha256_method() -> impl Strategy<Value = IntegrityMethod> {
    prop::collection::vec(any::<u8>(), 32)
        .prop_map(|d| IntegrityMethod::hash(HashAlgorithm::Sha256, d))
}

pub fn element_type() -> impl Strategy<Value = ElementType> {
    prop_oneof![
        (
            prop::option::of("[0-9]\\.[0-9]{1,2}\\.[0-9]"),
            prop::option::of(Just("https://example.com/download.tgz".to_string())),
        )
            .prop_map(|(package_version, download_location)| {
                ElementType::Package(Package {
                    package_version,
                    download_location,
                    ..Package::default()
                })
            }),
        (
            relationship_type(),
            id_token(),
            prop::collection::vec(id_token(), 1..4),
            completeness(),
        )
            .prop_map(|(relationship_type, from, to, completeness)| {
                ElementType::Relationship(Relationship {
                    relationship_type,
                    from,
                    to,
                    completeness,
                })
            }),
        (id_token(), prop::option::of("[ -~]{0,40}")).prop_map(|(subject, statement)| {
            ElementType::Annotation(Annotation {
                annotation_type: AnnotationType::Review,
                subject,
                statement,
            })
        }),
    ]
}

/// An Element with an arbitrary written id.
pub fn element() -> impl Strategy<Value = Element> {
    (
        id_token(),
        element_type(),
        prop::option::of("[ -~]{0,40}"),
        prop::option::of(timestamp()),
    )
        .prop_map(|(id, element_type, name, created)| {
            let mut element = Element::new(id, element_type);
            element.name = name;
            element.created = created;
            element
        })
}

/// A Package declaring a sha256 digest, which need not match.
pub fn hashed_package() -> impl Strategy<Value = Element> {
    (local_id(), sha256_method()).prop_map(|(id, method)| {
        Element::new(id, ElementType::Package(Package::default())).with_verified_using(method)
    })
}

/// A Payload of distinct Elements with a full set of defaults.
pub fn payload(max_elements: usize) -> impl Strategy<Value = Payload> {
    (
        prop::collection::vec(element(), 1..=max_elements.max(1)),
        timestamp(),
    )
        .prop_map(|(elements, created)| {
            let elements = elements
                .into_iter()
                .enumerate()
                .map(|(i, mut e)| {
                    e.id = Iri::new(format!("{}-{}", e.id, i));
                    e
                })
                .collect();
            let mut p = Payload::new(elements);
            p.namespace = Some(Iri::from(NAMESPACE));
            p.namespace_map.insert("ex".into(), Iri::from(EX));
            p.creator = vec![Iri::from("ex:alice")];
            p.created = Some(created);
            p.spec_version = Some("3.0".into());
            p.profile = vec![ProfileIdentifier::Core];
            p.data_license = Some("CC0-1.0".into());
            p
        })
}
