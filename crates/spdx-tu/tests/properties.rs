//! End-to-end properties of the decode pipeline, driven through JSON and
//! CBOR bytes.

use proptest::prelude::*;

use spdx_tu::core::{HashAlgorithm, HexBytes, IntegrityMethod, SignatureInfo, ViolationKind, ELEMENT_TYPE};
use spdx_tu::integrity::{digest, SignatureOutcome};
use spdx_tu::{Codec, CodecConfig, CodecError, Issue, Iri, Stage};
use spdx_tu_testkit::fixtures::{created, package, TestFixture};
use spdx_tu_testkit::generators;

const ENVELOPE: &str = r#"
    "namespace": "https://example.com/doc/",
    "namespaceMap": {"ex": "https://example.com/spdx/"},
    "creator": ["ex:alice"],
    "created": "2024-01-01T00:00:00Z",
    "specVersion": "3.0",
    "profile": ["core"],
    "dataLicense": "CC0-1.0"
"#;

fn unit(elements: &str) -> Vec<u8> {
    format!("{{{}, \"element\": [{}]}}", ENVELOPE, elements).into_bytes()
}

fn best_effort() -> TestFixture {
    TestFixture::with_config(CodecConfig::best_effort())
}

fn validation_kinds(issues: &[Issue]) -> Vec<&ViolationKind> {
    issues
        .iter()
        .filter_map(|i| match i {
            Issue::Validation { error, .. } => Some(&error.kind),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encoding_is_stable(p in generators::payload(8)) {
        let codec = TestFixture::new().codec;
        let bytes = codec.encode(&p).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        prop_assert_eq!(&decoded.payload, &p);
        prop_assert_eq!(codec.encode(&decoded.payload).unwrap(), bytes);
    }

    #[test]
    fn element_encoding_is_stable(e in generators::element()) {
        let codec = TestFixture::new().codec;
        let bytes = codec.encode_element(&e).unwrap();
        let again = codec.encode_element(&codec.decode_element(&bytes).unwrap()).unwrap();
        prop_assert_eq!(again, bytes);
    }

    #[test]
    fn json_and_cbor_decode_alike(p in generators::payload(8)) {
        let codec = TestFixture::new().codec;
        let from_cbor = codec.decode(&codec.encode(&p).unwrap()).unwrap();
        let from_json = codec.decode(&codec.encode_json(&p).unwrap()).unwrap();
        prop_assert_eq!(from_cbor.elements, from_json.elements);
    }
}

#[test]
fn test_created_defaults_from_payload() {
    let fixture = TestFixture::new();
    let decoded = fixture
        .codec
        .decode(&unit(r#"{"id": "pkg-1", "type": {"package": {}}}"#))
        .unwrap();
    let element = &decoded.elements[0];
    assert_eq!(element.provenance().created, created());
    assert_eq!(element.element().created, Some(created()));
    assert_eq!(element.provenance().creator, vec![Iri::from("https://example.com/spdx/alice")]);
}

#[test]
fn test_duplicate_id_with_different_content() {
    let fixture = TestFixture::new();
    let err = fixture
        .codec
        .decode(&unit(
            r#"{"id": "ex:pkg-1", "type": {"package": {}}, "name": "one"},
               {"id": "ex:pkg-1", "type": {"package": {}}, "name": "uno"}"#,
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Duplicate(d) if d.id.as_str() == "https://example.com/spdx/pkg-1"
    ));

    // fatal in best-effort mode as well
    assert!(matches!(
        best_effort().codec.decode(&unit(
            r#"{"id": "ex:pkg-1", "type": {"package": {}}, "name": "one"},
               {"id": "ex:pkg-1", "type": {"package": {}}, "name": "uno"}"#,
        )),
        Err(CodecError::Duplicate(_))
    ));
}

#[test]
fn test_duplicate_id_with_identical_content() {
    let fixture = TestFixture::new();
    let decoded = fixture
        .codec
        .decode(&unit(
            r#"{"id": "ex:pkg-1", "type": {"package": {}}, "name": "one"},
               {"id": "https://example.com/spdx/pkg-1", "type": {"package": {}}, "name": "one"}"#,
        ))
        .unwrap();
    assert_eq!(decoded.elements.len(), 1);
    assert_eq!(decoded.index.len(), 1);
}

#[test]
fn test_short_sha256_digest() {
    let fixture = best_effort();
    let short = "ab".repeat(31);
    let decoded = fixture
        .codec
        .decode(&unit(&format!(
            r#"{{"id": "pkg-1", "type": {{"package": {{}}}}, "verifiedUsing": [{{"hash": {{"sha256": "{}"}}}}]}},
               {{"id": "pkg-2", "type": {{"package": {{}}}}}}"#,
            short
        )))
        .unwrap();
    assert_eq!(
        validation_kinds(&decoded.issues),
        vec![&ViolationKind::LengthMismatch {
            expected: 32,
            actual: 31
        }]
    );
    assert_eq!(decoded.elements.len(), 1);
}

#[test]
fn test_spec_version_semver() {
    let fixture = best_effort();
    let decoded = fixture
        .codec
        .decode(&unit(
            r#"{"id": "a", "type": {"package": {}}, "specVersion": "3.141592"},
               {"id": "b", "type": {"package": {}}, "specVersion": "3.14159262"}"#,
        ))
        .unwrap();
    let kinds = validation_kinds(&decoded.issues);
    assert_eq!(kinds.len(), 1);
    assert!(matches!(kinds[0], ViolationKind::Pattern { .. }));
    let rejected: Vec<_> = decoded
        .issues
        .iter()
        .filter(|i| i.stage() == Stage::Validate)
        .filter_map(Issue::element)
        .collect();
    assert_eq!(rejected, vec!["b"]);
    assert_eq!(decoded.elements[0].provenance().spec_version, "3.141592");
}

#[test]
fn test_relationship_to_cardinality() {
    let fixture = TestFixture::new();
    let ok = fixture.codec.decode(&unit(
        r#"{"id": "a", "type": {"package": {}}},
           {"id": "b", "type": {"package": {}}},
           {"id": "c", "type": {"package": {}}},
           {"id": "rel", "type": {"relationship": {"type": "contains", "from": "a", "to": ["b", "c"]}}}"#,
    ));
    assert!(ok.unwrap().issues.iter().all(Issue::is_warning));

    let err = fixture
        .codec
        .decode(&unit(
            r#"{"id": "a", "type": {"package": {}}},
               {"id": "rel", "type": {"relationship": {"type": "contains", "from": "a", "to": []}}}"#,
        ))
        .unwrap_err();
    match err {
        CodecError::Rejected { stage, issues } => {
            assert_eq!(stage, Stage::Validate);
            assert_eq!(
                validation_kinds(&issues),
                vec![&ViolationKind::Cardinality {
                    min: 1,
                    max: None,
                    found: 0
                }]
            );
            assert_eq!(issues[0].element(), Some("rel"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_undeclared_completeness_code() {
    let fixture = best_effort();
    let decoded = fixture
        .codec
        .decode(&unit(
            r#"{"id": "a", "type": {"package": {}}},
               {"id": "rel", "type": {"relationship": {"type": "contains", "from": "a", "to": ["a"], "completeness": 4}}}"#,
        ))
        .unwrap();
    assert_eq!(
        validation_kinds(&decoded.issues),
        vec![&ViolationKind::UndeclaredEnumerant("4".into())]
    );
}

#[test]
fn test_issues_sorted_by_element() {
    let fixture = best_effort();
    let decoded = fixture
        .codec
        .decode(&unit(
            r#"{"id": "z", "type": {"package": {}}, "specVersion": "x"},
               {"id": "m", "type": {"relationship": {"type": "contains", "from": "nowhere", "to": ["a"]}}},
               {"id": "a", "type": {"package": {}}, "specVersion": "y"}"#,
        ))
        .unwrap();
    let order: Vec<Option<&str>> = decoded.issues.iter().map(Issue::element).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn test_signed_element_round_trip() {
    let fixture = TestFixture::new();
    let signed = fixture.signed(package("pkg-1", "one"));
    let p = fixture.payload(vec![signed]);

    let decoded = fixture.codec.decode(&fixture.codec.encode(&p).unwrap()).unwrap();
    assert_eq!(decoded.integrity.len(), 1);
    assert!(decoded.integrity[0].satisfied());

    // tampering breaks the signature
    let mut tampered = p.clone();
    tampered.element[0].name = Some("two".into());
    let err = fixture
        .codec
        .decode(&fixture.codec.encode(&tampered).unwrap())
        .unwrap_err();
    assert!(matches!(err, CodecError::Rejected { stage: Stage::Integrity, .. }));
}

#[test]
fn test_declared_hash_mismatch_is_a_warning() {
    let fixture = best_effort();
    let codec = &fixture.codec;
    let resolved = fixture.resolve(package("pkg-1", "one"));
    let method = codec
        .integrity()
        .hash_method(&resolved, &[spdx_tu::core::HashAlgorithm::Sha256])
        .unwrap();
    let mut wrong = method.clone();
    if let spdx_tu::core::IntegrityMethod::Hash(values) = &mut wrong {
        for digest in values.values_mut() {
            digest.0[0] ^= 0xff;
        }
    }
    let p = fixture.payload(vec![resolved.with_verified_using(method).with_verified_using(wrong)]);

    let decoded = codec.decode(&codec.encode(&p).unwrap()).unwrap();
    // one method matched, so the element is verified
    assert!(decoded.integrity[0].satisfied());
    assert!(decoded.issues.iter().any(|i| matches!(i, Issue::Mismatch(_))));
    assert!(decoded.issues.iter().all(Issue::is_warning));
}

#[test]
fn test_standalone_element_rejected() {
    let fixture = TestFixture::new();
    let err = fixture
        .codec
        .decode_element(br#"{"id": "rel", "type": {"relationship": {"type": "contains", "from": "a", "to": []}}}"#)
        .unwrap_err();
    assert!(matches!(err, CodecError::Rejected { stage: Stage::Validate, .. }));
    assert_eq!(ELEMENT_TYPE, "Element");
}

#[test]
fn test_bad_envelope_field_in_best_effort() {
    let fixture = best_effort();
    let bytes = br#"{
        "namespace": "https://example.com/doc/",
        "creator": ["https://example.com/spdx/alice"],
        "created": "yesterday",
        "specVersion": "3.0",
        "profile": ["core"],
        "dataLicense": "CC0-1.0",
        "element": [
            {"id": "a", "type": {"package": {}}, "created": "2024-02-01T00:00:00Z"},
            {"id": "b", "type": {"package": {}}}
        ]
    }"#;
    let decoded = fixture.codec.decode(bytes).unwrap();

    // `a` carries its own timestamp, `b` needed the envelope's
    assert_eq!(decoded.elements.len(), 1);
    assert_eq!(decoded.elements[0].id().as_str(), "https://example.com/doc/a");
    assert!(decoded.payload.created.is_none());
    assert!(decoded
        .issues
        .iter()
        .any(|i| i.stage() == Stage::Validate && i.element().is_none()));
    assert!(decoded
        .issues
        .iter()
        .any(|i| i.stage() == Stage::Defaults && i.element() == Some("b")));

    // strict mode stops at validation
    let err = TestFixture::new().codec.decode(bytes).unwrap_err();
    assert!(matches!(err, CodecError::Rejected { stage: Stage::Validate, .. }));
}

#[test]
fn test_signature_only_package_without_verifier() {
    let fixture = TestFixture::new();
    let signature = IntegrityMethod::Signature(SignatureInfo {
        algorithm: "ed25519".into(),
        public_key: HexBytes(vec![7u8; 32]),
        signature: HexBytes(vec![9u8; 64]),
    });
    let p = fixture.payload(vec![package("pkg-1", "one").with_verified_using(signature)]);

    let codec = Codec::spdx_v3(CodecConfig::default()).unwrap();
    let decoded = codec.decode(&codec.encode(&p).unwrap()).unwrap();
    assert_eq!(decoded.elements.len(), 1);
    assert_eq!(decoded.integrity[0].signatures, vec![SignatureOutcome::Present]);
    assert!(decoded.integrity[0].satisfied());
    assert!(decoded.issues.iter().all(Issue::is_warning));

    // a registered verifier checks the bytes
    let err = fixture
        .codec
        .decode(&fixture.codec.encode(&p).unwrap())
        .unwrap_err();
    assert!(matches!(err, CodecError::Rejected { stage: Stage::Integrity, .. }));
}

#[test]
fn test_md_family_digests() {
    let hex_of = |algorithm| hex::encode(digest(algorithm, b"abc").unwrap());
    assert_eq!(hex_of(HashAlgorithm::Md2), "da853b0d3f88d99b30283a69e6ded6bb");
    assert_eq!(hex_of(HashAlgorithm::Md4), "a448017aaf21d8525fc10ae87aa6729d");
    assert_eq!(hex_of(HashAlgorithm::Md5), "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(hex_of(HashAlgorithm::Md6).len(), 32);

    // a declared md6 digest verifies through decode
    let fixture = TestFixture::new();
    let resolved = fixture.resolve(package("pkg-1", "one"));
    let method = fixture
        .codec
        .integrity()
        .hash_method(&resolved, &[HashAlgorithm::Md6])
        .unwrap();
    let p = fixture.payload(vec![resolved.with_verified_using(method)]);
    let decoded = fixture.codec.decode(&fixture.codec.encode(&p).unwrap()).unwrap();
    assert!(decoded.integrity[0].satisfied());
}

#[test]
fn test_absolute_id_with_undeclared_scheme_kept() {
    let fixture = TestFixture::new();
    let decoded = fixture
        .codec
        .decode(&unit(
            r#"{"id": "urn:example:pkg-9", "type": {"package": {}}},
               {"id": "ex:pkg-1", "type": {"package": {}}},
               {"id": "rel", "type": {"relationship": {"type": "contains", "from": "ex:pkg-1", "to": ["urn:example:pkg-9"]}}}"#,
        ))
        .unwrap();
    let ids: Vec<&str> = decoded.elements.iter().map(|e| e.id().as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "urn:example:pkg-9",
            "https://example.com/spdx/pkg-1",
            "https://example.com/doc/rel"
        ]
    );
    // the link into the urn resolves against the index
    assert!(decoded
        .issues
        .iter()
        .all(|i| !matches!(i, Issue::Dangling(w) if w.target.as_str() == "urn:example:pkg-9")));
}
