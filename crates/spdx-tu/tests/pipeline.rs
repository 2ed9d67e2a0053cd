//! Whole-pipeline scenarios: parallel determinism and reshaping transfer
//! units.

use spdx_tu::{closure, payloads_from_documents, CodecConfig, Issue, Iri, MakeRequest, Stage};
use spdx_tu_testkit::fixtures::{package, relationship, TestFixture};

fn with_workers(workers: usize) -> TestFixture {
    TestFixture::with_config(CodecConfig {
        best_effort: true,
        workers,
        ..CodecConfig::default()
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

fn rendered(issues: &[Issue]) -> Vec<String> {
    issues.iter().map(|i| format!("{:?}: {}", i.stage(), i)).collect()
}

#[test]
fn test_ten_thousand_elements_any_worker_count() {
    init_tracing();
    let single = with_workers(1);
    let bytes = single
        .codec
        .encode(&single.noisy_payload(10_000))
        .unwrap();
    let baseline = single.codec.decode(&bytes).unwrap();

    // 1 in 7 bad specVersion, 1 in 11 empty `to`
    let validation = baseline
        .issues
        .iter()
        .filter(|i| i.stage() == Stage::Validate)
        .count();
    assert!(validation > 10_000 / 7);
    assert!(!baseline.elements.is_empty());

    for workers in [2, 4, 8] {
        let decoded = with_workers(workers).codec.decode(&bytes).unwrap();
        assert_eq!(rendered(&decoded.issues), rendered(&baseline.issues), "workers={}", workers);
        assert_eq!(decoded.elements, baseline.elements, "workers={}", workers);
    }
}

#[test]
fn test_split_then_merge_restores_elements() {
    init_tracing();
    let fixture = TestFixture::with_config(CodecConfig {
        location_base: Some("https://dl.example.com/".into()),
        ..CodecConfig::default()
    });
    let codec = &fixture.codec;
    let source = fixture.payload(vec![
        package("a", "a"),
        package("b", "b"),
        package("c", "c"),
        relationship("a-b", "a", &["b"]),
        relationship("b-c", "b", &["c"]),
    ]);

    let units = codec
        .split(
            &source,
            &[
                vec![Iri::from("a"), Iri::from("a-b")],
                vec![Iri::from("b"), Iri::from("b-c")],
                vec![Iri::from("c")],
            ],
        )
        .unwrap();
    assert_eq!(units.len(), 3);

    // each unit decodes on its own; only the creator is unresolved
    for unit in &units {
        let decoded = codec.decode(&codec.encode(unit).unwrap()).unwrap();
        for issue in &decoded.issues {
            match issue {
                Issue::Dangling(w) => assert_eq!(w.target.as_str(), "https://example.com/spdx/alice"),
                other => panic!("unexpected {}", other),
            }
        }
    }

    let merged = codec.merge(&units).unwrap();
    let original = codec.resolve(source).unwrap();
    let restored = codec.resolve(merged).unwrap();
    for element in &original.elements {
        let got = restored.get(element.id()).unwrap();
        assert_eq!(got.element(), element.element());
    }
    // plus the three generated documents
    assert_eq!(restored.elements.len(), original.elements.len() + 3);
}

#[test]
fn test_make_then_check() {
    let fixture = TestFixture::new();
    let pool: Vec<_> = [
        package("a", "a"),
        package("b", "b"),
        package("unrelated", "u"),
        relationship("a-b", "a", &["b"]),
    ]
    .into_iter()
    .map(|e| fixture.resolve(e))
    .collect();

    let request = MakeRequest {
        namespace: Some(fixture.iri("")),
        include: vec![fixture.iri("a-b")],
        creation_info: Some(fixture.iri("a")),
        ..MakeRequest::default()
    };
    let unit = fixture.codec.make(&pool, &request).unwrap();
    assert_eq!(unit.element.len(), 3);
    assert_eq!(
        closure(&pool, &request.include, &[]).unwrap().len(),
        unit.element.len()
    );

    let report = fixture.codec.check(&unit).unwrap();
    assert!(report.late.is_empty());
    assert!(report.outside_namespace.is_empty());
    assert!(report.duplicate_links.is_empty());
    assert_eq!(report.roots, vec![fixture.iri("a-b")]);
    // the creator is not in the pool
    assert_eq!(report.uncovered.len(), 3);
}

#[test]
fn test_documents_of_a_split() {
    let fixture = TestFixture::new();
    let codec = &fixture.codec;
    let source = fixture.payload(vec![package("a", "a"), package("b", "b")]);
    let units = codec
        .split(&source, &[vec![Iri::from("a")], vec![Iri::from("b")]])
        .unwrap();

    let pool: Vec<_> = units
        .iter()
        .flat_map(|u| codec.resolve(u.clone()).unwrap().elements)
        .map(|r| r.into_element())
        .collect();
    let out = payloads_from_documents(&pool).unwrap();

    assert_eq!(out.payloads.len(), 2);
    // documents list their members, not themselves
    assert_eq!(out.unserialized.len(), 2);
    for payload in &out.payloads {
        assert_eq!(payload.element.len(), 1);
        codec.resolve(payload.clone()).unwrap();
    }
}
