//! Building transfer units from a pool of Elements.
//!
//! A pool is a flat list of resolved Elements with absolute ids, such as a
//! directory of Element files. Payloads are cut from it either by link
//! closure ([`Codec::make`]) or by the membership lists of the SpdxDocument
//! Elements it contains ([`payloads_from_documents`]).

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::Deserialize;

use spdx_tu_core::{Element, ElementType, Iri, Payload, PayloadDefaults};

use crate::codec::Codec;
use crate::error::{CodecError, Result};

/// What [`Codec::make`] should put in a transfer unit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MakeRequest {
    /// Default namespace of the Payload.
    pub namespace: Option<Iri>,
    /// Prefix bindings of the Payload.
    pub prefixes: BTreeMap<String, Iri>,
    /// Element whose provenance becomes the Payload defaults. It need not
    /// be included itself.
    pub creation_info: Option<Iri>,
    /// Starting points; everything they link to is included as well.
    pub include: Vec<Iri>,
    /// Elements never included, nor traversed.
    pub exclude: Vec<Iri>,
}

/// Elements reachable from `include` over Links, skipping `exclude`.
///
/// Link targets missing from the pool are not followed. The result is in
/// pool order.
pub fn closure(pool: &[Element], include: &[Iri], exclude: &[Iri]) -> Result<Vec<Element>> {
    let by_id: HashMap<&Iri, &Element> = pool.iter().map(|e| (&e.id, e)).collect();
    let excluded: HashSet<&Iri> = exclude.iter().collect();

    let mut reached: HashSet<&Iri> = HashSet::new();
    let mut queue: VecDeque<&Iri> = VecDeque::new();
    for id in include {
        if !by_id.contains_key(id) {
            return Err(CodecError::UnknownElement(id.clone()));
        }
        queue.push_back(id);
    }

    while let Some(id) = queue.pop_front() {
        if excluded.contains(id) || !reached.insert(id) {
            continue;
        }
        let Some(element) = by_id.get(id) else {
            continue;
        };
        for (_, target) in element.links() {
            if by_id.contains_key(target) && !reached.contains(target) {
                queue.push_back(target);
            }
        }
    }

    Ok(pool
        .iter()
        .filter(|e| reached.contains(&e.id))
        .cloned()
        .collect())
}

impl Codec {
    /// Cut a compressed transfer unit out of `pool`.
    pub fn make(&self, pool: &[Element], request: &MakeRequest) -> Result<Payload> {
        let elements = closure(pool, &request.include, &request.exclude)?;
        tracing::info!(
            "make: {} of {} pool elements reachable",
            elements.len(),
            pool.len()
        );

        let mut payload = Payload::new(elements);
        payload.namespace = request.namespace.clone();
        payload.namespace_map = request.prefixes.clone();
        if let Some(id) = &request.creation_info {
            let info = pool
                .iter()
                .find(|e| e.id == *id)
                .ok_or_else(|| CodecError::UnknownElement(id.clone()))?;
            payload.set_defaults(defaults_of(info));
        }
        self.compress(&payload)
    }
}

/// Payloads described by the SpdxDocuments of a pool.
#[derive(Debug, Clone, Default)]
pub struct DocumentPayloads {
    /// One Payload per SpdxDocument, in pool order.
    pub payloads: Vec<Payload>,
    /// Pool Elements no SpdxDocument lists, in pool order.
    pub unserialized: Vec<Iri>,
}

/// Build one Payload per SpdxDocument Element in `pool`.
///
/// Each Payload takes its namespace table from the document and its defaults
/// from the document Element's own provenance, and holds the Elements the
/// document lists. `spdxDocumentId` is set when the document lists itself.
/// Payloads are returned with absolute ids; pass them to
/// [`Codec::compress`] for the short form.
pub fn payloads_from_documents(pool: &[Element]) -> Result<DocumentPayloads> {
    let by_id: HashMap<&Iri, &Element> = pool.iter().map(|e| (&e.id, e)).collect();
    let mut used: HashSet<&Iri> = HashSet::new();
    let mut payloads = Vec::new();

    for element in pool {
        let ElementType::SpdxDocument(doc) = &element.element_type else {
            continue;
        };
        let members = doc
            .element
            .iter()
            .map(|id| {
                by_id
                    .get(id)
                    .map(|e| (*e).clone())
                    .ok_or_else(|| CodecError::UnknownElement(id.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        used.extend(doc.element.iter());

        let mut payload = Payload::new(members);
        payload.namespace = doc.namespace.clone();
        payload.namespace_map = doc.namespace_map.clone();
        payload.set_defaults(defaults_of(element));
        if doc.element.contains(&element.id) {
            payload.spdx_document_id = Some(element.id.clone());
        }
        tracing::debug!(
            document = %element.id,
            "{} elements, {} document refs",
            doc.element.len(),
            doc.document_ref.len()
        );
        payloads.push(payload);
    }

    let unserialized: Vec<Iri> = pool
        .iter()
        .filter(|e| !used.contains(&e.id))
        .map(|e| e.id.clone())
        .collect();
    if !unserialized.is_empty() {
        tracing::info!("{} pool elements in no document", unserialized.len());
    }
    Ok(DocumentPayloads {
        payloads,
        unserialized,
    })
}

/// Provenance of an Element, as Payload defaults.
fn defaults_of(element: &Element) -> PayloadDefaults {
    PayloadDefaults {
        created: element.created,
        creator: element.creator.clone(),
        spec_version: element.spec_version.clone(),
        profile: element.profile.clone(),
        data_license: element.data_license.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdx_tu_core::{
        Package, ProfileIdentifier, Relationship, RelationshipType, SpdxDocument, Timestamp,
    };

    use crate::config::CodecConfig;

    const NS: &str = "https://example.com/pool/";

    fn iri(local: &str) -> Iri {
        Iri::new(format!("{}{}", NS, local))
    }

    fn with_provenance(element: Element) -> Element {
        let mut e = element
            .with_created(Timestamp::parse("2024-01-01T00:00:00Z").unwrap())
            .with_creator(iri("alice"));
        e.spec_version = Some("3.0".into());
        e.profile = vec![ProfileIdentifier::Core];
        e.data_license = Some("CC0-1.0".into());
        e
    }

    fn package(local: &str) -> Element {
        with_provenance(Element::new(iri(local), ElementType::Package(Package::default())))
    }

    fn depends(local: &str, from: &str, to: &str) -> Element {
        with_provenance(Element::new(
            iri(local),
            ElementType::Relationship(Relationship {
                relationship_type: RelationshipType::DependsOn,
                from: iri(from),
                to: vec![iri(to)],
                completeness: None,
            }),
        ))
    }

    fn pool() -> Vec<Element> {
        vec![
            package("a"),
            package("b"),
            package("c"),
            package("lonely"),
            depends("a-b", "a", "b"),
            depends("b-c", "b", "c"),
        ]
    }

    #[test]
    fn test_closure_follows_links() {
        let pool = pool();
        let ids = |els: Vec<Element>| -> Vec<Iri> { els.into_iter().map(|e| e.id).collect() };

        let all = closure(&pool, &[iri("a-b"), iri("b-c")], &[]).unwrap();
        assert_eq!(ids(all), vec![iri("a"), iri("b"), iri("c"), iri("a-b"), iri("b-c")]);

        let cut = closure(&pool, &[iri("a-b"), iri("b-c")], &[iri("c")]).unwrap();
        assert_eq!(ids(cut), vec![iri("a"), iri("b"), iri("a-b"), iri("b-c")]);

        assert!(matches!(
            closure(&pool, &[iri("nope")], &[]),
            Err(CodecError::UnknownElement(_))
        ));
    }

    #[test]
    fn test_make_compresses() {
        let codec = Codec::spdx_v3(CodecConfig::default()).unwrap();
        let request: MakeRequest = serde_json::from_str(&format!(
            r#"{{"namespace": "{NS}", "creationInfo": "{NS}a", "include": ["{NS}a-b"]}}"#
        ))
        .unwrap();

        let payload = codec.make(&pool(), &request).unwrap();
        let ids: Vec<&str> = payload.element.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "a-b"]);
        assert!(payload.element.iter().all(|e| e.created.is_none()));
        assert_eq!(payload.creator, vec![Iri::from("alice")]);
    }

    #[test]
    fn test_payloads_from_documents() {
        let mut pool = pool();
        let doc = with_provenance(Element::new(
            iri("doc"),
            ElementType::SpdxDocument(SpdxDocument {
                element: vec![iri("doc"), iri("a"), iri("b"), iri("a-b")],
                root_element: vec![iri("a-b")],
                namespace: Some(Iri::from(NS)),
                ..SpdxDocument::default()
            }),
        ));
        pool.push(doc);

        let out = payloads_from_documents(&pool).unwrap();
        assert_eq!(out.payloads.len(), 1);
        assert_eq!(out.payloads[0].element.len(), 4);
        assert_eq!(out.payloads[0].spdx_document_id, Some(iri("doc")));
        assert_eq!(out.unserialized, vec![iri("c"), iri("lonely"), iri("b-c")]);
    }
}
