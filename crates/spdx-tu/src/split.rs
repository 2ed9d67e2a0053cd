//! Splitting one logical document across several transfer units.
//!
//! Every unit gets a generated SpdxDocument Element describing it. Links
//! from a unit's members to Elements carried elsewhere are covered by that
//! document's `import` ExternalMaps, each pinned by a sha256 over the
//! target's canonical encoding. `documentRef` names the sibling documents.

use std::collections::{BTreeMap, BTreeSet};

use spdx_tu_core::{
    compact_defaults, Element, ElementType, ExternalMap, HashAlgorithm, Iri, Payload,
    SpdxDocument,
};

use crate::codec::{Codec, Decoded, Mode};
use crate::compress::expanded_defaults;
use crate::error::{CodecError, Result};

impl Codec {
    /// Split `payload` into one transfer unit per group of Element ids.
    ///
    /// Group ids may be written in any form the Payload's namespace table
    /// expands. Elements listed in no group are left out; they are still
    /// imported where a unit links to them.
    pub fn split(&self, payload: &Payload, groups: &[Vec<Iri>]) -> Result<Vec<Payload>> {
        let decoded = self.run(
            payload.clone(),
            Vec::new(),
            Mode {
                best_effort: false,
                verify: false,
            },
        )?;
        let namespace = decoded.namespaces.namespace().cloned().ok_or_else(|| {
            CodecError::InvalidRequest("split needs a Payload with a default namespace".into())
        })?;

        // 1. Expand group ids; the first group listing an id is its home
        let mut members: Vec<Vec<Iri>> = Vec::with_capacity(groups.len());
        let mut home: BTreeMap<Iri, usize> = BTreeMap::new();
        for (n, group) in groups.iter().enumerate() {
            let mut ids = Vec::with_capacity(group.len());
            for token in group {
                let id = decoded.namespaces.expand(token)?;
                if !decoded.index.contains(&id) {
                    return Err(CodecError::UnknownElement(id));
                }
                if !ids.contains(&id) {
                    home.entry(id.clone()).or_insert(n);
                    ids.push(id);
                }
            }
            if ids.is_empty() {
                return Err(CodecError::InvalidRequest(format!("group {} is empty", n + 1)));
            }
            members.push(ids);
        }

        let doc_ids: Vec<Iri> = (0..groups.len())
            .map(|n| Iri::new(format!("{}{}", namespace, unit_name(n))))
            .collect();
        let carried_imports = imports_of(&decoded);
        let defaults = expanded_defaults(payload, &decoded.namespaces);

        // 2. Build each unit
        let mut units = Vec::with_capacity(groups.len());
        for (n, ids) in members.iter().enumerate() {
            let in_unit: BTreeSet<&Iri> = ids.iter().collect();
            let elements: Vec<Element> = ids
                .iter()
                .filter_map(|id| decoded.get(id).map(|r| r.element().clone()))
                .collect();

            let mut imports: BTreeMap<Iri, ExternalMap> = BTreeMap::new();
            let mut referenced: BTreeSet<&Iri> = BTreeSet::new();
            for element in &elements {
                for (_, target) in element.links() {
                    if in_unit.contains(target) {
                        if *target != element.id {
                            referenced.insert(target);
                        }
                        continue;
                    }
                    if imports.contains_key(target) {
                        continue;
                    }
                    if let Some(map) = self.import_for(&decoded, target, home.get(target))? {
                        imports.insert(target.clone(), map);
                    } else if let Some(map) = carried_imports.get(target) {
                        imports.insert(target.clone(), map.clone());
                    }
                }
            }

            let mut roots: Vec<Iri> = ids
                .iter()
                .filter(|id| !referenced.contains(id))
                .cloned()
                .collect();
            if roots.is_empty() {
                roots = ids.clone();
            }

            let document = SpdxDocument {
                element: ids.clone(),
                root_element: roots,
                import: imports.into_values().collect(),
                namespace: Some(namespace.clone()),
                namespace_map: decoded.namespaces.prefixes().clone(),
                document_ref: doc_ids
                    .iter()
                    .enumerate()
                    .filter(|(m, _)| *m != n)
                    .map(|(_, id)| id.clone())
                    .collect(),
                download_location: self.location(n),
            };
            let mut doc = Element::new(doc_ids[n].clone(), ElementType::SpdxDocument(document));
            // Provenance of the first member, minus what the envelope supplies.
            if let Some(first) = ids.first().and_then(|id| decoded.get(id)) {
                let p = first.provenance();
                doc.created = Some(p.created);
                doc.creator = p.creator.clone();
                doc.spec_version = Some(p.spec_version.clone());
                doc.profile = p.profile.clone();
                doc.data_license = Some(p.data_license.clone());
            }

            let mut unit = Payload::new(
                std::iter::once(doc)
                    .chain(elements)
                    .map(|el| compact_defaults(&el, &defaults))
                    .collect(),
            );
            unit.namespace = payload.namespace.clone();
            unit.namespace_map = payload.namespace_map.clone();
            unit.set_defaults(payload.defaults());
            unit.spdx_document_id = Some(doc_ids[n].clone());
            units.push(unit);
        }

        tracing::info!(
            "split {} elements into {} transfer units",
            decoded.elements.len(),
            units.len()
        );
        Ok(units)
    }

    /// ExternalMap for a target carried by the source Payload.
    fn import_for(
        &self,
        decoded: &Decoded,
        target: &Iri,
        home: Option<&usize>,
    ) -> Result<Option<ExternalMap>> {
        let Some(resolved) = decoded.get(target) else {
            return Ok(None);
        };
        let method = self
            .integrity()
            .hash_method(resolved.element(), &[HashAlgorithm::Sha256])?;
        Ok(Some(ExternalMap {
            external_id: target.clone(),
            verified_using: vec![method],
            location_hint: home.and_then(|&n| self.location(n)),
        }))
    }

    fn location(&self, n: usize) -> Option<String> {
        self.config()
            .location_base
            .as_ref()
            .map(|base| format!("{}{}.cbor", base, unit_name(n)))
    }
}

fn unit_name(n: usize) -> String {
    format!("spdx-document-{}", n + 1)
}

/// ExternalMaps already declared by the source Payload's collections.
fn imports_of(decoded: &Decoded) -> BTreeMap<Iri, ExternalMap> {
    decoded
        .elements
        .iter()
        .filter_map(|r| r.element().element_type.as_collection())
        .flat_map(|c| c.imports().iter())
        .map(|m| (m.external_id.clone(), m.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdx_tu_core::{
        IntegrityMethod, Package, ProfileIdentifier, Relationship, RelationshipType, Timestamp,
    };

    use crate::config::CodecConfig;
    use crate::error::Issue;

    fn codec() -> Codec {
        Codec::spdx_v3(CodecConfig {
            location_base: Some("https://dl.example.com/".into()),
            ..CodecConfig::default()
        })
        .unwrap()
    }

    fn source() -> Payload {
        let mut p = Payload::new(vec![
            Element::new("a", ElementType::Package(Package::default())).with_name("a"),
            Element::new("b", ElementType::Package(Package::default())).with_name("b"),
            Element::new(
                "rel",
                ElementType::Relationship(Relationship {
                    relationship_type: RelationshipType::DependsOn,
                    from: Iri::from("a"),
                    to: vec![Iri::from("b")],
                    completeness: None,
                }),
            ),
        ]);
        p.namespace = Some(Iri::from("https://example.com/doc/"));
        p.creator = vec![Iri::from("https://example.com/people/alice")];
        p.created = Some(Timestamp::parse("2024-01-01T00:00:00Z").unwrap());
        p.spec_version = Some("3.0".into());
        p.profile = vec![ProfileIdentifier::Core];
        p.data_license = Some("CC0-1.0".into());
        p
    }

    #[test]
    fn test_split_imports_cross_unit_links() {
        let codec = codec();
        let units = codec
            .split(
                &source(),
                &[vec![Iri::from("a"), Iri::from("rel")], vec![Iri::from("b")]],
            )
            .unwrap();
        assert_eq!(units.len(), 2);

        let doc = &units[0].element[0];
        let ElementType::SpdxDocument(d) = &doc.element_type else {
            panic!("expected an SpdxDocument first");
        };
        assert_eq!(doc.id.as_str(), "https://example.com/doc/spdx-document-1");
        assert_eq!(d.document_ref, vec![Iri::from("https://example.com/doc/spdx-document-2")]);
        assert_eq!(d.root_element, vec![Iri::from("https://example.com/doc/rel")]);
        assert_eq!(d.import.len(), 1);
        assert_eq!(d.import[0].external_id.as_str(), "https://example.com/doc/b");
        assert_eq!(
            d.import[0].location_hint.as_deref(),
            Some("https://dl.example.com/spdx-document-2.cbor")
        );

        // the import pins b's canonical encoding
        let source = codec.resolve(source()).unwrap();
        let b = source.get(&Iri::from("https://example.com/doc/b")).unwrap();
        let input = codec.integrity().canonical_input(b.element()).unwrap();
        let report = codec.integrity().verify_external(&d.import[0], &input).unwrap();
        assert!(report.satisfied());
        assert!(matches!(d.import[0].verified_using[0], IntegrityMethod::Hash(_)));
    }

    #[test]
    fn test_units_decode_without_dangling_links() {
        let codec = codec();
        let units = codec
            .split(
                &source(),
                &[vec![Iri::from("a"), Iri::from("rel")], vec![Iri::from("b")]],
            )
            .unwrap();
        for unit in &units {
            let decoded = codec.decode(&codec.encode(unit).unwrap()).unwrap();
            // only the creator, which no unit carries
            assert!(decoded.issues.iter().all(|i| match i {
                Issue::Dangling(w) => w.target.as_str() == "https://example.com/people/alice",
                _ => false,
            }));
        }
    }

    #[test]
    fn test_unknown_group_member() {
        assert!(matches!(
            codec().split(&source(), &[vec![Iri::from("nope")]]),
            Err(CodecError::UnknownElement(_))
        ));
    }
}
