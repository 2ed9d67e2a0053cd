//! Lint checks over a transfer unit.

use std::collections::{BTreeSet, HashSet};

use spdx_tu_core::{Iri, Payload, PathSegment, Timestamp};
use spdx_tu_index::{collect_links, DanglingReferenceWarning, LinkRef};

use crate::codec::{Codec, Mode};
use crate::error::{Issue, Result};

/// Findings of [`Codec::check`].
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Elements created after the Payload itself.
    pub late: Vec<(Iri, Timestamp)>,
    /// Links into neither the unit nor its imports or document refs.
    pub uncovered: Vec<DanglingReferenceWarning>,
    /// Element ids under neither the namespace nor any declared prefix.
    pub outside_namespace: Vec<Iri>,
    /// Repeated entries in an IRI list, one per repeat.
    pub duplicate_links: Vec<LinkRef>,
    /// Elements no other Element of the unit links to.
    pub roots: Vec<Iri>,
    /// Every other issue a best-effort decode reported.
    pub issues: Vec<Issue>,
}

impl CheckReport {
    /// Nothing to report apart from the roots.
    pub fn is_clean(&self) -> bool {
        self.late.is_empty()
            && self.uncovered.is_empty()
            && self.outside_namespace.is_empty()
            && self.duplicate_links.is_empty()
            && self.issues.is_empty()
    }
}

impl Codec {
    /// Check `payload` without rejecting it.
    pub fn check(&self, payload: &Payload) -> Result<CheckReport> {
        let decoded = self.run(
            payload.clone(),
            Vec::new(),
            Mode {
                best_effort: true,
                verify: self.config().verify_integrity,
            },
        )?;
        let mut report = CheckReport::default();

        for issue in decoded.issues {
            match issue {
                Issue::Dangling(w) => report.uncovered.push(w),
                other => report.issues.push(other),
            }
        }

        let referenced: HashSet<Iri> = decoded
            .elements
            .iter()
            .flat_map(|r| {
                let element = r.element();
                element
                    .links()
                    .into_iter()
                    .filter(|(_, target)| **target != element.id)
                    .map(|(_, target)| target.clone())
                    .collect::<Vec<_>>()
            })
            .collect();

        for resolved in &decoded.elements {
            let id = resolved.id();
            if let Some(created) = payload.created {
                if resolved.provenance().created > created {
                    report.late.push((id.clone(), resolved.provenance().created));
                }
            }
            if !decoded.namespaces.covers(id) {
                report.outside_namespace.push(id.clone());
            }
            if !referenced.contains(id) {
                report.roots.push(id.clone());
            }
            report
                .duplicate_links
                .extend(repeated(collect_links(resolved.element())?));
        }

        tracing::info!(
            "checked transfer unit: {} late, {} uncovered, {} outside namespace, {} duplicate links",
            report.late.len(),
            report.uncovered.len(),
            report.outside_namespace.len(),
            report.duplicate_links.len()
        );
        Ok(report)
    }
}

/// Links repeating an earlier entry of the same IRI list.
fn repeated(links: Vec<LinkRef>) -> Vec<LinkRef> {
    let mut seen = BTreeSet::new();
    links
        .into_iter()
        .filter(|link| {
            let list = match link.path.last() {
                Some(PathSegment::Index(_)) => link.path.parent(),
                _ => return false,
            };
            !seen.insert((list, link.target.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdx_tu_core::{
        Element, ElementType, Package, ProfileIdentifier, Relationship, RelationshipType,
    };

    use crate::config::CodecConfig;

    fn payload() -> Payload {
        let mut p = Payload::new(vec![
            Element::new("a", ElementType::Package(Package::default())),
            Element::new("b", ElementType::Package(Package::default()))
                .with_created(Timestamp::parse("2025-01-01T00:00:00Z").unwrap()),
            Element::new("https://elsewhere.org/c", ElementType::Package(Package::default())),
            Element::new(
                "rel",
                ElementType::Relationship(Relationship {
                    relationship_type: RelationshipType::Contains,
                    from: Iri::from("a"),
                    to: vec![Iri::from("b"), Iri::from("b"), Iri::from("missing")],
                    completeness: None,
                }),
            ),
        ]);
        p.namespace = Some(Iri::from("https://example.com/doc/"));
        p.creator = vec![Iri::from("https://elsewhere.org/c")];
        p.created = Some(Timestamp::parse("2024-01-01T00:00:00Z").unwrap());
        p.spec_version = Some("3.0".into());
        p.profile = vec![ProfileIdentifier::Core];
        p.data_license = Some("CC0-1.0".into());
        p
    }

    #[test]
    fn test_check_findings() {
        let codec = Codec::spdx_v3(CodecConfig::default()).unwrap();
        let report = codec.check(&payload()).unwrap();

        let ns = |local: &str| Iri::new(format!("https://example.com/doc/{}", local));
        assert_eq!(report.late.len(), 1);
        assert_eq!(report.late[0].0, ns("b"));
        assert_eq!(report.uncovered.len(), 1);
        assert_eq!(report.uncovered[0].target, ns("missing"));
        assert_eq!(report.outside_namespace, vec![Iri::from("https://elsewhere.org/c")]);
        assert_eq!(report.duplicate_links.len(), 1);
        assert_eq!(report.duplicate_links[0].target, ns("b"));
        assert_eq!(report.roots, vec![ns("rel")]);
        assert!(report.issues.is_empty());
        assert!(!report.is_clean());
    }
}
