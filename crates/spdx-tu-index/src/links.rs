//! Two-phase link resolution.
//!
//! Phase one ([`collect_links`]) runs per Element while decoding and only
//! checks that every Link is an absolute IRI. Phase two ([`resolve_links`])
//! runs once the whole index is built and reports targets that are neither
//! indexed nor covered by an ExternalMap.

use std::collections::BTreeSet;

use spdx_tu_core::{Element, ElementType, FieldPath, Iri};

use crate::error::{DanglingReferenceWarning, IndexError, Result};
use crate::index::ElementIndex;

/// One Link held by an Element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkRef {
    pub source_id: Iri,
    pub path: FieldPath,
    pub target: Iri,
}

/// Every Link of an (expanded) Element, syntax-checked.
pub fn collect_links(element: &Element) -> Result<Vec<LinkRef>> {
    element
        .links()
        .into_iter()
        .map(|(path, target)| {
            if !target.is_absolute() {
                return Err(IndexError::InvalidLink {
                    source_id: element.id.clone(),
                    path,
                    target: target.to_string(),
                });
            }
            Ok(LinkRef {
                source_id: element.id.clone(),
                path,
                target: target.clone(),
            })
        })
        .collect()
}

/// Ids covered by the ExternalMaps of every collection in `elements`, plus
/// the documents named in SpdxDocument `documentRef`s.
pub fn external_ids<'a>(elements: impl IntoIterator<Item = &'a Element>) -> BTreeSet<Iri> {
    let mut out = BTreeSet::new();
    for el in elements {
        if let Some(c) = el.element_type.as_collection() {
            out.extend(c.imports().iter().map(|m| m.external_id.clone()));
        }
        if let ElementType::SpdxDocument(doc) = &el.element_type {
            out.extend(doc.document_ref.iter().cloned());
        }
    }
    out
}

/// Links whose target is neither in `index` nor in `externals`, sorted.
pub fn resolve_links(
    links: &[LinkRef],
    index: &ElementIndex,
    externals: &BTreeSet<Iri>,
) -> Vec<DanglingReferenceWarning> {
    let mut dangling: Vec<_> = links
        .iter()
        .filter(|link| !externals.contains(&link.target) && !index.contains(&link.target))
        .map(|link| DanglingReferenceWarning {
            source_id: link.source_id.clone(),
            path: link.path.clone(),
            target: link.target.clone(),
        })
        .collect();
    dangling.sort();

    for warning in &dangling {
        tracing::debug!(
            source = %warning.source_id,
            path = %warning.path,
            target = %warning.target,
            "dangling link"
        );
    }
    dangling
}
