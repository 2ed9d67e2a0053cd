//! Merging transfer units.

use std::collections::HashSet;

use spdx_tu_core::Payload;
use spdx_tu_index::{merge_indices, NamespaceMap};

use crate::codec::{Codec, Mode};
use crate::error::{CodecError, Result};

impl Codec {
    /// Merge Payloads into one.
    ///
    /// Each input is resolved strictly under its own namespace table, then
    /// all Elements go through one identity index: an id seen again with
    /// identical content is kept once, with different content it is a
    /// `DuplicateIdError`. Prefix tables are unioned and a prefix bound to
    /// two IRIs is an error. The first Payload's namespace and provenance
    /// become the envelope; Elements are written fully resolved.
    pub fn merge(&self, payloads: &[Payload]) -> Result<Payload> {
        let Some(first) = payloads.first() else {
            return Err(CodecError::InvalidRequest("nothing to merge".into()));
        };
        let mode = Mode {
            best_effort: false,
            verify: false,
        };

        let mut namespaces = NamespaceMap::default();
        let mut decoded = Vec::with_capacity(payloads.len());
        for payload in payloads {
            namespaces.merge(&NamespaceMap::from_payload(payload))?;
            decoded.push(self.run(payload.clone(), Vec::new(), mode)?);
        }

        let index = merge_indices(self.catalog().clone(), decoded.iter().map(|d| &d.index))?;

        let mut seen = HashSet::new();
        let element: Vec<_> = decoded
            .iter()
            .flat_map(|d| d.elements.iter())
            .filter(|r| seen.insert(r.id().clone()))
            .map(|r| r.element().clone())
            .collect();
        debug_assert_eq!(element.len(), index.len());

        tracing::info!(
            "merged {} transfer units into {} elements",
            payloads.len(),
            element.len()
        );

        let mut merged = Payload::new(element);
        merged.namespace = namespaces.namespace().cloned();
        merged.namespace_map = namespaces.prefixes().clone();
        merged.set_defaults(first.defaults());
        Ok(merged)
    }
}
