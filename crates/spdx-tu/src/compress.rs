//! Compaction: the smallest equivalent Payload.

use spdx_tu_core::{compact_defaults, Payload, PayloadDefaults};
use spdx_tu_index::NamespaceMap;

use crate::codec::{Codec, Mode};
use crate::error::Result;

impl Codec {
    /// Rewrite `payload` so every Element omits provenance equal to the
    /// envelope's and every id is as short as the namespace table allows.
    ///
    /// Decoding the result gives the same resolved Elements as decoding
    /// `payload`.
    pub fn compress(&self, payload: &Payload) -> Result<Payload> {
        let decoded = self.run(
            payload.clone(),
            Vec::new(),
            Mode {
                best_effort: false,
                verify: false,
            },
        )?;
        let namespaces = &decoded.namespaces;
        let defaults = expanded_defaults(payload, namespaces);

        let mut out = Payload::new(
            decoded
                .elements
                .iter()
                .map(|r| namespaces.compress_element(&compact_defaults(r.element(), &defaults)))
                .collect(),
        );
        out.namespace = payload.namespace.clone();
        out.namespace_map = payload.namespace_map.clone();
        out.set_defaults(payload.defaults());
        out.creator = defaults.creator.iter().map(|c| namespaces.compress(c)).collect();
        out.spdx_document_id = payload
            .spdx_document_id
            .as_ref()
            .map(|id| namespaces.expand(id).map(|iri| namespaces.compress(&iri)))
            .transpose()?;

        tracing::debug!(
            "compressed transfer unit: {} elements",
            out.element.len()
        );
        Ok(out)
    }
}

/// Envelope provenance with creator ids made absolute, so it compares equal
/// to resolved Element provenance. Tokens that do not expand stay as written.
pub(crate) fn expanded_defaults(payload: &Payload, namespaces: &NamespaceMap) -> PayloadDefaults {
    let mut defaults = payload.defaults();
    defaults.creator = defaults
        .creator
        .iter()
        .map(|c| namespaces.expand(c).unwrap_or_else(|_| c.clone()))
        .collect();
    defaults
}
