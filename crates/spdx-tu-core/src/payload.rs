//! Payloads: per-transfer envelopes around a set of Elements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::defaults::PayloadDefaults;
use crate::element::Element;
use crate::iri::Iri;
use crate::types::{ProfileIdentifier, Timestamp};

/// A transfer unit.
///
/// Provenance fields are defaults for Elements that omit them. A Payload has
/// no identity of its own; it is a snapshot over a subset of Elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Iri>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespace_map: BTreeMap<String, Iri>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creator: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<ProfileIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_license: Option<String>,

    #[serde(default)]
    pub element: Vec<Element>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spdx_document_id: Option<Iri>,
}

impl Payload {
    /// A Payload with no envelope fields set.
    pub fn new(element: Vec<Element>) -> Self {
        Self {
            element,
            ..Default::default()
        }
    }

    /// Provenance values cascaded onto Elements.
    pub fn defaults(&self) -> PayloadDefaults {
        PayloadDefaults {
            created: self.created,
            creator: self.creator.clone(),
            spec_version: self.spec_version.clone(),
            profile: self.profile.clone(),
            data_license: self.data_license.clone(),
        }
    }

    /// Replace the envelope provenance.
    pub fn set_defaults(&mut self, defaults: PayloadDefaults) {
        self.created = defaults.created;
        self.creator = defaults.creator;
        self.spec_version = defaults.spec_version;
        self.profile = defaults.profile;
        self.data_license = defaults.data_license;
    }

    pub fn get(&self, id: &Iri) -> Option<&Element> {
        self.element.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element.is_empty()
    }
}
