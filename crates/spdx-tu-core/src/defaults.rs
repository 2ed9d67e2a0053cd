//! Default Resolver: cascades Payload provenance onto Elements.
//!
//! Resolution is pure. The input Element is never modified; the result is a
//! new [`ResolvedElement`] whose provenance fields are all present.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::Element;
use crate::error::MissingRequiredDefaultError;
use crate::iri::Iri;
use crate::types::{ProfileIdentifier, Timestamp};

/// Provenance fields that are required on every Element but may be inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DefaultField {
    Created,
    Creator,
    SpecVersion,
    Profile,
    DataLicense,
}

impl DefaultField {
    pub const ALL: [DefaultField; 5] = [
        Self::Created,
        Self::Creator,
        Self::SpecVersion,
        Self::Profile,
        Self::DataLicense,
    ];

    /// Field name as written in the verbose form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Creator => "creator",
            Self::SpecVersion => "specVersion",
            Self::Profile => "profile",
            Self::DataLicense => "dataLicense",
        }
    }
}

impl fmt::Display for DefaultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload-level provenance values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayloadDefaults {
    pub created: Option<Timestamp>,
    pub creator: Vec<Iri>,
    pub spec_version: Option<String>,
    pub profile: Vec<ProfileIdentifier>,
    pub data_license: Option<String>,
}

/// Fully resolved provenance of an Element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub created: Timestamp,
    pub creator: Vec<Iri>,
    pub spec_version: String,
    pub profile: Vec<ProfileIdentifier>,
    pub data_license: String,
}

/// An Element with every provenance field filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    element: Element,
    provenance: Provenance,
    defaulted: Vec<DefaultField>,
}

impl ResolvedElement {
    pub fn id(&self) -> &Iri {
        &self.element.id
    }

    /// The Element with inherited values written into it.
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn into_element(self) -> Element {
        self.element
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Fields taken from the Payload rather than the Element itself.
    pub fn defaulted(&self) -> &[DefaultField] {
        &self.defaulted
    }

    /// Rewrite the id, every Link and the resolved creators through `f`.
    pub fn map_ids<E>(&mut self, mut f: impl FnMut(&Iri) -> Result<Iri, E>) -> Result<(), E> {
        self.element.map_ids(&mut f)?;
        self.provenance.creator = self.element.creator.clone();
        Ok(())
    }
}

/// Resolve provenance for one Element.
///
/// Each field keeps the Element's own value, else takes the Payload value.
/// Every field missing from both is reported in a single error.
pub fn resolve_defaults(
    element: &Element,
    defaults: &PayloadDefaults,
) -> Result<ResolvedElement, MissingRequiredDefaultError> {
    let mut missing = Vec::new();
    let mut defaulted = Vec::new();

    let created = pick(
        element.created,
        defaults.created,
        DefaultField::Created,
        &mut missing,
        &mut defaulted,
    );
    let creator = pick(
        non_empty(&element.creator),
        non_empty(&defaults.creator),
        DefaultField::Creator,
        &mut missing,
        &mut defaulted,
    );
    let spec_version = pick(
        element.spec_version.clone(),
        defaults.spec_version.clone(),
        DefaultField::SpecVersion,
        &mut missing,
        &mut defaulted,
    );
    let profile = pick(
        non_empty(&element.profile),
        non_empty(&defaults.profile),
        DefaultField::Profile,
        &mut missing,
        &mut defaulted,
    );
    let data_license = pick(
        element.data_license.clone(),
        defaults.data_license.clone(),
        DefaultField::DataLicense,
        &mut missing,
        &mut defaulted,
    );

    match (created, creator, spec_version, profile, data_license) {
        (Some(created), Some(creator), Some(spec_version), Some(profile), Some(data_license)) => {
            let mut resolved = element.clone();
            resolved.created = Some(created);
            resolved.creator = creator.clone();
            resolved.spec_version = Some(spec_version.clone());
            resolved.profile = profile.clone();
            resolved.data_license = Some(data_license.clone());

            Ok(ResolvedElement {
                element: resolved,
                provenance: Provenance {
                    created,
                    creator,
                    spec_version,
                    profile,
                    data_license,
                },
                defaulted,
            })
        }
        _ => Err(MissingRequiredDefaultError {
            element: element.id.clone(),
            missing,
        }),
    }
}

/// Drop provenance fields that repeat the Payload-level value.
///
/// Inverse of [`resolve_defaults`] for Elements written into that Payload.
pub fn compact_defaults(element: &Element, defaults: &PayloadDefaults) -> Element {
    let mut out = element.clone();
    if defaults.created.is_some() && out.created == defaults.created {
        out.created = None;
    }
    if !defaults.creator.is_empty() && out.creator == defaults.creator {
        out.creator.clear();
    }
    if defaults.spec_version.is_some() && out.spec_version == defaults.spec_version {
        out.spec_version = None;
    }
    if !defaults.profile.is_empty() && out.profile == defaults.profile {
        out.profile.clear();
    }
    if defaults.data_license.is_some() && out.data_license == defaults.data_license {
        out.data_license = None;
    }
    out
}

fn pick<T>(
    own: Option<T>,
    inherited: Option<T>,
    field: DefaultField,
    missing: &mut Vec<DefaultField>,
    defaulted: &mut Vec<DefaultField>,
) -> Option<T> {
    match (own, inherited) {
        (Some(v), _) => Some(v),
        (None, Some(v)) => {
            defaulted.push(field);
            Some(v)
        }
        (None, None) => {
            missing.push(field);
            None
        }
    }
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}
