//! Namespace and prefix table: id token expansion and compression.
//!
//! An id token is one of:
//!
//! - bare local (`pkg-1`): joined to the default namespace
//! - `prefix:local` (`ex:pkg-1`): joined to the prefix's IRI
//! - absolute (`https://example.com/pkg-1`, `urn:uuid:...`): unchanged
//!
//! A scheme that is not a declared prefix means the token is absolute.

use std::collections::BTreeMap;

use spdx_tu_core::iri::is_absolute_iri;
use spdx_tu_core::{Element, Iri, Payload};

use crate::error::{IndexError, Result};

/// Default namespace plus prefix bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    namespace: Option<Iri>,
    prefixes: BTreeMap<String, Iri>,
}

impl NamespaceMap {
    pub fn new(namespace: Option<Iri>, prefixes: BTreeMap<String, Iri>) -> Self {
        Self {
            namespace,
            prefixes,
        }
    }

    /// The table declared by a Payload envelope.
    pub fn from_payload(payload: &Payload) -> Self {
        Self::new(payload.namespace.clone(), payload.namespace_map.clone())
    }

    pub fn namespace(&self) -> Option<&Iri> {
        self.namespace.as_ref()
    }

    pub fn prefixes(&self) -> &BTreeMap<String, Iri> {
        &self.prefixes
    }

    /// Bind a prefix. Rebinding to a different IRI is a conflict.
    pub fn bind(&mut self, prefix: impl Into<String>, iri: Iri) -> Result<()> {
        let prefix = prefix.into();
        match self.prefixes.get(&prefix) {
            Some(existing) if *existing != iri => Err(IndexError::PrefixConflict {
                prefix,
                existing: existing.clone(),
                other: iri,
            }),
            Some(_) => Ok(()),
            None => {
                self.prefixes.insert(prefix, iri);
                Ok(())
            }
        }
    }

    /// Union prefix bindings. The default namespace of `self` is kept.
    pub fn merge(&mut self, other: &NamespaceMap) -> Result<()> {
        for (prefix, iri) in &other.prefixes {
            self.bind(prefix.clone(), iri.clone())?;
        }
        if self.namespace.is_none() {
            self.namespace = other.namespace.clone();
        }
        Ok(())
    }

    /// Resolve an id token to an absolute IRI.
    pub fn expand(&self, token: &Iri) -> Result<Iri> {
        let text = token.as_str();
        let unresolvable = |reason: &str| IndexError::UnresolvableId {
            token: text.to_string(),
            reason: reason.to_string(),
        };

        let expanded = match scheme_of(text) {
            Some((scheme, local)) => match self.prefixes.get(scheme) {
                Some(base) => Iri::new(format!("{}{}", base, local)),
                None if is_absolute_iri(text) => return Ok(token.clone()),
                None => return Err(unresolvable("undeclared prefix")),
            },
            None => match &self.namespace {
                Some(ns) => Iri::new(format!("{}{}", ns, text)),
                None => return Err(unresolvable("bare local id without a default namespace")),
            },
        };

        if !expanded.is_absolute() {
            return Err(unresolvable("expansion is not an absolute IRI"));
        }
        Ok(expanded)
    }

    /// Shorten an absolute IRI: namespace-relative first, then the longest
    /// matching prefix. IRIs matching neither come back unchanged.
    ///
    /// `expand(compress(iri)) == iri` for every absolute `iri`.
    pub fn compress(&self, iri: &Iri) -> Iri {
        let text = iri.as_str();

        if let Some(ns) = &self.namespace {
            if let Some(local) = text.strip_prefix(ns.as_str()) {
                if !local.is_empty() && !local.contains(':') {
                    return Iri::new(local);
                }
            }
        }

        let best = self
            .prefixes
            .iter()
            .filter_map(|(prefix, base)| {
                text.strip_prefix(base.as_str())
                    .filter(|local| !local.is_empty() && !local.starts_with("//"))
                    .map(|local| (prefix, base.as_str().len(), local))
            })
            .max_by_key(|(_, len, _)| *len);

        match best {
            Some((prefix, _, local)) => Iri::new(format!("{}:{}", prefix, local)),
            None => iri.clone(),
        }
    }

    /// Copy of `element` with its id and every Link expanded.
    pub fn expand_element(&self, element: &Element) -> Result<Element> {
        let mut out = element.clone();
        out.map_ids(|iri| self.expand(iri))?;
        Ok(out)
    }

    /// Copy of `element` with its id and every Link compressed.
    pub fn compress_element(&self, element: &Element) -> Element {
        let mut out = element.clone();
        // compress cannot fail
        let _ = out.map_ids(|iri| Ok::<_, std::convert::Infallible>(self.compress(iri)));
        out
    }

    /// Whether `iri` lies under the default namespace or a declared prefix.
    pub fn covers(&self, iri: &Iri) -> bool {
        let text = iri.as_str();
        self.namespace
            .iter()
            .chain(self.prefixes.values())
            .any(|base| text.starts_with(base.as_str()))
    }
}

/// Split a token into (scheme, rest) when it starts with an RFC 3986 scheme.
fn scheme_of(token: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = token.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    Some((scheme, rest))
}
