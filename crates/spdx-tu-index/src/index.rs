//! Identity index: id → Element, write-once.
//!
//! Content identity is the canonical byte encoding of the resolved Element.
//! The first Element bound to an id wins; an identical later insert is a
//! no-op and a different one is a [`DuplicateIdError`].

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use spdx_tu_core::{canonical_encoding, fan_out, Element, Iri, TypeCatalog, ELEMENT_TYPE};

use crate::error::{DuplicateIdError, Result};

/// Result of inserting an Element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Element was inserted.
    Inserted,
    /// The same content is already bound to this id (idempotent).
    AlreadyExists,
    /// Different content is already bound to this id.
    Conflict {
        /// Canonical encoding of the content already bound.
        existing: Vec<u8>,
    },
}

struct Indexed {
    element: Element,
    canonical: Vec<u8>,
}

/// Thread-safe map from absolute id to Element.
pub struct ElementIndex {
    catalog: Arc<TypeCatalog>,
    inner: RwLock<BTreeMap<Iri, Indexed>>,
}

impl ElementIndex {
    /// Create an empty index.
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Bind `element.id` unless already bound. Never fails on conflicts;
    /// see [`InsertResult`].
    pub fn try_insert(&self, element: Element) -> Result<InsertResult> {
        let canonical = canonical_encoding(&self.catalog, &element, ELEMENT_TYPE)?;
        Ok(self.insert_encoded(element, canonical))
    }

    /// Bind `element.id`. A conflicting binding is a [`DuplicateIdError`].
    pub fn insert(&self, element: Element) -> Result<InsertResult> {
        let id = element.id.clone();
        match self.try_insert(element)? {
            InsertResult::Conflict { .. } => Err(DuplicateIdError { id }.into()),
            other => Ok(other),
        }
    }

    /// Insert many Elements, encoding them on up to `workers` threads.
    ///
    /// Bindings happen in input order, so the first occurrence of an id
    /// wins regardless of thread scheduling.
    pub fn insert_all(&self, elements: Vec<Element>, workers: usize) -> Result<Vec<InsertResult>> {
        let encoded = fan_out(&elements, workers, |_, el| {
            canonical_encoding(&self.catalog, el, ELEMENT_TYPE)
        });

        let mut results = Vec::with_capacity(elements.len());
        for (element, canonical) in elements.into_iter().zip(encoded) {
            let id = element.id.clone();
            match self.insert_encoded(element, canonical?) {
                InsertResult::Conflict { .. } => return Err(DuplicateIdError { id }.into()),
                other => results.push(other),
            }
        }
        Ok(results)
    }

    fn insert_encoded(&self, element: Element, canonical: Vec<u8>) -> InsertResult {
        let mut inner = self.write();

        if let Some(existing) = inner.get(&element.id) {
            if existing.canonical == canonical {
                tracing::debug!(id = %element.id, "identical element already indexed");
                return InsertResult::AlreadyExists;
            }
            tracing::warn!(id = %element.id, "id already bound to different content");
            return InsertResult::Conflict {
                existing: existing.canonical.clone(),
            };
        }

        inner.insert(element.id.clone(), Indexed { element, canonical });
        InsertResult::Inserted
    }

    pub fn get(&self, id: &Iri) -> Option<Element> {
        self.read().get(id).map(|e| e.element.clone())
    }

    /// Canonical encoding of the Element bound to `id`.
    pub fn canonical(&self, id: &Iri) -> Option<Vec<u8>> {
        self.read().get(id).map(|e| e.canonical.clone())
    }

    pub fn contains(&self, id: &Iri) -> bool {
        self.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<Iri> {
        self.read().keys().cloned().collect()
    }

    /// All Elements, sorted by id.
    pub fn elements(&self) -> Vec<Element> {
        self.read().values().map(|e| e.element.clone()).collect()
    }

    /// Insert every Element of `other` under the same rule.
    pub fn merge_from(&self, other: &ElementIndex) -> Result<()> {
        // Snapshot first: `other` may be `self`.
        let entries: Vec<(Element, Vec<u8>)> = other
            .read()
            .values()
            .map(|e| (e.element.clone(), e.canonical.clone()))
            .collect();

        for (element, canonical) in entries {
            let id = element.id.clone();
            if let InsertResult::Conflict { .. } = self.insert_encoded(element, canonical) {
                return Err(DuplicateIdError { id }.into());
            }
        }
        Ok(())
    }

    // A poisoned map is never half-written.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Iri, Indexed>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Iri, Indexed>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ElementIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementIndex")
            .field("len", &self.len())
            .finish()
    }
}

/// Combine indices in order into a new one.
pub fn merge_indices<'a>(
    catalog: Arc<TypeCatalog>,
    indices: impl IntoIterator<Item = &'a ElementIndex>,
) -> Result<ElementIndex> {
    let merged = ElementIndex::new(catalog);
    for index in indices {
        merged.merge_from(index)?;
    }
    Ok(merged)
}
