//! The Codec: decode pipeline and canonical encoding.
//!
//! Decoding runs these stages in order:
//!
//! 1. parse (JSON or CBOR)
//! 2. validate the envelope, then every Element in parallel
//! 3. convert to the typed model
//! 4. resolve provenance defaults
//! 5. expand ids and Links, build the identity index
//! 6. resolve Links against the index and the imports
//! 7. verify `verifiedUsing` (optional)
//!
//! Each stage records [`Issue`]s. In strict mode the first stage with a
//! non-warning issue rejects the whole unit; in best-effort mode Elements
//! that failed a stage are left out and decoding continues. An envelope
//! field that fails validation is dropped, so Elements relying on it as a
//! default fail at the defaults stage.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use ciborium::value::Value;

use spdx_tu_core::transcode::lookup_field;
use spdx_tu_core::{
    canonical_encoding, fan_out, from_value, resolve_defaults, CoreError, Element, Iri,
    LicenseRegistry, MemoryLicenseRegistry, PathSegment, Payload, ResolvedElement, SchemaError,
    TypeCatalog, Validator, ELEMENT_TYPE, PAYLOAD_TYPE,
};
use spdx_tu_index::{
    collect_links, external_ids, resolve_links, ElementIndex, IndexError, InsertResult, LinkRef,
    NamespaceMap,
};
use spdx_tu_integrity::{IntegrityEngine, IntegrityReport, SignatureVerifier};

use crate::config::CodecConfig;
use crate::error::{sort_issues, CodecError, Issue, Result, Stage};
use crate::framing;

/// Name of the Payload field holding the Elements.
pub const ELEMENT_FIELD: &str = "element";

/// How far a pipeline run goes and how it treats issues.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mode {
    pub best_effort: bool,
    pub verify: bool,
}

/// The output of a decode.
#[derive(Debug)]
pub struct Decoded {
    /// The Payload as written, holding the Elements that converted.
    pub payload: Payload,
    /// The Payload's namespace and prefixes.
    pub namespaces: NamespaceMap,
    /// Resolved Elements: defaults applied, ids absolute, duplicates
    /// removed, in input order.
    pub elements: Vec<ResolvedElement>,
    /// Identity index over `elements`.
    pub index: ElementIndex,
    /// Integrity reports for Elements declaring `verifiedUsing`.
    pub integrity: Vec<IntegrityReport>,
    /// Everything found along the way, sorted by element id.
    pub issues: Vec<Issue>,
}

impl Decoded {
    /// No issues, not even warnings.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn get(&self, id: &Iri) -> Option<&ResolvedElement> {
        self.elements.iter().find(|r| r.id() == id)
    }

    /// The Payload with every Element in resolved form.
    pub fn resolved_payload(&self) -> Payload {
        let mut payload = self.payload.clone();
        payload.element = self.elements.iter().map(|r| r.element().clone()).collect();
        payload
    }
}

/// Decodes, encodes and reshapes transfer units.
///
/// Holds no mutable state; one Codec can serve any number of threads.
#[derive(Clone)]
pub struct Codec {
    catalog: Arc<TypeCatalog>,
    validator: Validator,
    integrity: IntegrityEngine,
    config: CodecConfig,
}

impl Codec {
    /// Create a Codec over `catalog`, checking license ids with `licenses`.
    pub fn new(
        catalog: Arc<TypeCatalog>,
        licenses: Arc<dyn LicenseRegistry>,
        config: CodecConfig,
    ) -> Self {
        Self {
            validator: Validator::new(catalog.clone(), licenses, config.validator.clone()),
            integrity: IntegrityEngine::new(catalog.clone()),
            catalog,
            config,
        }
    }

    /// A Codec over the built-in SPDX v3 catalog and common license ids.
    pub fn spdx_v3(config: CodecConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(TypeCatalog::spdx_v3()?),
            Arc::new(MemoryLicenseRegistry::with_common_ids()),
            config,
        ))
    }

    /// Register a signature verifier used by the integrity stage.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.integrity = self.integrity.with_verifier(verifier);
        self
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn integrity(&self) -> &IntegrityEngine {
        &self.integrity
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Encode
    // ─────────────────────────────────────────────────────────────────────────

    /// Canonical CBOR of the Payload's compact form.
    pub fn encode(&self, payload: &Payload) -> Result<Bytes> {
        Ok(Bytes::from(canonical_encoding(
            &self.catalog,
            payload,
            PAYLOAD_TYPE,
        )?))
    }

    /// Verbose JSON of the Payload.
    pub fn encode_json(&self, payload: &Payload) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(payload)
            .map_err(|e| CodecError::Core(CoreError::EncodingError(e.to_string())))
    }

    /// Canonical CBOR of one Element, as hashed by the integrity engine
    /// (but with `verifiedUsing` kept).
    pub fn encode_element(&self, element: &Element) -> Result<Bytes> {
        Ok(Bytes::from(canonical_encoding(
            &self.catalog,
            element,
            ELEMENT_TYPE,
        )?))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Decode
    // ─────────────────────────────────────────────────────────────────────────

    /// Decode one standalone Element. Always strict.
    pub fn decode_element(&self, bytes: &[u8]) -> Result<Element> {
        let value = framing::parse(bytes, self.config.framing)?;
        let errors = self.validator.validate(&value, ELEMENT_TYPE)?;
        if !errors.is_empty() {
            let element = item_id(&self.catalog, &value)?;
            let mut issues = errors
                .into_iter()
                .map(|error| Issue::Validation {
                    element: element.clone(),
                    index: None,
                    error,
                })
                .collect::<Vec<_>>();
            sort_issues(&mut issues);
            return Err(CodecError::Rejected {
                stage: Stage::Validate,
                issues,
            });
        }
        Ok(from_value(&self.catalog, &value, ELEMENT_TYPE)?)
    }

    /// Decode a transfer unit.
    pub fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        let mode = self.mode();
        let workers = self.config.workers;
        let mut issues = Vec::new();

        // 1. Parse
        let value = framing::parse(bytes, self.config.framing)?;

        // 2. Validate: envelope first, then Elements in parallel
        let envelope_errors = self
            .validator
            .validate_envelope(&value, PAYLOAD_TYPE, ELEMENT_FIELD)?;
        let invalid_fields: HashSet<String> = envelope_errors
            .iter()
            .filter_map(|e| match e.path.segments().first() {
                Some(PathSegment::Field(name)) => Some(name.clone()),
                _ => None,
            })
            .collect();
        issues.extend(envelope_errors.into_iter().map(|error| Issue::Validation {
            element: None,
            index: None,
            error,
        }));

        let (envelope, items) = split_envelope(&self.catalog, value)?;
        let reports = self.validator.validate_all(&items, ELEMENT_TYPE, workers)?;
        let rejected: HashSet<usize> = reports.iter().map(|r| r.index).collect();
        for report in reports {
            for error in report.errors {
                issues.push(Issue::Validation {
                    element: report.id.clone(),
                    index: Some(report.index),
                    error,
                });
            }
        }
        self.checkpoint(Stage::Validate, &mut issues, mode)?;

        // 3. Convert, leaving out envelope fields that failed validation
        let envelope = without_fields(&self.catalog, envelope, &invalid_fields)?;
        let mut payload = match from_value::<Payload>(&self.catalog, &envelope, PAYLOAD_TYPE) {
            Ok(payload) => payload,
            Err(error) => {
                issues.push(Issue::Conversion {
                    element: None,
                    index: None,
                    error,
                });
                Payload::default()
            }
        };
        let converted = fan_out(&items, workers, |index, item| {
            if rejected.contains(&index) {
                None
            } else {
                Some(from_value::<Element>(&self.catalog, item, ELEMENT_TYPE))
            }
        });
        for (index, result) in converted.into_iter().enumerate() {
            match result {
                None => {}
                Some(Ok(element)) => payload.element.push(element),
                Some(Err(error)) => issues.push(Issue::Conversion {
                    element: item_id(&self.catalog, &items[index])?,
                    index: Some(index),
                    error,
                }),
            }
        }
        self.checkpoint(Stage::Convert, &mut issues, mode)?;

        tracing::debug!(
            "parsed transfer unit: {} of {} elements converted",
            payload.element.len(),
            items.len()
        );
        self.run(payload, issues, mode)
    }

    /// Run stages 4 to 7 over an already typed Payload.
    pub fn resolve(&self, payload: Payload) -> Result<Decoded> {
        self.run(payload, Vec::new(), self.mode())
    }

    pub(crate) fn mode(&self) -> Mode {
        Mode {
            best_effort: self.config.best_effort,
            verify: self.config.verify_integrity,
        }
    }

    pub(crate) fn run(&self, payload: Payload, mut issues: Vec<Issue>, mode: Mode) -> Result<Decoded> {
        let workers = self.config.workers;

        // 4. Defaults
        let defaults = payload.defaults();
        let mut resolved = Vec::with_capacity(payload.element.len());
        for result in fan_out(&payload.element, workers, |_, el| resolve_defaults(el, &defaults)) {
            match result {
                Ok(r) => resolved.push(r),
                Err(e) => issues.push(Issue::MissingDefault(e)),
            }
        }
        self.checkpoint(Stage::Defaults, &mut issues, mode)?;

        // 5. Identity
        let namespaces = NamespaceMap::from_payload(&payload);
        let expanded = fan_out(&resolved, workers, |_, r| {
            let mut r = r.clone();
            r.map_ids(|iri| namespaces.expand(iri))?;
            let links = collect_links(r.element())?;
            Ok::<_, IndexError>((r, links))
        });
        let mut kept: Vec<(ResolvedElement, Vec<LinkRef>)> = Vec::with_capacity(expanded.len());
        for (original, result) in resolved.iter().zip(expanded) {
            match result {
                Ok(pair) => kept.push(pair),
                Err(error) => issues.push(Issue::Identity {
                    element: original.id().clone(),
                    error,
                }),
            }
        }
        self.checkpoint(Stage::Identity, &mut issues, mode)?;

        let index = ElementIndex::new(self.catalog.clone());
        let inserted = index.insert_all(
            kept.iter().map(|(r, _)| r.element().clone()).collect(),
            workers,
        )?;
        let (elements, links): (Vec<_>, Vec<_>) = kept
            .into_iter()
            .zip(inserted)
            .filter(|(_, result)| *result == InsertResult::Inserted)
            .map(|(pair, _)| pair)
            .unzip();

        // 6. Links
        let externals = external_ids(elements.iter().map(|r| r.element()));
        let links: Vec<LinkRef> = links.into_iter().flatten().collect();
        issues.extend(
            resolve_links(&links, &index, &externals)
                .into_iter()
                .map(Issue::Dangling),
        );

        // 7. Integrity
        let mut integrity = Vec::new();
        if mode.verify {
            let declared: Vec<&Element> = elements
                .iter()
                .map(|r| r.element())
                .filter(|el| !el.verified_using.is_empty())
                .collect();
            for report in fan_out(&declared, workers, |_, el| self.integrity.verify(el)) {
                let report = report?;
                issues.extend(report.mismatches().into_iter().map(Issue::Mismatch));
                if !report.satisfied() {
                    tracing::warn!(element = %report.element, "no integrity method verified");
                    issues.push(Issue::Unverified {
                        element: report.element.clone(),
                    });
                }
                integrity.push(report);
            }
            self.checkpoint(Stage::Integrity, &mut issues, mode)?;
        }

        sort_issues(&mut issues);
        tracing::info!(
            "decoded transfer unit: {} elements, {} issues",
            elements.len(),
            issues.len()
        );

        Ok(Decoded {
            payload,
            namespaces,
            elements,
            index,
            integrity,
            issues,
        })
    }

    /// In strict mode, reject if any non-warning issue was recorded.
    fn checkpoint(&self, stage: Stage, issues: &mut Vec<Issue>, mode: Mode) -> Result<()> {
        if mode.best_effort || issues.iter().all(Issue::is_warning) {
            return Ok(());
        }
        let mut issues = std::mem::take(issues);
        sort_issues(&mut issues);
        tracing::warn!("{} stage rejected transfer unit: {} issues", stage, issues.len());
        Err(CodecError::Rejected { stage, issues })
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("catalog", &self.catalog.package())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Separate the Element items from the rest of the envelope.
///
/// A malformed envelope has already been reported by validation; it yields
/// no items.
fn split_envelope(catalog: &TypeCatalog, value: Value) -> Result<(Value, Vec<Value>)> {
    let def = catalog.type_of(PAYLOAD_TYPE)?;
    let field = def.field_by_name(ELEMENT_FIELD).ok_or_else(|| {
        SchemaError::Malformed(format!("{} has no {} field", PAYLOAD_TYPE, ELEMENT_FIELD))
    })?;

    let Value::Map(entries) = value else {
        return Ok((Value::Map(Vec::new()), Vec::new()));
    };
    let mut rest = Vec::with_capacity(entries.len());
    let mut items = Vec::new();
    for (key, v) in entries {
        match lookup_field(def, &key) {
            Some(f) if f.ordinal == field.ordinal => {
                if let Value::Array(values) = v {
                    items = values;
                }
            }
            _ => rest.push((key, v)),
        }
    }
    Ok((Value::Map(rest), items))
}

/// Drop the named fields from a raw envelope.
fn without_fields(catalog: &TypeCatalog, value: Value, names: &HashSet<String>) -> Result<Value> {
    if names.is_empty() {
        return Ok(value);
    }
    let def = catalog.type_of(PAYLOAD_TYPE)?;
    let Value::Map(entries) = value else {
        return Ok(value);
    };
    let kept = entries
        .into_iter()
        .filter(|(key, _)| !lookup_field(def, key).is_some_and(|f| names.contains(&f.name)))
        .collect::<Vec<_>>();
    tracing::debug!(fields = ?names, "dropped invalid envelope fields");
    Ok(Value::Map(kept))
}

/// The textual id of a raw Element, if it has one.
fn item_id(catalog: &TypeCatalog, item: &Value) -> Result<Option<String>> {
    let def = catalog.type_of(ELEMENT_TYPE)?;
    let Value::Map(entries) = item else {
        return Ok(None);
    };
    Ok(entries.iter().find_map(|(k, v)| match (lookup_field(def, k), v) {
        (Some(f), Value::Text(id)) if f.options.key => Some(id.clone()),
        _ => None,
    }))
}
