//! Integrity Engine: digests and verification of resolved Elements.
//!
//! ## Canonical digest input
//!
//! The bytes that get hashed or signed are the deterministic CBOR encoding of
//! the Element's compact form with `verifiedUsing` removed. Callers must pass
//! *resolved* Elements (defaults applied, ids absolute), otherwise two copies
//! of the same Element written in different Payloads would hash differently.

use std::collections::BTreeMap;
use std::sync::Arc;

use spdx_tu_core::{
    canonical_encoding, fan_out, Element, ExternalMap, HashAlgorithm, HexBytes, IntegrityMethod,
    Iri, TypeCatalog, ELEMENT_TYPE,
};

use crate::digest::digest;
use crate::error::{IntegrityError, IntegrityMismatchError, Result};
use crate::signature::{is_present, SignatureVerifier};

/// Outcome of checking one declared digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashOutcome {
    Match,
    Mismatch { declared: Vec<u8>, computed: Vec<u8> },
    /// Requested but not declared by the Element.
    Absent,
}

/// Outcome of checking one declared signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureOutcome {
    /// Structurally present, no verifier registered for its algorithm.
    Present,
    /// Missing algorithm, key or value.
    Malformed,
    Verified,
    Invalid,
}

/// Per-Element verification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub element: Iri,
    pub hashes: BTreeMap<HashAlgorithm, HashOutcome>,
    pub signatures: Vec<SignatureOutcome>,
}

impl IntegrityReport {
    /// At least one declared method matched.
    ///
    /// A structurally present signature counts unless a verifier is
    /// registered for its algorithm, in which case only `Verified` does.
    pub fn satisfied(&self) -> bool {
        self.hashes.values().any(|o| *o == HashOutcome::Match)
            || self
                .signatures
                .iter()
                .any(|o| matches!(o, SignatureOutcome::Present | SignatureOutcome::Verified))
    }

    /// Mismatched digests, one error per algorithm.
    pub fn mismatches(&self) -> Vec<IntegrityMismatchError> {
        self.hashes
            .iter()
            .filter_map(|(algorithm, outcome)| match outcome {
                HashOutcome::Mismatch { declared, computed } => Some(IntegrityMismatchError {
                    element: self.element.clone(),
                    algorithm: *algorithm,
                    declared: hex::encode(declared),
                    computed: hex::encode(computed),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Computes and verifies digests over the canonical encoding.
#[derive(Clone)]
pub struct IntegrityEngine {
    catalog: Arc<TypeCatalog>,
    verifiers: Vec<Arc<dyn SignatureVerifier>>,
}

impl IntegrityEngine {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            verifiers: Vec::new(),
        }
    }

    /// Register a cryptographic verifier for one signature algorithm.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifiers.push(verifier);
        self
    }

    /// Bytes that are hashed and signed for `element`.
    pub fn canonical_input(&self, element: &Element) -> Result<Vec<u8>> {
        let mut stripped = element.clone();
        stripped.verified_using.clear();
        Ok(canonical_encoding(&self.catalog, &stripped, ELEMENT_TYPE)?)
    }

    /// Digest `element` with each of `algorithms`.
    pub fn compute_digests(
        &self,
        element: &Element,
        algorithms: &[HashAlgorithm],
    ) -> Result<BTreeMap<HashAlgorithm, Vec<u8>>> {
        let input = self.canonical_input(element)?;
        algorithms
            .iter()
            .map(|&algorithm| Ok((algorithm, digest(algorithm, &input)?)))
            .collect()
    }

    /// A `hash` integrity method declaring `algorithms` for `element`.
    pub fn hash_method(&self, element: &Element, algorithms: &[HashAlgorithm]) -> Result<IntegrityMethod> {
        let digests = self.compute_digests(element, algorithms)?;
        Ok(IntegrityMethod::Hash(
            digests.into_iter().map(|(a, d)| (a, HexBytes(d))).collect(),
        ))
    }

    /// Check every declared integrity method of `element`.
    pub fn verify(&self, element: &Element) -> Result<IntegrityReport> {
        self.verify_methods(&element.id, &element.verified_using, || {
            self.canonical_input(element)
        })
    }

    /// Like [`IntegrityEngine::verify`], also reporting `required` algorithms
    /// the Element does not declare as [`HashOutcome::Absent`].
    pub fn verify_requiring(
        &self,
        element: &Element,
        required: &[HashAlgorithm],
    ) -> Result<IntegrityReport> {
        let mut report = self.verify(element)?;
        for algorithm in required {
            report
                .hashes
                .entry(*algorithm)
                .or_insert(HashOutcome::Absent);
        }
        Ok(report)
    }

    /// Check an ExternalMap entry against the target's canonical input.
    pub fn verify_external(&self, map: &ExternalMap, target_input: &[u8]) -> Result<IntegrityReport> {
        self.verify_methods(&map.external_id, &map.verified_using, || {
            Ok(target_input.to_vec())
        })
    }

    /// Digest many Elements in parallel, one job per (Element, algorithm).
    ///
    /// Errors are reported for the smallest failing (id, algorithm) pair so
    /// the result does not depend on scheduling.
    pub fn compute_all(
        &self,
        elements: &[Element],
        algorithms: &[HashAlgorithm],
        workers: usize,
    ) -> Result<BTreeMap<(Iri, HashAlgorithm), Vec<u8>>> {
        let inputs = fan_out(elements, workers, |_, element| self.canonical_input(element))
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        let jobs: Vec<(usize, HashAlgorithm)> = (0..elements.len())
            .flat_map(|i| algorithms.iter().map(move |&a| (i, a)))
            .collect();
        let digests = fan_out(&jobs, workers, |_, &(i, algorithm)| {
            digest(algorithm, &inputs[i]).map(|d| ((elements[i].id.clone(), algorithm), d))
        });

        let mut out = BTreeMap::new();
        let mut first_error: Option<((Iri, HashAlgorithm), IntegrityError)> = None;
        for (result, &(i, algorithm)) in digests.into_iter().zip(&jobs) {
            match result {
                Ok((key, d)) => {
                    out.insert(key, d);
                }
                Err(e) => {
                    let key = (elements[i].id.clone(), algorithm);
                    if first_error.as_ref().map_or(true, |(k, _)| key < *k) {
                        first_error = Some((key, e));
                    }
                }
            }
        }
        match first_error {
            Some((_, e)) => Err(e),
            None => Ok(out),
        }
    }

    fn verify_methods(
        &self,
        id: &Iri,
        methods: &[IntegrityMethod],
        input: impl FnOnce() -> Result<Vec<u8>>,
    ) -> Result<IntegrityReport> {
        let mut report = IntegrityReport {
            element: id.clone(),
            hashes: BTreeMap::new(),
            signatures: Vec::new(),
        };
        if methods.is_empty() {
            return Ok(report);
        }
        let input = input()?;

        for method in methods {
            match method {
                IntegrityMethod::Hash(values) => {
                    for (algorithm, declared) in values {
                        let outcome = check_digest(*algorithm, declared.as_bytes(), &input)?;
                        // A mismatch anywhere for an algorithm wins over a match.
                        let slot = report.hashes.entry(*algorithm).or_insert(HashOutcome::Match);
                        if *slot == HashOutcome::Match {
                            *slot = outcome;
                        }
                    }
                }
                IntegrityMethod::Signature(sig) => {
                    let outcome = if !is_present(sig) {
                        SignatureOutcome::Malformed
                    } else {
                        match self.verifiers.iter().find(|v| v.algorithm() == sig.algorithm) {
                            Some(v) => match v.verify(&input, sig.public_key.as_bytes(), sig.signature.as_bytes()) {
                                Ok(()) => SignatureOutcome::Verified,
                                Err(_) => SignatureOutcome::Invalid,
                            },
                            None => SignatureOutcome::Present,
                        }
                    };
                    report.signatures.push(outcome);
                }
            }
        }

        for mismatch in report.mismatches() {
            tracing::warn!("{}", mismatch);
        }
        Ok(report)
    }
}

fn check_digest(algorithm: HashAlgorithm, declared: &[u8], input: &[u8]) -> Result<HashOutcome> {
    let computed = digest(algorithm, input)?;
    Ok(if computed == declared {
        HashOutcome::Match
    } else {
        HashOutcome::Mismatch {
            declared: declared.to_vec(),
            computed,
        }
    })
}

impl std::fmt::Debug for IntegrityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrityEngine")
            .field(
                "verifiers",
                &self.verifiers.iter().map(|v| v.algorithm().to_string()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
