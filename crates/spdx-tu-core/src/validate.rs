//! Validator: structural, format and cardinality checks against the catalog.
//!
//! Values are raw trees ([`ciborium::Value`]) in either the verbose form
//! (names, hex text) or the compact form (ordinals, codes, byte strings).
//! Every violation is collected with the field path where it occurred; no
//! check stops its siblings from running.

use ciborium::value::Value;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use crate::canonical::canonical_bytes;
use crate::catalog::{BaseType, FieldDef, Format, TypeCatalog, TypeDef, TypeOptions};
use crate::element::ElementKind;
use crate::error::{SchemaError, ValidationError, ViolationKind};
use crate::iri::{is_absolute_iri, is_id_ref, is_locator};
use crate::license::LicenseRegistry;
use crate::parallel::fan_out;
use crate::path::FieldPath;
use crate::transcode::{key_label, lookup_field, to_compact};
use crate::types::Timestamp;

/// RFC 2822 addr-spec: dot-atom or quoted local part, hostname or
/// bracketed literal domain. Comments and folding whitespace are not accepted.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[^"\\\r\n]|\\[\x20-\x7e])*")@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*|\[[^\[\]\\\r\n]*\])$"#,
    )
    .expect("email regex is valid")
});

/// Validator policy knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Reject `verifiedUsing` on Elements that are not artifacts.
    pub integrity_requires_artifact: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            integrity_requires_artifact: true,
        }
    }
}

/// Violations found in one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// Position of the item in the batch.
    pub index: usize,
    /// Value of the item's key field, if it has a textual one.
    pub id: Option<String>,
    /// Violations, ordered by field path.
    pub errors: Vec<ValidationError>,
}

/// Checks raw values against a [`TypeCatalog`].
///
/// Stateless apart from its injected collaborators; one validator can be
/// shared by any number of threads.
#[derive(Clone)]
pub struct Validator {
    catalog: Arc<TypeCatalog>,
    licenses: Arc<dyn LicenseRegistry>,
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(
        catalog: Arc<TypeCatalog>,
        licenses: Arc<dyn LicenseRegistry>,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            catalog,
            licenses,
            config,
        }
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `value` as an instance of `type_name`.
    ///
    /// Returns every violation found. A `SchemaError` means `type_name` (or a
    /// type it references) is not in the catalog.
    pub fn validate(&self, value: &Value, type_name: &str) -> Result<Vec<ValidationError>, SchemaError> {
        self.validate_deferring(value, type_name, None)
    }

    /// Validate a Record, checking only the cardinality of `deferred`.
    ///
    /// The items of the deferred field are left to the caller, typically to
    /// be validated in parallel with [`Validator::validate_all`].
    pub fn validate_envelope(
        &self,
        value: &Value,
        type_name: &str,
        deferred: &str,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        self.validate_deferring(value, type_name, Some(deferred))
    }

    /// Validate a batch of independent items on up to `workers` threads.
    ///
    /// Only items with violations are reported, ordered by id, then by batch
    /// position. The output does not depend on `workers`.
    pub fn validate_all(
        &self,
        items: &[Value],
        type_name: &str,
        workers: usize,
    ) -> Result<Vec<ItemReport>, SchemaError> {
        let def = self.catalog.type_of(type_name)?;
        let results = fan_out(items, workers, |index, item| {
            self.validate(item, type_name).map(|mut errors| {
                errors.sort();
                ItemReport {
                    index,
                    id: key_text(def, item),
                    errors,
                }
            })
        });

        let mut reports = Vec::new();
        for report in results {
            let report = report?;
            if !report.errors.is_empty() {
                reports.push(report);
            }
        }
        reports.sort_by(|a, b| a.id.cmp(&b.id).then(a.index.cmp(&b.index)));

        tracing::debug!(
            "validated {} {} items on {} workers, {} with violations",
            items.len(),
            type_name,
            workers.max(1),
            reports.len()
        );
        Ok(reports)
    }

    fn validate_deferring(
        &self,
        value: &Value,
        type_name: &str,
        deferred: Option<&str>,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let mut walk = Walk {
            validator: self,
            deferred,
            errors: Vec::new(),
        };
        walk.check(value, type_name, &TypeOptions::default(), &FieldPath::root())?;
        Ok(walk.errors)
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("catalog", &self.catalog.package())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// One validation pass; accumulates violations.
struct Walk<'v> {
    validator: &'v Validator,
    /// Top-level field whose items are not descended into.
    deferred: Option<&'v str>,
    errors: Vec<ValidationError>,
}

impl<'v> Walk<'v> {
    fn push(&mut self, path: &FieldPath, kind: ViolationKind) {
        self.errors.push(ValidationError::new(path.clone(), kind));
    }

    fn check(
        &mut self,
        value: &Value,
        type_ref: &str,
        field_options: &TypeOptions,
        path: &FieldPath,
    ) -> Result<(), SchemaError> {
        let validator = self.validator;
        let shape = validator.catalog.resolve(type_ref)?;
        let options = shape.options().overlay(field_options);

        match (shape.base(), shape.def()) {
            (BaseType::Binary, _) => self.check_binary(value, &options, path),
            (BaseType::Boolean, _) => {
                if !matches!(value, Value::Bool(_)) {
                    self.push(path, ViolationKind::TypeMismatch { expected: "boolean" });
                }
            }
            (BaseType::Integer, _) => self.check_integer(value, &options, path),
            (BaseType::String, _) => self.check_string(value, &options, path),
            (BaseType::Enumerated, Some(def)) => self.check_enumerant(def, value, path),
            (BaseType::Record, Some(def)) => self.check_record(def, value, path)?,
            (BaseType::Map, Some(def)) => self.check_map(def, &options, value, path)?,
            (BaseType::Choice, Some(def)) => self.check_choice(def, value, path)?,
            (BaseType::MapOf, _) => self.check_map_of(type_ref, &options, value, path)?,
            (BaseType::ArrayOf, _) => self.check_array_of(type_ref, &options, value, path)?,
            (base, None) => return Err(SchemaError::UnknownType(base.to_string())),
        }
        Ok(())
    }

    // ───── Primitives ─────

    fn check_binary(&mut self, value: &Value, options: &TypeOptions, path: &FieldPath) {
        let len = match value {
            Value::Bytes(b) => b.len(),
            Value::Text(s) => match hex::decode(s) {
                Ok(b) => b.len(),
                Err(_) => {
                    self.push(
                        path,
                        ViolationKind::Format {
                            format: Format::Hex.as_str(),
                            value: s.clone(),
                        },
                    );
                    return;
                }
            },
            _ => {
                self.push(path, ViolationKind::TypeMismatch { expected: "binary" });
                return;
            }
        };
        self.check_size(len as i64, options, path);
    }

    fn check_integer(&mut self, value: &Value, options: &TypeOptions, path: &FieldPath) {
        let Value::Integer(i) = value else {
            self.push(path, ViolationKind::TypeMismatch { expected: "integer" });
            return;
        };
        let n = i128::from(*i);
        let actual = i64::try_from(n).unwrap_or(if n < 0 { i64::MIN } else { i64::MAX });
        if options.min_size.is_some_and(|min| actual < min)
            || options.max_size.is_some_and(|max| actual > max)
        {
            self.push(
                path,
                ViolationKind::OutOfRange {
                    min: options.min_size,
                    max: options.max_size,
                    actual,
                },
            );
        }
    }

    fn check_string(&mut self, value: &Value, options: &TypeOptions, path: &FieldPath) {
        let Value::Text(s) = value else {
            self.push(path, ViolationKind::TypeMismatch { expected: "string" });
            return;
        };

        if options.min_size.is_some() || options.max_size.is_some() {
            let chars = s.chars().count() as i64;
            if options.min_size.is_some_and(|min| chars < min)
                || options.max_size.is_some_and(|max| chars > max)
            {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        min: options.min_size,
                        max: options.max_size,
                        actual: chars,
                    },
                );
            }
        }

        if let Some(re) = &options.pattern {
            if !re.is_match(s) {
                self.push(
                    path,
                    ViolationKind::Pattern {
                        pattern: re.as_str().to_string(),
                        value: s.clone(),
                    },
                );
            }
        }

        if let Some(format) = options.format {
            self.check_format(format, s, path);
        }
    }

    fn check_format(&mut self, format: Format, s: &str, path: &FieldPath) {
        let ok = match format {
            Format::Iri => is_absolute_iri(s),
            Format::Uri => is_locator(s),
            Format::IdRef => is_id_ref(s),
            Format::Email => EMAIL.is_match(s),
            Format::DateTime => Timestamp::parse(s).is_ok(),
            Format::Hex => hex::decode(s).is_ok(),
            Format::LicenseId => {
                if !self.validator.licenses.contains(s) {
                    self.push(path, ViolationKind::UnknownLicense(s.to_string()));
                }
                return;
            }
        };
        if !ok {
            self.push(
                path,
                ViolationKind::Format {
                    format: format.as_str(),
                    value: s.to_string(),
                },
            );
        }
    }

    /// Byte or item counts: exact when min == max, a range otherwise.
    fn check_size(&mut self, actual: i64, options: &TypeOptions, path: &FieldPath) {
        match (options.min_size, options.max_size) {
            (Some(min), Some(max)) if min == max => {
                if actual != min {
                    self.push(
                        path,
                        ViolationKind::LengthMismatch {
                            expected: min as u64,
                            actual: actual as u64,
                        },
                    );
                }
            }
            (min, max) => {
                if min.is_some_and(|m| actual < m) || max.is_some_and(|m| actual > m) {
                    self.push(path, ViolationKind::OutOfRange { min, max, actual });
                }
            }
        }
    }

    fn check_enumerant(&mut self, def: &TypeDef, value: &Value, path: &FieldPath) {
        let declared = match value {
            Value::Text(name) => def.enumerant_by_name(name).is_some(),
            Value::Integer(code) => u64::try_from(*code)
                .ok()
                .and_then(|c| def.enumerant_by_code(c))
                .is_some(),
            _ => {
                self.push(path, ViolationKind::TypeMismatch { expected: "enumerant" });
                return;
            }
        };
        if !declared {
            self.push(path, ViolationKind::UndeclaredEnumerant(key_label(value)));
        }
    }

    // ───── Structured types ─────

    fn check_record(&mut self, def: &TypeDef, value: &Value, path: &FieldPath) -> Result<(), SchemaError> {
        let Some(entries) = self.entries(value, path) else {
            return Ok(());
        };
        let present = self.match_fields(def, entries, path);

        // 1. Declared fields: presence and values
        for field in &def.fields {
            let child = path.field(field.name.as_str());
            match present.get(&field.ordinal) {
                Some(v) => {
                    if path.is_root() && self.deferred == Some(field.name.as_str()) {
                        self.check_count(field, v, &child);
                    } else {
                        self.check_field(field, v, &child)?;
                    }
                }
                None if field.min > 0 => self.push(
                    &child,
                    ViolationKind::Cardinality {
                        min: field.min,
                        max: field.max,
                        found: 0,
                    },
                ),
                None => {}
            }
        }

        // 2. Element policy: integrity only on artifacts
        if def.name == "Element" && self.validator.config.integrity_requires_artifact {
            self.check_integrity_policy(def, &present, path);
        }
        Ok(())
    }

    fn check_map(
        &mut self,
        def: &TypeDef,
        options: &TypeOptions,
        value: &Value,
        path: &FieldPath,
    ) -> Result<(), SchemaError> {
        let Some(entries) = self.entries(value, path) else {
            return Ok(());
        };
        self.check_size(entries.len() as i64, options, path);
        let present = self.match_fields(def, entries, path);
        for field in &def.fields {
            if let Some(v) = present.get(&field.ordinal) {
                self.check_field(field, v, &path.field(field.name.as_str()))?;
            }
        }
        Ok(())
    }

    fn check_choice(&mut self, def: &TypeDef, value: &Value, path: &FieldPath) -> Result<(), SchemaError> {
        let Some(entries) = self.entries(value, path) else {
            return Ok(());
        };
        if entries.len() != 1 {
            self.push(path, ViolationKind::ChoiceTagCount(entries.len()));
            return Ok(());
        }
        let (tag, v) = &entries[0];
        match lookup_field(def, tag) {
            Some(field) => self.check_field(field, v, &path.field(field.name.as_str()))?,
            None => self.push(path, ViolationKind::UnknownChoiceTag(key_label(tag))),
        }
        Ok(())
    }

    fn check_map_of(
        &mut self,
        type_ref: &str,
        options: &TypeOptions,
        value: &Value,
        path: &FieldPath,
    ) -> Result<(), SchemaError> {
        let (Some(key_type), Some(value_type)) = (&options.key_type, &options.value_type) else {
            return Err(SchemaError::UnknownType(format!("{} key/value type", type_ref)));
        };
        let Some(entries) = self.entries(value, path) else {
            return Ok(());
        };
        self.check_size(entries.len() as i64, options, path);

        let mut seen = HashSet::new();
        for (k, v) in entries {
            let label = key_label(k);
            let child = path.field(label.as_str());
            if !seen.insert(label.clone()) {
                self.push(path, ViolationKind::RepeatedKey(label));
                continue;
            }
            self.check(k, key_type, &TypeOptions::default(), &child)?;
            self.check(v, value_type, &TypeOptions::default(), &child)?;
        }
        Ok(())
    }

    fn check_array_of(
        &mut self,
        type_ref: &str,
        options: &TypeOptions,
        value: &Value,
        path: &FieldPath,
    ) -> Result<(), SchemaError> {
        let Some(value_type) = &options.value_type else {
            return Err(SchemaError::UnknownType(format!("{} value type", type_ref)));
        };
        let Value::Array(items) = value else {
            self.push(path, ViolationKind::TypeMismatch { expected: "array" });
            return Ok(());
        };
        self.check_size(items.len() as i64, options, path);
        if options.unique {
            self.check_unique(items, value_type, path);
        }
        for (i, item) in items.iter().enumerate() {
            self.check(item, value_type, &TypeOptions::default(), &path.index(i))?;
        }
        Ok(())
    }

    // ───── Fields ─────

    fn check_field(&mut self, field: &FieldDef, value: &Value, path: &FieldPath) -> Result<(), SchemaError> {
        if !field.is_repeated() {
            return self.check(value, &field.type_ref, &field.options, path);
        }
        let Some(items) = self.check_count(field, value, path) else {
            return Ok(());
        };
        if field.options.unique {
            self.check_unique(items, &field.type_ref, path);
        }
        for (i, item) in items.iter().enumerate() {
            self.check(item, &field.type_ref, &field.options, &path.index(i))?;
        }
        Ok(())
    }

    /// Repeated fields are arrays whose length is within `[min..max]`.
    fn check_count<'a>(&mut self, field: &FieldDef, value: &'a Value, path: &FieldPath) -> Option<&'a [Value]> {
        let Value::Array(items) = value else {
            self.push(path, ViolationKind::TypeMismatch { expected: "array" });
            return None;
        };
        let found = items.len() as u64;
        if found < field.min || field.max.is_some_and(|max| found > max) {
            self.push(
                path,
                ViolationKind::Cardinality {
                    min: field.min,
                    max: field.max,
                    found,
                },
            );
        }
        Some(items)
    }

    /// Duplicates by structural equality of the canonical compact encoding.
    fn check_unique(&mut self, items: &[Value], type_ref: &str, path: &FieldPath) {
        let validator = self.validator;
        let catalog = &validator.catalog;
        let mut first_seen: HashMap<Vec<u8>, usize> = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            let canonical = to_compact(catalog, item, type_ref)
                .ok()
                .and_then(|compact| canonical_bytes(&compact).ok())
                .or_else(|| canonical_bytes(item).ok());
            let Some(bytes) = canonical else {
                continue;
            };
            match first_seen.get(&bytes) {
                Some(&first) => self.push(&path.index(i), ViolationKind::Duplicate(first)),
                None => {
                    first_seen.insert(bytes, i);
                }
            }
        }
    }

    fn entries<'a>(&mut self, value: &'a Value, path: &FieldPath) -> Option<&'a [(Value, Value)]> {
        match value {
            Value::Map(entries) => Some(entries),
            _ => {
                self.push(path, ViolationKind::TypeMismatch { expected: "map" });
                None
            }
        }
    }

    /// Match map keys to declared fields, reporting unknown and repeated keys.
    fn match_fields<'a>(
        &mut self,
        def: &TypeDef,
        entries: &'a [(Value, Value)],
        path: &FieldPath,
    ) -> HashMap<u64, &'a Value> {
        let mut present = HashMap::new();
        for (k, v) in entries {
            match lookup_field(def, k) {
                Some(field) => {
                    if present.insert(field.ordinal, v).is_some() {
                        self.push(path, ViolationKind::RepeatedKey(field.name.clone()));
                    }
                }
                None => self.push(path, ViolationKind::UnknownField(key_label(k))),
            }
        }
        present
    }

    fn check_integrity_policy(&mut self, def: &TypeDef, present: &HashMap<u64, &Value>, path: &FieldPath) {
        let (Some(verified), Some(type_field)) =
            (def.field_by_name("verifiedUsing"), def.field_by_name("type"))
        else {
            return;
        };
        let carries_integrity = matches!(
            present.get(&verified.ordinal),
            Some(Value::Array(items)) if !items.is_empty()
        );
        if !carries_integrity {
            return;
        }
        let Some(Value::Map(choice)) = present.get(&type_field.ordinal) else {
            return;
        };
        let validator = self.validator;
        let Ok(choice_def) = validator.catalog.type_of(&type_field.type_ref) else {
            return;
        };
        let tag = match choice.as_slice() {
            [(tag, _)] => lookup_field(choice_def, tag).map(|f| f.name.as_str()),
            _ => None,
        };
        if let Some(kind) = tag.and_then(ElementKind::from_tag) {
            if !kind.is_artifact() {
                self.push(
                    &path.field(verified.name.as_str()),
                    ViolationKind::IntegrityOnNonArtifact(kind.as_str().to_string()),
                );
            }
        }
    }
}

/// Text value of a record's key field (`K` option), e.g. an Element id.
fn key_text(def: &TypeDef, value: &Value) -> Option<String> {
    let key_field = def.fields.iter().find(|f| f.options.key)?;
    let Value::Map(entries) = value else {
        return None;
    };
    entries.iter().find_map(|(k, v)| match (lookup_field(def, k), v) {
        (Some(f), Value::Text(s)) if f.ordinal == key_field.ordinal => Some(s.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::MemoryLicenseRegistry;

    fn validator() -> Validator {
        Validator::new(
            Arc::new(TypeCatalog::spdx_v3().unwrap()),
            Arc::new(MemoryLicenseRegistry::with_common_ids()),
            ValidatorConfig::default(),
        )
    }

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (text(k), v)).collect())
    }

    fn relationship(id: &str, to: Vec<Value>) -> Value {
        map(vec![
            ("id", text(id)),
            (
                "type",
                map(vec![(
                    "relationship",
                    map(vec![
                        ("type", text("dependsOn")),
                        ("from", text("A")),
                        ("to", Value::Array(to)),
                    ]),
                )]),
            ),
        ])
    }

    fn paths(errors: &[ValidationError]) -> Vec<String> {
        errors.iter().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn test_relationship_valid() {
        let errors = validator()
            .validate(&relationship("rel-1", vec![text("B"), text("C")]), "Element")
            .unwrap();
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_empty_to_fails_cardinality() {
        let errors = validator()
            .validate(&relationship("rel-1", vec![]), "Element")
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "type.relationship.to");
        assert_eq!(
            errors[0].kind,
            ViolationKind::Cardinality {
                min: 1,
                max: None,
                found: 0
            }
        );
    }

    #[test]
    fn test_pattern_alternation_matches_whole_value() {
        let catalog = TypeCatalog::from_json(
            r#"{"types": [["Tag", "String", ["%v|v2"], "", []]]}"#,
        )
        .unwrap();
        let v = Validator::new(
            Arc::new(catalog),
            Arc::new(MemoryLicenseRegistry::with_common_ids()),
            ValidatorConfig::default(),
        );
        assert!(v.validate(&text("v2"), "Tag").unwrap().is_empty());
        assert!(!v.validate(&text("v23"), "Tag").unwrap().is_empty());
    }

    #[test]
    fn test_semver_pattern() {
        let v = validator();
        assert!(v.validate(&text("3.141592"), "SemVer").unwrap().is_empty());

        let errors = v.validate(&text("3.14159262"), "SemVer").unwrap();
        assert!(matches!(errors[0].kind, ViolationKind::Pattern { .. }));
    }

    #[test]
    fn test_undeclared_enumerant_code() {
        let v = validator();
        assert!(v
            .validate(&Value::Integer(3.into()), "RelationshipCompleteness")
            .unwrap()
            .is_empty());

        let errors = v
            .validate(&Value::Integer(4.into()), "RelationshipCompleteness")
            .unwrap();
        assert_eq!(errors[0].kind, ViolationKind::UndeclaredEnumerant("4".into()));
    }

    #[test]
    fn test_sha256_length_is_exact() {
        let v = validator();
        let short = map(vec![("sha256", Value::Bytes(vec![0u8; 31]))]);
        let errors = v.validate(&short, "Hash").unwrap();
        assert_eq!(
            errors[0].kind,
            ViolationKind::LengthMismatch {
                expected: 32,
                actual: 31
            }
        );

        let hex_ok = map(vec![("sha256", text(&"ab".repeat(32)))]);
        assert!(v.validate(&hex_ok, "Hash").unwrap().is_empty());
    }

    #[test]
    fn test_choice_needs_exactly_one_tag() {
        let v = validator();
        let empty = Value::Map(vec![]);
        let errors = v.validate(&empty, "IntegrityMethod").unwrap();
        assert_eq!(errors[0].kind, ViolationKind::ChoiceTagCount(0));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut value = relationship("rel-1", vec![text("B")]);
        if let Value::Map(entries) = &mut value {
            entries.push((text("color"), text("blue")));
        }
        let errors = validator().validate(&value, "Element").unwrap();
        assert_eq!(errors[0].kind, ViolationKind::UnknownField("color".into()));
    }

    #[test]
    fn test_compact_keys_accepted() {
        // Relationship record keyed by ordinal, completeness by code
        let value = Value::Map(vec![
            (Value::Integer(1.into()), Value::Integer(5.into())),
            (Value::Integer(2.into()), text("A")),
            (Value::Integer(3.into()), Value::Array(vec![text("B")])),
            (Value::Integer(4.into()), Value::Integer(1.into())),
        ]);
        assert!(validator().validate(&value, "Relationship").unwrap().is_empty());
    }

    #[test]
    fn test_formats() {
        let v = validator();
        assert!(v.validate(&text("https://example.com/x"), "URI").unwrap().is_empty());
        assert!(!v.validate(&text("urn:uuid:1234"), "URI").unwrap().is_empty());
        assert!(v.validate(&text("a@example.com"), "Email").unwrap().is_empty());
        assert!(!v.validate(&text("not an email"), "Email").unwrap().is_empty());
        assert!(v.validate(&text(r#""john doe"@example.com"#), "Email").unwrap().is_empty());
        assert!(v.validate(&text(r#""a\"b"@example.com"#), "Email").unwrap().is_empty());
        assert!(v.validate(&text("ops@[192.0.2.1]"), "Email").unwrap().is_empty());
        assert!(!v.validate(&text(r#""open@example.com"#), "Email").unwrap().is_empty());
        assert!(v.validate(&text("2024-01-01T00:00:00Z"), "DateTime").unwrap().is_empty());
        assert!(!v.validate(&text("yesterday"), "DateTime").unwrap().is_empty());
        assert!(v.validate(&text("MIT"), "LicenseId").unwrap().is_empty());
        assert_eq!(
            v.validate(&text("Nope-1.0"), "LicenseId").unwrap()[0].kind,
            ViolationKind::UnknownLicense("Nope-1.0".into())
        );
    }

    #[test]
    fn test_prefix_length() {
        let v = validator();
        assert!(v.validate(&text("ex"), "Prefix").unwrap().is_empty());
        assert!(!v.validate(&text(&"p".repeat(17)), "Prefix").unwrap().is_empty());
        assert!(!v.validate(&text(""), "Prefix").unwrap().is_empty());
    }

    #[test]
    fn test_unique_links() {
        let doc = map(vec![
            ("element", Value::Array(vec![text("a"), text("a")])),
            ("rootElement", Value::Array(vec![text("a")])),
        ]);
        let errors = validator().validate(&doc, "Collection").unwrap();
        assert_eq!(paths(&errors), vec!["element[1]"]);
        assert_eq!(errors[0].kind, ViolationKind::Duplicate(0));
    }

    #[test]
    fn test_integrity_on_non_artifact() {
        let mut value = relationship("rel-1", vec![text("B")]);
        let hash = map(vec![("hash", map(vec![("md5", Value::Bytes(vec![0; 16]))]))]);
        if let Value::Map(entries) = &mut value {
            entries.push((text("verifiedUsing"), Value::Array(vec![hash])));
        }
        let errors = validator().validate(&value, "Element").unwrap();
        assert_eq!(
            errors[0].kind,
            ViolationKind::IntegrityOnNonArtifact("relationship".into())
        );

        let lenient = Validator::new(
            Arc::new(TypeCatalog::spdx_v3().unwrap()),
            Arc::new(MemoryLicenseRegistry::new()),
            ValidatorConfig {
                integrity_requires_artifact: false,
            },
        );
        assert!(lenient.validate(&value, "Element").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_type_is_schema_error() {
        assert!(validator().validate(&Value::Null, "Nope").is_err());
    }

    #[test]
    fn test_envelope_defers_items() {
        let payload = map(vec![("element", Value::Array(vec![Value::Null]))]);
        let v = validator();
        assert!(v.validate_envelope(&payload, "Payload", "element").unwrap().is_empty());
        assert!(!v.validate(&payload, "Payload").unwrap().is_empty());

        let empty = map(vec![("element", Value::Array(vec![]))]);
        let errors = v.validate_envelope(&empty, "Payload", "element").unwrap();
        assert_eq!(paths(&errors), vec!["element"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let v = validator();
        let items: Vec<Value> = (0..500)
            .map(|i| {
                let to = if i % 7 == 0 { vec![] } else { vec![text("B")] };
                relationship(&format!("rel-{:04}", 499 - i), to)
            })
            .collect();

        let sequential = v.validate_all(&items, "Element", 1).unwrap();
        for workers in [2, 3, 8] {
            assert_eq!(v.validate_all(&items, "Element", workers).unwrap(), sequential);
        }

        let ids: Vec<_> = sequential.iter().map(|r| r.id.clone().unwrap()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(sequential.len(), 72);
    }
}
