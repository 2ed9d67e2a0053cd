//! Catalog-driven conversion between the verbose and compact forms.
//!
//! | | verbose | compact |
//! |---|---|---|
//! | record / map / choice keys | field name | field ordinal |
//! | enumerated values | enumerant name | enumerant code |
//! | binaries | hex text | byte string |
//!
//! Both directions accept input in either form, so a partially compacted
//! value converts cleanly. The compact form is what gets hashed and encoded.

use ciborium::value::{Integer, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::canonical::canonical_bytes;
use crate::catalog::{BaseType, FieldDef, TypeCatalog, TypeDef};
use crate::error::{CoreError, Result};
use crate::path::FieldPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Compact,
    Verbose,
}

/// Convert a value of type `type_ref` to the compact form.
pub fn to_compact(catalog: &TypeCatalog, value: &Value, type_ref: &str) -> Result<Value> {
    convert(catalog, value, type_ref, &FieldPath::root(), Form::Compact)
}

/// Convert a value of type `type_ref` to the verbose form.
pub fn to_verbose(catalog: &TypeCatalog, value: &Value, type_ref: &str) -> Result<Value> {
    convert(catalog, value, type_ref, &FieldPath::root(), Form::Verbose)
}

/// Serialize a model value into its compact form.
pub fn compact_value<T: Serialize + ?Sized>(
    catalog: &TypeCatalog,
    value: &T,
    type_ref: &str,
) -> Result<Value> {
    let verbose =
        Value::serialized(value).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    to_compact(catalog, &verbose, type_ref)
}

/// Canonical CBOR bytes of a model value's compact form.
pub fn canonical_encoding<T: Serialize + ?Sized>(
    catalog: &TypeCatalog,
    value: &T,
    type_ref: &str,
) -> Result<Vec<u8>> {
    canonical_bytes(&compact_value(catalog, value, type_ref)?)
}

/// Build a model value from a tree in either form.
pub fn from_value<T: DeserializeOwned>(
    catalog: &TypeCatalog,
    value: &Value,
    type_ref: &str,
) -> Result<T> {
    let verbose = to_verbose(catalog, value, type_ref)?;
    verbose
        .deserialized()
        .map_err(|e| CoreError::DecodingError(e.to_string()))
}

fn convert(
    catalog: &TypeCatalog,
    value: &Value,
    type_ref: &str,
    path: &FieldPath,
    form: Form,
) -> Result<Value> {
    let shape = catalog.resolve(type_ref)?;
    match shape.base() {
        BaseType::Binary => convert_binary(value, path, form),
        BaseType::Boolean | BaseType::Integer | BaseType::String => Ok(value.clone()),
        BaseType::Enumerated => {
            let def = defined(shape.def(), type_ref, path)?;
            convert_enumerant(def, value, path, form)
        }
        BaseType::Record | BaseType::Map | BaseType::Choice => {
            let def = defined(shape.def(), type_ref, path)?;
            convert_fields(catalog, def, value, path, form)
        }
        BaseType::MapOf => {
            let options = shape.options();
            let (Some(key_type), Some(value_type)) = (options.key_type, options.value_type) else {
                return Err(transcode_error(path, format!("{} lacks key/value types", type_ref)));
            };
            let entries = as_map(value, path)?;
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                let key = convert(catalog, k, &key_type, path, form)?;
                let child = path.field(key_label(k));
                out.push((key, convert(catalog, v, &value_type, &child, form)?));
            }
            Ok(Value::Map(out))
        }
        BaseType::ArrayOf => {
            let Some(value_type) = shape.options().value_type else {
                return Err(transcode_error(path, format!("{} lacks a value type", type_ref)));
            };
            let items = as_array(value, path)?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| convert(catalog, item, &value_type, &path.index(i), form))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

fn convert_binary(value: &Value, path: &FieldPath, form: Form) -> Result<Value> {
    match (value, form) {
        (Value::Bytes(b), Form::Verbose) => Ok(Value::Text(hex::encode(b))),
        (Value::Text(s), Form::Compact) => hex::decode(s)
            .map(Value::Bytes)
            .map_err(|e| transcode_error(path, format!("invalid hex: {}", e))),
        (Value::Bytes(_), Form::Compact) | (Value::Text(_), Form::Verbose) => Ok(value.clone()),
        _ => Err(transcode_error(path, "expected binary")),
    }
}

fn convert_enumerant(def: &TypeDef, value: &Value, path: &FieldPath, form: Form) -> Result<Value> {
    let enumerant = match value {
        Value::Text(name) => def.enumerant_by_name(name),
        Value::Integer(code) => u64::try_from(*code)
            .ok()
            .and_then(|c| def.enumerant_by_code(c)),
        _ => None,
    }
    .ok_or_else(|| transcode_error(path, format!("undeclared {} value", def.name)))?;

    Ok(match form {
        Form::Compact => Value::Integer(Integer::from(enumerant.code)),
        Form::Verbose => Value::Text(enumerant.name.clone()),
    })
}

fn convert_fields(
    catalog: &TypeCatalog,
    def: &TypeDef,
    value: &Value,
    path: &FieldPath,
    form: Form,
) -> Result<Value> {
    let entries = as_map(value, path)?;
    let mut out = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let field = lookup_field(def, k)
            .ok_or_else(|| transcode_error(path, format!("unknown field {}", key_label(k))))?;
        let child = path.field(field.name.as_str());
        let key = match form {
            Form::Compact => Value::Integer(Integer::from(field.ordinal)),
            Form::Verbose => Value::Text(field.name.clone()),
        };
        out.push((key, convert_field(catalog, field, v, &child, form)?));
    }
    Ok(Value::Map(out))
}

fn convert_field(
    catalog: &TypeCatalog,
    field: &FieldDef,
    value: &Value,
    path: &FieldPath,
    form: Form,
) -> Result<Value> {
    if !field.is_repeated() {
        return convert(catalog, value, &field.type_ref, path, form);
    }
    let items = as_array(value, path)?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| convert(catalog, item, &field.type_ref, &path.index(i), form))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// Find the field a map key names, by name (verbose) or ordinal (compact).
pub fn lookup_field<'a>(def: &'a TypeDef, key: &Value) -> Option<&'a FieldDef> {
    match key {
        Value::Text(name) => def.field_by_name(name),
        Value::Integer(ordinal) => u64::try_from(*ordinal)
            .ok()
            .and_then(|o| def.field_by_ordinal(o)),
        _ => None,
    }
}

/// Printable form of a map key.
pub fn key_label(key: &Value) -> String {
    match key {
        Value::Text(s) => s.clone(),
        Value::Integer(i) => i128::from(*i).to_string(),
        other => format!("{:?}", other),
    }
}

fn defined<'a>(def: Option<&'a TypeDef>, type_ref: &str, path: &FieldPath) -> Result<&'a TypeDef> {
    def.ok_or_else(|| transcode_error(path, format!("{} is not a declared type", type_ref)))
}

fn as_map<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a [(Value, Value)]> {
    match value {
        Value::Map(entries) => Ok(entries),
        _ => Err(transcode_error(path, "expected map")),
    }
}

fn as_array<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a [Value]> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(transcode_error(path, "expected array")),
    }
}

fn transcode_error(path: &FieldPath, message: impl Into<String>) -> CoreError {
    CoreError::Transcode {
        path: path.clone(),
        message: message.into(),
    }
}
