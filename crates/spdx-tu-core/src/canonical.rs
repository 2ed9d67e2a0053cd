//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats, no tags
//!
//! Compact records are maps keyed by field ordinal, so sorting by encoded key
//! bytes orders fields by declared ordinal. The same value therefore produces
//! identical bytes (and identical digests) on every platform.

use ciborium::value::{Integer, Value};
use std::io::Cursor;

use crate::error::{CoreError, Result};

/// Encode a CBOR value to canonical bytes.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Decode exactly one CBOR item from `bytes`.
///
/// Trailing bytes after the item are rejected.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    let value: Value =
        ciborium::from_reader(&mut cursor).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(CoreError::DecodingError(format!(
            "{} trailing bytes after CBOR item",
            bytes.len() - consumed
        )));
    }
    Ok(value)
}

/// Whether `bytes` is already in canonical form.
pub fn is_canonical(bytes: &[u8]) -> bool {
    match decode_value(bytes).and_then(|v| canonical_bytes(&v)) {
        Ok(reencoded) => reencoded == bytes,
        Err(_) => false,
    }
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => {
            return Err(CoreError::EncodingError(
                "floats not supported in canonical encoding".into(),
            ))
        }
        Value::Tag(tag, _) => {
            return Err(CoreError::EncodingError(format!(
                "tag {} not supported in canonical encoding",
                tag
            )))
        }
        _ => {
            return Err(CoreError::EncodingError(
                "unsupported CBOR value type".into(),
            ))
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        // Major type 0: unsigned integer
        encode_uint(buf, 0, n as u64);
    } else {
        // Major type 1: -1 encodes as 0, -2 as 1, ...
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<()> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison. Duplicate keys are
/// rejected since they have no deterministic order.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<()> {
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        key_value_pairs.push((key_buf, v));
    }

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));
    if key_value_pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(CoreError::EncodingError("duplicate map key".into()));
    }

    encode_uint(buf, 5, key_value_pairs.len() as u64);
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        // 0-23: single byte
        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        // 24-255: two bytes
        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        // 256-65535: three bytes
        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_integer(&mut buf, Integer::from(-1));
        assert_eq!(buf, vec![0x20]);
    }

    #[test]
    fn test_map_key_ordering() {
        let entries = vec![
            (Value::Integer(8.into()), Value::Integer(80.into())),
            (Value::Integer(1.into()), Value::Integer(0.into())),
            (Value::Integer(5.into()), Value::Integer(50.into())),
        ];
        let buf = canonical_bytes(&Value::Map(entries)).unwrap();

        // Map header (3 entries), then keys 1, 5, 8 in order
        assert_eq!(buf[0], 0xa3);
        assert_eq!(buf[1], 0x01);
        assert_eq!(buf[2], 0x00);
        assert_eq!(buf[3], 0x05);
        assert_eq!(buf[4], 0x18);
        assert_eq!(buf[5], 50);
        assert_eq!(buf[6], 0x08);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let entries = vec![
            (Value::Text("a".into()), Value::Null),
            (Value::Text("a".into()), Value::Bool(true)),
        ];
        assert!(canonical_bytes(&Value::Map(entries)).is_err());
    }

    #[test]
    fn test_float_rejected() {
        assert!(canonical_bytes(&Value::Float(1.5)).is_err());
    }

    #[test]
    fn test_decode_roundtrip_is_canonical() {
        let value = Value::Map(vec![
            (Value::Integer(2.into()), Value::Text("b".into())),
            (Value::Integer(1.into()), Value::Bytes(vec![0xde, 0xad])),
        ]);
        let bytes = canonical_bytes(&value).unwrap();
        assert!(is_canonical(&bytes));

        let decoded = decode_value(&bytes).unwrap();
        assert_eq!(canonical_bytes(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = canonical_bytes(&Value::Integer(1.into())).unwrap();
        bytes.push(0x00);
        assert!(decode_value(&bytes).is_err());
    }
}
