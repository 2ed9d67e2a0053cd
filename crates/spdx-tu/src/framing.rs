//! Byte framing: JSON or CBOR into a structural tree.

use ciborium::value::Value;

use spdx_tu_core::decode_value;

use crate::config::Framing;
use crate::error::{CodecError, Result};

/// Resolve [`Framing::Auto`] by looking at the first non-whitespace byte.
pub fn detect(bytes: &[u8]) -> Framing {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Framing::Json,
        _ => Framing::Cbor,
    }
}

/// Parse `bytes` into a tree.
pub fn parse(bytes: &[u8], framing: Framing) -> Result<Value> {
    let framing = match framing {
        Framing::Auto => detect(bytes),
        other => other,
    };
    match framing {
        Framing::Json => serde_json::from_slice::<Value>(bytes)
            .map_err(|e| CodecError::Parse(format!("json: {}", e))),
        _ => decode_value(bytes).map_err(|e| CodecError::Parse(format!("cbor: {}", e))),
    }
}
