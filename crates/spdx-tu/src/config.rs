//! Codec configuration.

use serde::Deserialize;

use spdx_tu_core::ValidatorConfig;

/// Byte framing accepted by [`crate::Codec::decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// JSON if the first non-whitespace byte is `{`, CBOR otherwise.
    #[default]
    Auto,
    /// Deterministic CBOR, compact or verbose form.
    Cbor,
    /// JSON, verbose form.
    Json,
}

/// Configuration for the Codec.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Input framing.
    pub framing: Framing,
    /// Keep going past per-Element failures and report them as issues.
    pub best_effort: bool,
    /// Check `verifiedUsing` of every Element while decoding.
    pub verify_integrity: bool,
    /// Worker threads for per-Element stages.
    pub workers: usize,
    /// Base URL for `locationHint`s written by `split`.
    pub location_base: Option<String>,
    /// Validator policy.
    pub validator: ValidatorConfig,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            framing: Framing::Auto,
            best_effort: false,
            verify_integrity: true,
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            location_base: None,
            validator: ValidatorConfig::default(),
        }
    }
}

impl CodecConfig {
    /// Default configuration in best-effort mode.
    pub fn best_effort() -> Self {
        Self {
            best_effort: true,
            ..Self::default()
        }
    }
}
