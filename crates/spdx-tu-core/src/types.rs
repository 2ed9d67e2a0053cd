//! Strong type definitions shared by Elements and Payloads.
//!
//! Serialization of every type here produces the verbose form (field names,
//! enumerant names, hex binaries). The compact form used on the wire and for
//! hashing is derived from it by [`crate::transcode`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::iri::Iri;

/// An RFC 3339 timestamp, rendered in UTC with a `Z` suffix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Parse an RFC 3339 timestamp with any offset.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)))
    }

    /// Render as RFC 3339 (`2024-01-01T00:00:00Z`).
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Binary value, hex-encoded in the verbose form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }
}

impl fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexBytes({})", self.to_hex())
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl<'de> Visitor<'de> for HexVisitor {
            type Value = HexBytes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("hex string or byte string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<HexBytes, E> {
                HexBytes::from_hex(v).map_err(E::custom)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<HexBytes, E> {
                Ok(HexBytes(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<HexBytes, E> {
                Ok(HexBytes(v))
            }
        }

        deserializer.deserialize_any(HexVisitor)
    }
}

/// Conformance profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileIdentifier {
    Core,
    Software,
    Licensing,
    Security,
    Build,
    Ai,
    Dataset,
    Usage,
}

/// Digest algorithms a Hash may carry.
///
/// The declaration order matches the ordinals of the `Hash` map type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "sha1")]
    Sha1,
    #[serde(rename = "sha224")]
    Sha224,
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha384")]
    Sha384,
    #[serde(rename = "sha512")]
    Sha512,
    #[serde(rename = "sha3_224")]
    Sha3_224,
    #[serde(rename = "sha3_256")]
    Sha3_256,
    #[serde(rename = "sha3_384")]
    Sha3_384,
    #[serde(rename = "sha3_512")]
    Sha3_512,
    #[serde(rename = "blake2b256")]
    Blake2b256,
    #[serde(rename = "blake2b384")]
    Blake2b384,
    #[serde(rename = "blake2b512")]
    Blake2b512,
    #[serde(rename = "blake3")]
    Blake3,
    #[serde(rename = "md2")]
    Md2,
    #[serde(rename = "md4")]
    Md4,
    #[serde(rename = "md5")]
    Md5,
    #[serde(rename = "md6")]
    Md6,
    #[serde(rename = "spdxPvcSha1")]
    SpdxPvcSha1,
    #[serde(rename = "spdxPvcSha256")]
    SpdxPvcSha256,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 19] = [
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
        Self::Blake2b256,
        Self::Blake2b384,
        Self::Blake2b512,
        Self::Blake3,
        Self::Md2,
        Self::Md4,
        Self::Md5,
        Self::Md6,
        Self::SpdxPvcSha1,
        Self::SpdxPvcSha256,
    ];

    /// Exact digest length in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Sha1 | Self::SpdxPvcSha1 => 20,
            Self::Sha224 | Self::Sha3_224 => 28,
            Self::Sha256 | Self::Sha3_256 | Self::Blake2b256 | Self::Blake3 => 32,
            Self::SpdxPvcSha256 => 32,
            Self::Sha384 | Self::Sha3_384 | Self::Blake2b384 => 48,
            Self::Sha512 | Self::Sha3_512 | Self::Blake2b512 => 64,
            Self::Md2 | Self::Md4 | Self::Md5 | Self::Md6 => 16,
        }
    }

    /// Name used in the verbose form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha3_224 => "sha3_224",
            Self::Sha3_256 => "sha3_256",
            Self::Sha3_384 => "sha3_384",
            Self::Sha3_512 => "sha3_512",
            Self::Blake2b256 => "blake2b256",
            Self::Blake2b384 => "blake2b384",
            Self::Blake2b512 => "blake2b512",
            Self::Blake3 => "blake3",
            Self::Md2 => "md2",
            Self::Md4 => "md4",
            Self::Md5 => "md5",
            Self::Md6 => "md6",
            Self::SpdxPvcSha1 => "spdxPvcSha1",
            Self::SpdxPvcSha256 => "spdxPvcSha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown hash algorithm: {}", s))
    }
}

/// Named digests of a single Hash integrity method.
pub type HashValues = BTreeMap<HashAlgorithm, HexBytes>;

/// Signature integrity method. Opaque beyond structural presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub algorithm: String,
    pub public_key: HexBytes,
    pub signature: HexBytes,
}

/// Hash or signature verifying content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntegrityMethod {
    Hash(HashValues),
    Signature(SignatureInfo),
}

impl IntegrityMethod {
    /// A Hash method with a single digest.
    pub fn hash(algorithm: HashAlgorithm, digest: Vec<u8>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(algorithm, HexBytes(digest));
        Self::Hash(values)
    }
}

/// Reference to an Element held outside the current Payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMap {
    pub external_id: Iri,
    pub verified_using: Vec<IntegrityMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalReferenceType {
    AltDownloadLocation,
    AltWebPage,
    BuildMeta,
    Documentation,
    IssueTracker,
    MailingList,
    ReleaseNotes,
    SecurityAdvisory,
    Vcs,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReference {
    #[serde(rename = "type")]
    pub reference_type: ExternalReferenceType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locator: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalIdentifierType {
    Cpe22,
    Cpe23,
    Email,
    Gitoid,
    PkgUrl,
    Swhid,
    Swid,
    UrlScheme,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentifier {
    #[serde(rename = "type")]
    pub identifier_type: ExternalIdentifierType,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ExternalIdentifier {
    pub fn new(identifier_type: ExternalIdentifierType, identifier: impl Into<String>) -> Self {
        Self {
            identifier_type,
            identifier: identifier.into(),
            comment: None,
        }
    }
}
