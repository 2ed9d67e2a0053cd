//! Element identifiers and IRI syntax checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An Element identifier or Link target.
///
/// Inside a Payload an id may be written as a bare local token, as
/// `prefix:local`, or as an absolute IRI. After identity resolution every
/// `Iri` held by a resolved Element is absolute.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Wrap a token without checking it.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the token text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the token parses as an absolute IRI.
    pub fn is_absolute(&self) -> bool {
        is_absolute_iri(&self.0)
    }

    /// Split a `prefix:local` token at its first colon.
    ///
    /// Returns `None` for tokens without a colon or with an authority
    /// component (`scheme://...`), which are never prefix-compressed.
    pub fn split_prefix(&self) -> Option<(&str, &str)> {
        let (prefix, local) = self.0.split_once(':')?;
        if prefix.is_empty() || local.starts_with("//") {
            return None;
        }
        Some((prefix, local))
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Iri({})", self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Iri {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Absolute IRI: has a scheme and parses.
pub fn is_absolute_iri(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// Absolute URI that denotes a locator (hierarchical, e.g. `https://host/...`),
/// as opposed to a bare identifier such as `urn:uuid:...`.
pub fn is_locator(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(u) => !u.cannot_be_a_base(),
        Err(_) => false,
    }
}

/// An id token: absolute IRI, `prefix:local`, or bare local id.
pub fn is_id_ref(s: &str) -> bool {
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    if s.chars().any(|c| matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')) {
        return false;
    }
    match url::Url::parse(s) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_iri() {
        assert!(is_absolute_iri("https://example.com/spdx/pkg-1"));
        assert!(is_absolute_iri("urn:uuid:6e8bc430-9c3a-11d9-9669-0800200c9a66"));
        assert!(!is_absolute_iri("pkg-1"));
    }

    #[test]
    fn test_locator() {
        assert!(is_locator("https://example.com/download/pkg.tgz"));
        assert!(!is_locator("urn:uuid:6e8bc430-9c3a-11d9-9669-0800200c9a66"));
        assert!(!is_locator("relative/path"));
    }

    #[test]
    fn test_id_ref() {
        assert!(is_id_ref("pkg-1"));
        assert!(is_id_ref("ex:pkg-1"));
        assert!(is_id_ref("https://example.com/spdx/pkg-1"));
        assert!(!is_id_ref(""));
        assert!(!is_id_ref("pkg 1"));
        assert!(!is_id_ref("<pkg>"));
    }

    #[test]
    fn test_split_prefix() {
        assert_eq!(Iri::from("ex:pkg-1").split_prefix(), Some(("ex", "pkg-1")));
        assert_eq!(Iri::from("https://example.com/x").split_prefix(), None);
        assert_eq!(Iri::from("pkg-1").split_prefix(), None);
    }
}
