//! License-id registry consumed by the `license-id` format.
//!
//! The authoritative SPDX license list is an external collaborator; the
//! registry is a trait so callers can plug in their own source.

use std::collections::HashSet;
use std::sync::RwLock;

/// Source of known license identifiers.
pub trait LicenseRegistry: Send + Sync {
    /// Whether `id` names a known license.
    fn contains(&self, id: &str) -> bool;
}

/// Identifiers seeded into [`MemoryLicenseRegistry::with_common_ids`].
pub const COMMON_LICENSE_IDS: &[&str] = &[
    "0BSD",
    "AGPL-3.0-only",
    "AGPL-3.0-or-later",
    "Apache-1.1",
    "Apache-2.0",
    "Artistic-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSL-1.0",
    "CC-BY-4.0",
    "CC-BY-SA-4.0",
    "CC0-1.0",
    "EPL-1.0",
    "EPL-2.0",
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "GPL-3.0-only",
    "GPL-3.0-or-later",
    "ISC",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "LGPL-3.0-only",
    "LGPL-3.0-or-later",
    "MIT",
    "MPL-2.0",
    "Unlicense",
    "Zlib",
];

/// In-memory, updatable license registry.
///
/// `LicenseRef-` identifiers are always accepted.
#[derive(Debug, Default)]
pub struct MemoryLicenseRegistry {
    ids: RwLock<HashSet<String>>,
}

impl MemoryLicenseRegistry {
    /// Empty registry; only `LicenseRef-` ids are accepted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with [`COMMON_LICENSE_IDS`].
    pub fn with_common_ids() -> Self {
        let registry = Self::new();
        registry.extend(COMMON_LICENSE_IDS.iter().copied());
        registry
    }

    /// Add identifiers.
    pub fn extend<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        let mut guard = self.ids.write().unwrap_or_else(|e| e.into_inner());
        guard.extend(ids.into_iter().map(str::to_string));
    }

    /// Remove an identifier. Returns whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        let mut guard = self.ids.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LicenseRegistry for MemoryLicenseRegistry {
    fn contains(&self, id: &str) -> bool {
        if is_license_ref(id) {
            return true;
        }
        self.ids
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }
}

fn is_license_ref(id: &str) -> bool {
    let local = match id.split_once(':') {
        Some((doc, local)) if doc.starts_with("DocumentRef-") => local,
        _ => id,
    };
    match local.strip_prefix("LicenseRef-") {
        Some(rest) => {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_ids() {
        let registry = MemoryLicenseRegistry::with_common_ids();
        assert!(registry.contains("MIT"));
        assert!(registry.contains("CC0-1.0"));
        assert!(!registry.contains("NOT-A-LICENSE"));
    }

    #[test]
    fn test_license_refs_accepted() {
        let registry = MemoryLicenseRegistry::new();
        assert!(registry.contains("LicenseRef-custom.1"));
        assert!(registry.contains("DocumentRef-other:LicenseRef-x"));
        assert!(!registry.contains("LicenseRef-"));
        assert!(!registry.contains("LicenseRef-bad id"));
    }

    #[test]
    fn test_registry_is_updatable() {
        let registry = MemoryLicenseRegistry::new();
        assert!(!registry.contains("Vim"));
        registry.extend(["Vim"]);
        assert!(registry.contains("Vim"));
        assert!(registry.remove("Vim"));
        assert!(!registry.contains("Vim"));
    }
}
