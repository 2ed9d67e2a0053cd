//! Field paths for diagnostics.
//!
//! Every validation error carries the path of the offending value, e.g.
//! `element[2].type.relationship.to`.

use std::fmt;

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// A named record, map or choice field.
    Field(String),
    /// A position in an array or repeated field.
    Index(usize),
}

/// Location of a value inside a structural tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, denoting the value being validated.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Extend with a named field.
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.into()));
        Self(segments)
    }

    /// Extend with an array position.
    pub fn index(&self, i: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(i));
        Self(segments)
    }

    /// Prepend `prefix` to this path.
    pub fn under(&self, prefix: &FieldPath) -> Self {
        let mut segments = prefix.0.clone();
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether `prefix` is a leading part of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The path without its last segment, or `None` at the root.
    pub fn parent(&self) -> Option<FieldPath> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// The last segment, or `None` at the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = FieldPath::root()
            .field("element")
            .index(2)
            .field("type")
            .field("relationship")
            .field("to");
        assert_eq!(path.to_string(), "element[2].type.relationship.to");
        assert_eq!(FieldPath::root().to_string(), "$");
    }

    #[test]
    fn test_path_under() {
        let inner = FieldPath::root().field("name");
        let outer = FieldPath::root().field("element").index(0);
        let joined = inner.under(&outer);
        assert_eq!(joined.to_string(), "element[0].name");
        assert!(joined.starts_with(&outer));
    }
}
