//! Fully-qualified naming.
//!
//! Packages are the root of the key space. Every level below appends its own
//! name with [`NAME_SEPARATOR`]; field keys append the field id to the owning
//! element's name with [`FIELD_SEPARATOR`]:
//!
//! ```text
//! pkgA.modA.secA.elemA/val
//! ```
//!
//! The namespace is passed down the tree as an explicit context value, so
//! each level computes its own name exactly once.

use std::fmt;

/// Separator between the names of nested entities.
pub const NAME_SEPARATOR: char = '.';

/// Separator between an element's qualified name and a field id.
pub const FIELD_SEPARATOR: char = '/';

/// Returns `parent + "." + name`.
pub fn qualify(parent: &str, name: &str) -> String {
    format!("{parent}{NAME_SEPARATOR}{name}")
}

/// Returns `element + "/" + field_id`.
pub fn field_key(element: &str, field_id: &str) -> String {
    format!("{element}{FIELD_SEPARATOR}{field_id}")
}

/// Fully-qualified name of an entity in the tree.
///
/// # Examples
///
/// ```
/// use framework_core::Namespace;
///
/// let element = Namespace::root("pkgA").child("modA").child("secA").child("elemA");
/// assert_eq!(element.as_str(), "pkgA.modA.secA.elemA");
/// assert_eq!(element.field_key("val"), "pkgA.modA.secA.elemA/val");
/// assert_eq!(element.leaf(), "elemA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Starts a new key space at a package name.
    pub fn root(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the namespace of a child entity.
    pub fn child(&self, name: &str) -> Self {
        Self(qualify(&self.0, name))
    }

    /// Returns the key of a field owned by this (element) namespace.
    pub fn field_key(&self, field_id: &str) -> String {
        field_key(&self.0, field_id)
    }

    /// Returns the last name segment.
    pub fn leaf(&self) -> &str {
        self.0
            .rsplit_once(NAME_SEPARATOR)
            .map_or(self.0.as_str(), |(_, leaf)| leaf)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_and_field_key() {
        assert_eq!(qualify("pkgA", "modA"), "pkgA.modA");
        assert_eq!(field_key("pkgA.modA.secA.x", "id"), "pkgA.modA.secA.x/id");
    }

    #[test]
    fn test_root_leaf_is_whole_name() {
        let ns = Namespace::root("pkgA");
        assert_eq!(ns.leaf(), "pkgA");
        assert_eq!(ns.child("modA").leaf(), "modA");
    }

    #[test]
    fn test_siblings_with_same_name_differ_by_parent() {
        let module = Namespace::root("pkgA").child("modA");
        let a = module.child("secA").child("x");
        let b = module.child("secB").child("x");
        assert_eq!(a.as_str(), "pkgA.modA.secA.x");
        assert_eq!(b.as_str(), "pkgA.modA.secB.x");
        assert_ne!(a, b);
    }
}
