//! Tag-based exclusion of modules and elements from expression generation.
//!
//! Filtering gates install/uninstall generation only; filtered entities are
//! still flattened into the field and element views.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Element, Module};

/// Entities that carry a tag list.
pub trait Tagged {
    fn tags(&self) -> &[String];
}

impl Tagged for Module {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for Element {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Returns `true` if any of `entity_tags` appears in `filter_tags`.
///
/// Matching is exact and case-sensitive.
pub fn is_filtered(entity_tags: &[String], filter_tags: &BTreeSet<String>) -> bool {
    entity_tags.iter().any(|tag| filter_tags.contains(tag))
}

/// Set of tags whose bearers are excluded from expression generation.
///
/// # Examples
///
/// ```
/// use framework_core::{Element, TagFilter};
///
/// let filter = TagFilter::from_iter(["experimental"]);
/// assert!(filter.excludes(&Element::new("a").with_tag("experimental")));
/// assert!(!filter.excludes(&Element::new("b").with_tag("Experimental")));
/// assert!(!TagFilter::default().excludes(&Element::new("c").with_tag("x")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagFilter {
    tags: BTreeSet<String>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Returns `true` if any of `tags` is in the filter set.
    pub fn matches(&self, tags: &[String]) -> bool {
        is_filtered(tags, &self.tags)
    }

    /// Returns `true` if `entity` is excluded by this filter.
    pub fn excludes(&self, entity: &impl Tagged) -> bool {
        self.matches(entity.tags())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TagFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_is_filtered_on_intersection() {
        assert!(is_filtered(&tags(&["a", "b"]), &set(&["b"])));
        assert!(!is_filtered(&tags(&["a"]), &set(&["b", "c"])));
    }

    #[test]
    fn test_is_filtered_empty_sets() {
        assert!(!is_filtered(&[], &set(&["a"])));
        assert!(!is_filtered(&tags(&["a"]), &BTreeSet::new()));
    }

    #[test]
    fn test_filter_matches_through_is_filtered() {
        let filter = TagFilter::from_iter(["b", "c"]);
        for entity in [tags(&["a"]), tags(&["a", "c"]), tags(&[])] {
            assert_eq!(filter.matches(&entity), is_filtered(&entity, &set(&["b", "c"])));
        }
        assert!(filter.excludes(&Element::new("e").with_tag("c")));
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let filter = TagFilter::from_iter(["beta"]);
        assert!(!filter.matches(&tags(&["Beta"])));
        assert!(filter.matches(&tags(&["beta"])));
    }

    #[test]
    fn test_module_tags_are_checked() {
        let filter = TagFilter::new().with_tag("legacy");
        assert!(filter.excludes(&Module::new("m").with_tag("legacy")));
        assert!(!filter.excludes(&Module::new("m")));
    }
}
