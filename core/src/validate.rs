//! Structural validation of framework definitions.
//!
//! Catches definitions that would break the key grammar (empty names, names
//! containing separators, reserved field ids) and obvious duplicates before a
//! resolution pass is attempted. Resolution enforces key uniqueness on its
//! own; validation gives earlier, more specific messages.
//!
//! # Examples
//!
//! ```
//! use framework_core::*;
//!
//! let framework = Framework::default().with_package(
//!     Package::new("pkgA").with_module(
//!         Module::new("modA").with_section(
//!             Section::new("secA").with_element(Element::new("elemA").with_field("val", "42")),
//!         ),
//!     ),
//! );
//! assert!(validate_framework(&framework).is_empty());
//!
//! let bad = Framework::default().with_package(Package::new("pkg.A"));
//! assert!(!validate_framework(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::namespace::{FIELD_SEPARATOR, NAME_SEPARATOR};
use crate::placeholder::SECTION_PREFIX_KEYWORD;
use crate::{Element, Framework, Module, Namespace, Section};

/// Framework validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A package, module, section or element name is empty.
    #[error("empty {kind} name under {parent:?}")]
    EmptyName { kind: &'static str, parent: String },
    /// A name contains `.` or `/`.
    #[error("{kind} name {name:?} contains a separator character")]
    InvalidName { kind: &'static str, name: String },
    /// A field id is empty or contains a separator.
    #[error("invalid field id {id:?} in {element:?}")]
    InvalidFieldId { element: String, id: String },
    /// A field id collides with the reserved `prefix` keyword.
    #[error("field id {id:?} in {element:?} is reserved")]
    ReservedFieldId { element: String, id: String },
    /// Two packages share a name.
    #[error("duplicate package: {0}")]
    DuplicatePackage(String),
    /// Two prefixes target the same section.
    #[error("duplicate prefix section: {0}")]
    DuplicatePrefix(String),
}

/// Validates a framework, stopping at the first problem found.
pub fn validate_framework(framework: &Framework) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_sections: HashSet<&str> = HashSet::new();
    for prefix in &framework.prefixes {
        if !seen_sections.insert(prefix.section.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(prefix.section.clone()));
            return errors;
        }
    }

    let mut seen_packages: HashSet<&str> = HashSet::new();
    for package in &framework.packages {
        if let Some(error) = check_name("package", &package.name, "framework") {
            errors.push(error);
            return errors;
        }
        if !seen_packages.insert(package.name.as_str()) {
            errors.push(ValidationError::DuplicatePackage(package.name.clone()));
            return errors;
        }

        let namespace = package.namespace();
        for module in &package.modules {
            errors.extend(validate_module(module, &namespace));
            if !errors.is_empty() {
                return errors;
            }
        }
    }

    errors
}

fn validate_module(module: &Module, package: &Namespace) -> Vec<ValidationError> {
    if let Some(error) = check_name("module", &module.name, package.as_str()) {
        return vec![error];
    }
    let namespace = package.child(&module.name);
    module
        .sections
        .iter()
        .find_map(|section| validate_section(section, &namespace))
        .into_iter()
        .collect()
}

fn validate_section(section: &Section, module: &Namespace) -> Option<ValidationError> {
    if let Some(error) = check_name("section", &section.name, module.as_str()) {
        return Some(error);
    }
    let namespace = module.child(&section.name);
    section
        .elements
        .iter()
        .find_map(|element| validate_element(element, &namespace))
}

fn validate_element(element: &Element, section: &Namespace) -> Option<ValidationError> {
    if let Some(error) = check_name("element", &element.name, section.as_str()) {
        return Some(error);
    }
    let namespace = section.child(&element.name);
    for field in &element.fields {
        let id = field.id.trim();
        if id.is_empty() || has_separator(id) {
            return Some(ValidationError::InvalidFieldId {
                element: namespace.to_string(),
                id: field.id.clone(),
            });
        }
        if id == SECTION_PREFIX_KEYWORD {
            return Some(ValidationError::ReservedFieldId {
                element: namespace.to_string(),
                id: field.id.clone(),
            });
        }
    }
    None
}

fn check_name(kind: &'static str, name: &str, parent: &str) -> Option<ValidationError> {
    if name.trim().is_empty() {
        return Some(ValidationError::EmptyName {
            kind,
            parent: parent.to_string(),
        });
    }
    if has_separator(name) {
        return Some(ValidationError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    None
}

fn has_separator(name: &str) -> bool {
    name.contains(NAME_SEPARATOR) || name.contains(FIELD_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Package, Prefix};

    fn framework_with(element: Element) -> Framework {
        Framework::default().with_package(
            Package::new("pkgA").with_module(
                Module::new("modA").with_section(Section::new("secA").with_element(element)),
            ),
        )
    }

    #[test]
    fn test_validate_rejects_duplicate_packages() {
        let framework = Framework::default()
            .with_package(Package::new("pkgA"))
            .with_package(Package::new("pkgA"));
        assert_eq!(
            validate_framework(&framework),
            vec![ValidationError::DuplicatePackage("pkgA".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_prefix() {
        let framework = Framework::default()
            .with_prefix(Prefix::new("core", "A", 0))
            .with_prefix(Prefix::new("core", "B", 1));
        assert_eq!(
            validate_framework(&framework),
            vec![ValidationError::DuplicatePrefix("core".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_separator_in_element_name() {
        let errors = validate_framework(&framework_with(Element::new("a/b")));
        assert_eq!(
            errors,
            vec![ValidationError::InvalidName {
                kind: "element",
                name: "a/b".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_rejects_empty_section_name() {
        let framework = Framework::default().with_package(
            Package::new("pkgA").with_module(Module::new("modA").with_section(Section::new(" "))),
        );
        assert_eq!(
            validate_framework(&framework),
            vec![ValidationError::EmptyName {
                kind: "section",
                parent: "pkgA.modA".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_rejects_reserved_field_id() {
        let errors = validate_framework(&framework_with(Element::new("e").with_field("prefix", "x")));
        assert_eq!(
            errors,
            vec![ValidationError::ReservedFieldId {
                element: "pkgA.modA.secA.e".to_string(),
                id: "prefix".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_accepts_valid_framework() {
        let element = Element::new("e").with_field("name", "x").with_install("<<name>>");
        assert!(validate_framework(&framework_with(element)).is_empty());
    }
}
