//! Entity tree for framework definitions.
//!
//! A [`Framework`] owns its [`Package`]s and [`Prefix`]es; each level below
//! owns its children in declaration order. None of the entities carry an
//! identity of their own: their fully-qualified names are derived from their
//! position in the tree (see [`Namespace`](crate::Namespace)).
//!
//! The types deserialize from the same document shape the framework loader
//! reads from disk, so optional collections default to empty.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Framework release number.
///
/// # Examples
///
/// ```
/// use framework_core::Release;
///
/// let release = Release::new(1, 2, 0);
/// assert_eq!(release.version_string(), "1.2.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Release {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Release {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the dotted `major.minor.patch` form used in prefix values.
    pub fn version_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Per-section prefix token, combined with the release version during
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    /// Section reference the prefix applies to (e.g. `"core"`).
    pub section: String,
    /// Literal prefix string (e.g. `"CL"`).
    pub prefix: String,
    /// Ascending processing order used when building the prefix table.
    #[serde(rename = "processingOrder", alias = "processing_order", default)]
    pub processing_order: i64,
}

impl Prefix {
    pub fn new(section: impl Into<String>, prefix: impl Into<String>, processing_order: i64) -> Self {
        Self {
            section: section.into(),
            prefix: prefix.into(),
            processing_order,
        }
    }
}

/// A single named value attached to an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    /// Raw field data; may contain `<<...>>` placeholders.
    #[serde(default)]
    pub data: String,
}

impl Field {
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }
}

/// Install and uninstall expression templates of an element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Expressions {
    #[serde(default)]
    pub install: String,
    #[serde(default)]
    pub uninstall: String,
}

/// Leaf entity of the tree: a named, tagged bundle of fields plus its
/// install/uninstall expression templates.
///
/// # Examples
///
/// ```
/// use framework_core::Element;
///
/// let element = Element::new("elemA")
///     .with_tag("experimental")
///     .with_field("val", "42")
///     .with_install("set <<val>>")
///     .with_uninstall("unset <<val>>");
/// assert_eq!(element.fields.len(), 1);
/// assert_eq!(element.expressions.install, "set <<val>>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub expressions: Expressions,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            expressions: Expressions::default(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_field(mut self, id: impl Into<String>, data: impl Into<String>) -> Self {
        self.fields.push(Field::new(id, data));
        self
    }

    pub fn with_install(mut self, template: impl Into<String>) -> Self {
        self.expressions.install = template.into();
        self
    }

    pub fn with_uninstall(mut self, template: impl Into<String>) -> Self {
        self.expressions.uninstall = template.into();
        self
    }
}

/// Ordered group of elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }
}

/// Tagged group of sections; the unit stored in one definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

/// Named group of modules. Package names are unique within a framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }
}

/// Root of a framework definition.
///
/// # Examples
///
/// ```
/// use framework_core::{Framework, Package, Prefix, Release};
///
/// let framework = Framework::new(Release::new(1, 2, 0))
///     .with_prefix(Prefix::new("core", "CL", 0))
///     .with_package(Package::new("pkgA"));
/// assert_eq!(framework.packages.len(), 1);
/// assert_eq!(framework.release.to_string(), "1.2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Framework {
    pub release: Release,
    #[serde(default)]
    pub prefixes: Vec<Prefix>,
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Framework {
    pub fn new(release: Release) -> Self {
        Self {
            release,
            prefixes: Vec::new(),
            packages: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefixes.push(prefix);
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }
}
