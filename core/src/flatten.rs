//! Tree flattening into globally-namespaced maps.
//!
//! Each level walks its children in declaration order, passes its own
//! [`Namespace`] down, and merges the children's output with the
//! collision-checked [`merge`]. Three views are produced:
//!
//! - **fields**: `pkg.mod.sec.elem/id -> data`
//! - **elements**: `pkg.mod.sec.elem -> pkg.mod.sec.elem`
//! - **expressions**: `pkg.mod.sec.elem -> expression` for one
//!   [`ExpressionKind`], skipping modules and elements matched by the
//!   [`TagFilter`].

use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::aggregate::{insert_unique, merge};
use crate::error::Result;
use crate::placeholder::expand_section_prefix;
use crate::{
    Element, ExpressionKind, FlatMap, Framework, Module, Namespace, Package, Section, TagFilter,
};

/// Owner name reported for collisions between packages.
pub(crate) const FRAMEWORK_OWNER: &str = "framework";

impl Element {
    /// Returns this element's fields keyed by `pkg.mod.sec.elem/id`.
    ///
    /// `<<prefix>>` in field data is rewritten to the enclosing section's
    /// prefix reference.
    pub fn fields(&self, section: &Namespace) -> Result<FlatMap> {
        let namespace = section.child(&self.name);
        let mut output = FlatMap::new();
        for field in &self.fields {
            insert_unique(
                &mut output,
                namespace.field_key(&field.id),
                expand_section_prefix(&field.data, section.leaf()),
                namespace.as_str(),
            )?;
        }
        Ok(output)
    }
}

impl Section {
    pub fn fields(&self, module: &Namespace) -> Result<FlatMap> {
        let namespace = module.child(&self.name);
        self.elements.iter().try_fold(FlatMap::new(), |output, element| {
            merge(output, element.fields(&namespace)?, namespace.as_str())
        })
    }

    pub fn elements(&self, module: &Namespace) -> Result<FlatMap> {
        let namespace = module.child(&self.name);
        let mut output = FlatMap::new();
        for element in &self.elements {
            let name = namespace.child(&element.name).into_string();
            insert_unique(&mut output, name.clone(), name, namespace.as_str())?;
        }
        Ok(output)
    }

    pub fn expressions(
        &self,
        kind: ExpressionKind,
        module: &Namespace,
        filter: &TagFilter,
    ) -> Result<FlatMap> {
        let namespace = module.child(&self.name);
        let mut output = FlatMap::new();
        for element in &self.elements {
            let name = namespace.child(&element.name);
            if filter.excludes(element) {
                debug!(element = %name, %kind, "Skipping filtered element");
                continue;
            }
            let expression = element.expression(kind, &namespace)?;
            insert_unique(&mut output, name.into_string(), expression, namespace.as_str())?;
        }
        Ok(output)
    }
}

impl Module {
    pub fn fields(&self, package: &Namespace) -> Result<FlatMap> {
        let namespace = package.child(&self.name);
        self.sections.iter().try_fold(FlatMap::new(), |output, section| {
            merge(output, section.fields(&namespace)?, namespace.as_str())
        })
    }

    pub fn elements(&self, package: &Namespace) -> Result<FlatMap> {
        let namespace = package.child(&self.name);
        self.sections.iter().try_fold(FlatMap::new(), |output, section| {
            merge(output, section.elements(&namespace)?, namespace.as_str())
        })
    }

    /// Generates expressions for every section, or nothing if the module
    /// itself is filtered.
    pub fn expressions(
        &self,
        kind: ExpressionKind,
        package: &Namespace,
        filter: &TagFilter,
    ) -> Result<FlatMap> {
        let namespace = package.child(&self.name);
        if filter.excludes(self) {
            debug!(module = %namespace, %kind, "Skipping filtered module");
            return Ok(FlatMap::new());
        }
        self.sections.iter().try_fold(FlatMap::new(), |output, section| {
            merge(
                output,
                section.expressions(kind, &namespace, filter)?,
                namespace.as_str(),
            )
        })
    }
}

impl Package {
    pub fn namespace(&self) -> Namespace {
        Namespace::root(self.name.as_str())
    }

    pub fn fields(&self) -> Result<FlatMap> {
        let namespace = self.namespace();
        self.modules.iter().try_fold(FlatMap::new(), |output, module| {
            merge(output, module.fields(&namespace)?, &self.name)
        })
    }

    pub fn elements(&self) -> Result<FlatMap> {
        let namespace = self.namespace();
        self.modules.iter().try_fold(FlatMap::new(), |output, module| {
            merge(output, module.elements(&namespace)?, &self.name)
        })
    }

    pub fn expressions(&self, kind: ExpressionKind, filter: &TagFilter) -> Result<FlatMap> {
        let namespace = self.namespace();
        self.modules.iter().try_fold(FlatMap::new(), |output, module| {
            merge(output, module.expressions(kind, &namespace, filter)?, &self.name)
        })
    }
}

impl Framework {
    /// Flattens every field of every package.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::DuplicateKey`](crate::FrameworkError::DuplicateKey)
    /// for the first collision found in declaration order.
    pub fn fields(&self) -> Result<FlatMap> {
        Traversal::Sequential.collect(&self.packages, Package::fields)
    }

    /// Lists every element by its fully-qualified name.
    pub fn elements(&self) -> Result<FlatMap> {
        Traversal::Sequential.collect(&self.packages, Package::elements)
    }

    /// Generates the `kind` expression of every element not excluded by
    /// `filter`.
    pub fn expressions(&self, kind: ExpressionKind, filter: &TagFilter) -> Result<FlatMap> {
        Traversal::Sequential.collect(&self.packages, |package| {
            package.expressions(kind, filter)
        })
    }
}

/// Package-level traversal strategy.
///
/// The parallel variant computes per-package maps on a rayon pool, then
/// merges them sequentially in declaration order so that duplicate-key
/// errors match the sequential path exactly.
pub(crate) enum Traversal {
    Sequential,
    Parallel(ThreadPool),
}

impl Traversal {
    /// `jobs == 0` selects sequential traversal.
    pub(crate) fn with_jobs(jobs: usize) -> Self {
        if jobs == 0 {
            return Self::Sequential;
        }
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => Self::Parallel(pool),
            Err(err) => {
                warn!(jobs, error = %err, "Failed to build thread pool, traversing sequentially");
                Self::Sequential
            }
        }
    }

    pub(crate) fn collect<F>(&self, packages: &[Package], flatten: F) -> Result<FlatMap>
    where
        F: Fn(&Package) -> Result<FlatMap> + Sync,
    {
        match self {
            Self::Sequential => packages.iter().try_fold(FlatMap::new(), |output, package| {
                merge(output, flatten(package)?, FRAMEWORK_OWNER)
            }),
            Self::Parallel(pool) => {
                let results: Vec<Result<FlatMap>> =
                    pool.install(|| packages.par_iter().map(&flatten).collect());
                results.into_iter().try_fold(FlatMap::new(), |output, result| {
                    merge(output, result?, FRAMEWORK_OWNER)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameworkError;

    fn element(name: &str, value: &str) -> Element {
        Element::new(name)
            .with_field("id", value)
            .with_install(format!("add {name} <<id>>"))
            .with_uninstall(format!("rm {name}"))
    }

    fn framework() -> Framework {
        Framework::default()
            .with_package(
                Package::new("pkgA").with_module(
                    Module::new("modA")
                        .with_section(Section::new("secA").with_element(element("x", "1")))
                        .with_section(Section::new("secB").with_element(element("x", "2"))),
                ),
            )
            .with_package(
                Package::new("pkgB").with_module(
                    Module::new("modB")
                        .with_tag("legacy")
                        .with_section(Section::new("secC").with_element(element("y", "3"))),
                ),
            )
    }

    #[test]
    fn test_fields_are_fully_qualified() {
        let fields = framework().fields().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields["pkgA.modA.secA.x/id"], "1");
        assert_eq!(fields["pkgA.modA.secB.x/id"], "2");
        assert_eq!(fields["pkgB.modB.secC.y/id"], "3");
    }

    #[test]
    fn test_elements_map_name_to_itself() {
        let elements = framework().elements().unwrap();
        let names: Vec<&str> = elements.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["pkgA.modA.secA.x", "pkgA.modA.secB.x", "pkgB.modB.secC.y"]
        );
        assert_eq!(elements["pkgA.modA.secA.x"], "pkgA.modA.secA.x");
    }

    #[test]
    fn test_flattening_is_deterministic() {
        let framework = framework();
        assert_eq!(framework.fields().unwrap(), framework.fields().unwrap());
        assert_eq!(framework.elements().unwrap(), framework.elements().unwrap());
    }

    #[test]
    fn test_filtered_module_skips_expressions_only() {
        let framework = framework();
        let filter = TagFilter::from_iter(["legacy"]);
        let install = framework
            .expressions(ExpressionKind::Install, &filter)
            .unwrap();
        assert_eq!(install.len(), 2);
        assert_eq!(install["pkgA.modA.secA.x"], "add x 1");
        assert!(!install.contains_key("pkgB.modB.secC.y"));
        assert!(framework.fields().unwrap().contains_key("pkgB.modB.secC.y/id"));
    }

    #[test]
    fn test_elements_in_unfiltered_module_are_checked_individually() {
        let framework = Framework::default().with_package(
            Package::new("p").with_module(
                Module::new("m").with_section(
                    Section::new("s")
                        .with_element(element("keep", "1"))
                        .with_element(element("drop", "2").with_tag("beta")),
                ),
            ),
        );
        let filter = TagFilter::from_iter(["beta"]);
        let uninstall = framework
            .expressions(ExpressionKind::Uninstall, &filter)
            .unwrap();
        assert_eq!(uninstall.keys().collect::<Vec<_>>(), vec!["p.m.s.keep"]);
    }

    #[test]
    fn test_duplicate_element_in_section() {
        let framework = Framework::default().with_package(
            Package::new("pkgA").with_module(
                Module::new("modA").with_section(
                    Section::new("secA")
                        .with_element(element("x", "1"))
                        .with_element(element("x", "2")),
                ),
            ),
        );
        let err = framework.elements().unwrap_err();
        assert_eq!(
            err,
            FrameworkError::DuplicateKey {
                key: "pkgA.modA.secA.x".into(),
                owner: "pkgA.modA.secA".into(),
            }
        );
        assert!(framework.fields().is_err());
        assert!(framework
            .expressions(ExpressionKind::Install, &TagFilter::new())
            .is_err());
    }

    #[test]
    fn test_duplicate_package_is_reported_by_framework() {
        let package = Package::new("pkgA").with_module(
            Module::new("modA").with_section(Section::new("secA").with_element(element("x", "1"))),
        );
        let framework = Framework::default()
            .with_package(package.clone())
            .with_package(package);
        let err = framework.fields().unwrap_err();
        assert_eq!(
            err,
            FrameworkError::DuplicateKey {
                key: "pkgA.modA.secA.x/id".into(),
                owner: FRAMEWORK_OWNER.into(),
            }
        );
    }

    #[test]
    fn test_parallel_traversal_matches_sequential() {
        let framework = framework();
        let parallel = Traversal::with_jobs(2);
        assert_eq!(
            parallel.collect(&framework.packages, Package::fields).unwrap(),
            framework.fields().unwrap()
        );

        let package = framework.packages[0].clone();
        let duplicated = framework.with_package(package);
        let sequential_err = duplicated.fields().unwrap_err();
        let parallel_err = parallel
            .collect(&duplicated.packages, Package::fields)
            .unwrap_err();
        assert_eq!(sequential_err, parallel_err);
    }
}
