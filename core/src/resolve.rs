//! End-to-end resolution of a framework into literal lookup tables.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::flatten::Traversal;
use crate::unfold::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PASSES};
use crate::{ExpressionKind, FlatMap, Framework, PrefixTable, ResolveMode, TagFilter, Unfolder};

/// Settings for one resolution pass.
///
/// # Examples
///
/// ```
/// use framework_core::{ResolveMode, ResolveOptions, TagFilter};
///
/// let options = ResolveOptions::default()
///     .with_tag_filter(TagFilter::from_iter(["experimental"]))
///     .with_mode(ResolveMode::Strict);
/// assert_eq!(options.mode, ResolveMode::Strict);
/// assert_eq!(options.jobs, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Modules and elements carrying any of these tags get no expressions.
    pub tag_filter: TagFilter,
    pub mode: ResolveMode,
    /// Bound on nested field references.
    pub max_depth: usize,
    /// Bound on substitution passes per value.
    pub max_passes: usize,
    /// Package traversal threads; `0` traverses sequentially.
    pub jobs: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            tag_filter: TagFilter::default(),
            mode: ResolveMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_passes: DEFAULT_MAX_PASSES,
            jobs: 0,
        }
    }
}

impl ResolveOptions {
    pub fn with_tag_filter(mut self, tag_filter: TagFilter) -> Self {
        self.tag_filter = tag_filter;
        self
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn unfolder(&self) -> Unfolder {
        Unfolder::new()
            .with_mode(self.mode)
            .with_max_depth(self.max_depth)
            .with_max_passes(self.max_passes)
    }
}

/// Fully resolved views of a framework.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    /// `pkg.mod.sec.elem/id -> literal value`
    pub fields: FlatMap,
    /// `pkg.mod.sec.elem -> pkg.mod.sec.elem`
    pub elements: FlatMap,
    /// `pkg.mod.sec.elem -> literal install expression`
    pub install: FlatMap,
    /// `pkg.mod.sec.elem -> literal uninstall expression`
    pub uninstall: FlatMap,
    /// `section -> prefix_version`
    pub prefixes: PrefixTable,
}

impl Resolution {
    pub fn expressions(&self, kind: ExpressionKind) -> &FlatMap {
        match kind {
            ExpressionKind::Install => &self.install,
            ExpressionKind::Uninstall => &self.uninstall,
        }
    }
}

/// Flattens `framework` and unfolds every placeholder.
///
/// # Examples
///
/// ```
/// use framework_core::*;
///
/// let framework = Framework::new(Release::new(1, 2, 0))
///     .with_prefix(Prefix::new("core", "CL", 0))
///     .with_package(Package::new("pkgA").with_module(
///         Module::new("modA").with_section(Section::new("secA").with_element(
///             Element::new("elemA")
///                 .with_field("val", "42")
///                 .with_install("set <<val>> with <<core>>"),
///         )),
///     ));
///
/// let resolution = resolve(&framework, &ResolveOptions::default()).unwrap();
/// assert_eq!(resolution.install["pkgA.modA.secA.elemA"], "set 42 with CL_1.2.0");
/// assert_eq!(resolution.fields["pkgA.modA.secA.elemA/val"], "42");
/// ```
///
/// # Errors
///
/// Any [`FrameworkError`](crate::FrameworkError) aborts the whole pass; no
/// partial resolution is returned.
pub fn resolve(framework: &Framework, options: &ResolveOptions) -> Result<Resolution> {
    let traversal = Traversal::with_jobs(options.jobs);
    let packages = &framework.packages;

    let prefixes = framework.prefix_table()?;
    let fields = traversal.collect(packages, |package| package.fields())?;
    let elements = traversal.collect(packages, |package| package.elements())?;
    let install = traversal.collect(packages, |package| {
        package.expressions(ExpressionKind::Install, &options.tag_filter)
    })?;
    let uninstall = traversal.collect(packages, |package| {
        package.expressions(ExpressionKind::Uninstall, &options.tag_filter)
    })?;

    let unfolder = options.unfolder();
    let fields = unfolder.unfold(&fields, &prefixes)?;
    let install = unfolder.unfold_against(&install, &fields, &prefixes)?;
    let uninstall = unfolder.unfold_against(&uninstall, &fields, &prefixes)?;

    info!(
        release = %framework.release,
        fields = fields.len(),
        elements = elements.len(),
        install = install.len(),
        uninstall = uninstall.len(),
        "Resolved framework"
    );

    Ok(Resolution {
        fields,
        elements,
        install,
        uninstall,
        prefixes,
    })
}
