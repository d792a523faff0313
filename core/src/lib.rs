//! Flattening and placeholder resolution for framework definitions.
//!
//! A framework is authored as a tree of packages, modules, sections, elements
//! and fields. This crate turns that tree into flat, globally-namespaced
//! lookup tables:
//!
//! - [`Framework`] and friends: the immutable entity tree.
//! - [`Namespace`]: fully-qualified names (`pkg.mod.sec.elem/field`).
//! - [`merge`] / [`insert_unique`]: collision-checked aggregation used at every
//!   level.
//! - [`TagFilter`]: excludes modules and elements from expression generation.
//! - [`Element::expression`]: local expansion of install/uninstall templates.
//! - [`build_prefix_table`]: `section -> prefix_version`.
//! - [`Unfolder`]: two-phase resolution of cross-references and prefixes.
//! - [`resolve`]: all of the above in one pass.
//!
//! Validation ([`validate_framework`]) catches names that would break the key
//! grammar before resolution.
//!
//! # Placeholders
//!
//! | Token | Resolved by |
//! |---|---|
//! | `<<val>>` | the authoring element's own field `val` |
//! | `<<pkg.mod.sec.elem/val>>` | any element's field, globally |
//! | `<<core>>` | the prefix table entry for section `core` |
//! | `<<prefix>>` | the prefix of the enclosing section |
//!
//! # Example
//!
//! ```
//! use framework_core::*;
//!
//! let framework = Framework::new(Release::new(1, 2, 0))
//!     .with_prefix(Prefix::new("core", "CL", 0))
//!     .with_package(Package::new("pkgA").with_module(
//!         Module::new("modA").with_section(Section::new("secA").with_element(
//!             Element::new("elemA")
//!                 .with_field("val", "42")
//!                 .with_install("set <<val>> with <<core>>"),
//!         )),
//!     ));
//!
//! let resolution = resolve(&framework, &ResolveOptions::default()).unwrap();
//! assert_eq!(resolution.install["pkgA.modA.secA.elemA"], "set 42 with CL_1.2.0");
//! ```

mod aggregate;
mod error;
mod expression;
mod filter;
mod flatten;
mod namespace;
mod placeholder;
mod prefix;
mod resolve;
mod types;
mod unfold;
mod validate;

pub use aggregate::{FlatMap, insert_unique, merge};
pub use error::{FrameworkError, Result};
pub use expression::{ExpressionKind, qualify_shorthand, substitute_local};
pub use filter::{TagFilter, Tagged, is_filtered};
pub use namespace::{FIELD_SEPARATOR, NAME_SEPARATOR, Namespace, field_key, qualify};
pub use placeholder::{
    SECTION_PREFIX_KEYWORD, expand_section_prefix, has_field_reference, has_prefix_reference,
    placeholder,
};
pub use prefix::{PrefixTable, build_prefix_table, prefix_with_version};
pub use resolve::{Resolution, ResolveOptions, resolve};
pub use types::*;
pub use unfold::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PASSES, ResolveMode, Unfolder};
pub use validate::{ValidationError, validate_framework};
