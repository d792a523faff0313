//! Prefix table construction.
//!
//! Each [`Prefix`] becomes one `section -> "<prefix>_<major.minor.patch>"`
//! entry. Prefixes are inserted in ascending processing order; a section may
//! only appear once.

use crate::aggregate::insert_unique;
use crate::error::Result;
use crate::{FlatMap, Framework, Prefix, Release};

/// Owner name reported for duplicate prefix sections.
pub(crate) const PREFIX_OWNER: &str = "prefixes";

/// Mapping from section reference to versioned prefix.
pub type PrefixTable = FlatMap;

/// Combines a prefix string with a release version.
pub fn prefix_with_version(prefix: &str, release: &Release) -> String {
    format!("{prefix}_{release}")
}

/// Builds the prefix table for `release`.
///
/// # Examples
///
/// ```
/// use framework_core::{Prefix, Release, build_prefix_table};
///
/// let table = build_prefix_table(&[Prefix::new("core", "CL", 0)], &Release::new(1, 2, 0)).unwrap();
/// assert_eq!(table["core"], "CL_1.2.0");
/// ```
///
/// # Errors
///
/// Returns [`FrameworkError::DuplicateKey`](crate::FrameworkError::DuplicateKey)
/// if two prefixes share a section.
pub fn build_prefix_table(prefixes: &[Prefix], release: &Release) -> Result<PrefixTable> {
    let mut ordered: Vec<&Prefix> = prefixes.iter().collect();
    ordered.sort_by_key(|prefix| prefix.processing_order);

    let mut table = PrefixTable::new();
    for prefix in ordered {
        insert_unique(
            &mut table,
            prefix.section.clone(),
            prefix_with_version(&prefix.prefix, release),
            PREFIX_OWNER,
        )?;
    }
    Ok(table)
}

impl Framework {
    /// Builds the prefix table for this framework's release.
    pub fn prefix_table(&self) -> Result<PrefixTable> {
        build_prefix_table(&self.prefixes, &self.release)
    }
}
