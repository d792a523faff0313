//! Collision-checked merging of flattened maps.
//!
//! Every level of the tree combines its children's output with [`merge`] or
//! [`insert_unique`]. A key that is already present aborts the merge with
//! [`FrameworkError::DuplicateKey`]; the partially merged destination is
//! dropped by the caller, so no partial output escapes.
//!
//! # Example
//!
//! ```
//! use framework_core::{FlatMap, FrameworkError, merge};
//!
//! let mut first = FlatMap::new();
//! first.insert("pkgA.modA.secA.x/id".into(), "1".into());
//! let mut second = FlatMap::new();
//! second.insert("pkgA.modA.secA.x/id".into(), "2".into());
//!
//! let err = merge(first, second, "pkgA").unwrap_err();
//! assert!(matches!(err, FrameworkError::DuplicateKey { .. }));
//! ```

use std::collections::BTreeMap;

use crate::error::{FrameworkError, Result};

/// Flat, ordered mapping from fully-qualified key to value.
pub type FlatMap = BTreeMap<String, String>;

/// Inserts `key` into `destination`, rejecting a key that already exists.
///
/// `owner` names the entity whose scope is being aggregated and is reported
/// in the error.
pub fn insert_unique<V>(
    destination: &mut BTreeMap<String, V>,
    key: String,
    value: V,
    owner: &str,
) -> Result<()> {
    if destination.contains_key(&key) {
        return Err(FrameworkError::duplicate(key, owner));
    }
    destination.insert(key, value);
    Ok(())
}

/// Merges `source` into `destination`, stopping at the first duplicate key.
///
/// Keys are visited in `source` order, so the reported key is deterministic.
pub fn merge<V>(
    mut destination: BTreeMap<String, V>,
    source: BTreeMap<String, V>,
    owner: &str,
) -> Result<BTreeMap<String, V>> {
    for (key, value) in source {
        insert_unique(&mut destination, key, value, owner)?;
    }
    Ok(destination)
}
