//! Global placeholder unfolding.
//!
//! Runs after the whole tree has been flattened, in two phases:
//!
//! 1. **Field references** (`<<pkg.mod.sec.elem/id>>`) are resolved against a
//!    scope map. Resolution walks the reference graph depth-first with
//!    memoization, so every key is expanded once and a chain that revisits a
//!    key is reported as [`FrameworkError::UnresolvableCycle`] instead of
//!    looping. A value is rescanned until no field reference remains, since
//!    a substitution may splice a new token together.
//! 2. **Prefix references** (`<<section>>`) are replaced from the
//!    [`PrefixTable`], repeating until no prefix token remains or the pass
//!    bound is hit.
//!
//! # Unresolved references
//!
//! In [`ResolveMode::Lenient`] (the default) a token naming a key that does not
//! exist is replaced with the empty string and a warning is logged. This keeps
//! the long-standing behaviour of framework generators, and is easy to get
//! wrong: a typo in a reference silently produces an empty value. Use
//! [`ResolveMode::Strict`] to turn it into
//! [`FrameworkError::UnresolvedReference`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FrameworkError, Result};
use crate::placeholder::{
    FIELD_REFERENCE, PREFIX_REFERENCE, has_field_reference, has_prefix_reference, substitute,
};
use crate::{FlatMap, PrefixTable};

/// Default bound on nested field references.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on substitution passes per value, in either phase.
pub const DEFAULT_MAX_PASSES: usize = 16;

/// Treatment of placeholders whose target key is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Replace with the empty string.
    #[default]
    Lenient,
    /// Fail with [`FrameworkError::UnresolvedReference`].
    Strict,
}

/// Two-phase placeholder resolver.
///
/// # Examples
///
/// ```
/// use framework_core::{FlatMap, PrefixTable, Unfolder};
///
/// let mut fields = FlatMap::new();
/// fields.insert("p.m.s.a/name".into(), "<<core>>_<<p.m.s.b/name>>".into());
/// fields.insert("p.m.s.b/name".into(), "svc".into());
/// let mut prefixes = PrefixTable::new();
/// prefixes.insert("core".into(), "CL_1.0.0".into());
///
/// let unfolded = Unfolder::new().unfold(&fields, &prefixes).unwrap();
/// assert_eq!(unfolded["p.m.s.a/name"], "CL_1.0.0_svc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unfolder {
    mode: ResolveMode,
    max_depth: usize,
    max_passes: usize,
}

impl Default for Unfolder {
    fn default() -> Self {
        Self {
            mode: ResolveMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl Unfolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the maximum number of nested field references.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum number of substitution passes per value.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    /// Runs both phases on a map whose field references point into itself.
    pub fn unfold(&self, values: &FlatMap, prefixes: &PrefixTable) -> Result<FlatMap> {
        let resolved = self.resolve_field_references(values)?;
        self.resolve_prefixes(&resolved, prefixes)
    }

    /// Runs both phases on `values`, looking field references up in `scope`.
    ///
    /// Used for expressions, whose references target the field map.
    pub fn unfold_against(
        &self,
        values: &FlatMap,
        scope: &FlatMap,
        prefixes: &PrefixTable,
    ) -> Result<FlatMap> {
        let resolved = self.resolve_field_references_in(values, scope)?;
        self.resolve_prefixes(&resolved, prefixes)
    }

    /// Phase 1 over a self-referential map.
    pub fn resolve_field_references(&self, values: &FlatMap) -> Result<FlatMap> {
        let mut resolver = ReferenceResolver::new(self, values);
        values
            .iter()
            .map(|(key, raw)| Ok((key.clone(), resolver.resolve_key(key, raw, &mut Vec::new())?)))
            .collect()
    }

    /// Phase 1 over `values`, with references looked up in `scope`.
    pub fn resolve_field_references_in(&self, values: &FlatMap, scope: &FlatMap) -> Result<FlatMap> {
        let mut resolver = ReferenceResolver::new(self, scope);
        values
            .iter()
            .map(|(key, raw)| Ok((key.clone(), resolver.expand(raw, key, &mut Vec::new())?)))
            .collect()
    }

    /// Phase 2: replaces prefix tokens until none remain.
    pub fn resolve_prefixes(&self, values: &FlatMap, prefixes: &PrefixTable) -> Result<FlatMap> {
        values
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.resolve_prefix_value(key, value, prefixes)?)))
            .collect()
    }

    fn resolve_prefix_value(&self, key: &str, value: &str, prefixes: &PrefixTable) -> Result<String> {
        let mut current = value.to_string();
        let mut passes = 0;
        while has_prefix_reference(&current) {
            if passes == self.max_passes {
                return Err(FrameworkError::PassLimitExceeded {
                    key: key.to_string(),
                    passes,
                });
            }
            current = substitute(&current, &PREFIX_REFERENCE, |reference| {
                match prefixes.get(reference) {
                    Some(prefix) => Ok(prefix.clone()),
                    None => self.unresolved(key, reference),
                }
            })?;
            passes += 1;
        }
        Ok(current)
    }

    fn unresolved(&self, key: &str, reference: &str) -> Result<String> {
        match self.mode {
            ResolveMode::Lenient => {
                warn!(key, reference, "Unresolved reference replaced with empty string");
                Ok(String::new())
            }
            ResolveMode::Strict => Err(FrameworkError::UnresolvedReference {
                key: key.to_string(),
                reference: reference.to_string(),
            }),
        }
    }
}

/// Memoizing depth-first resolver over one scope map.
struct ReferenceResolver<'a> {
    unfolder: &'a Unfolder,
    scope: &'a FlatMap,
    resolved: HashMap<&'a str, String>,
}

impl<'a> ReferenceResolver<'a> {
    fn new(unfolder: &'a Unfolder, scope: &'a FlatMap) -> Self {
        Self {
            unfolder,
            scope,
            resolved: HashMap::new(),
        }
    }

    /// Resolves a scope key; `chain` holds the keys currently being expanded.
    fn resolve_key(&mut self, key: &'a str, raw: &'a str, chain: &mut Vec<&'a str>) -> Result<String> {
        if let Some(value) = self.resolved.get(key) {
            return Ok(value.clone());
        }
        if let Some(start) = chain.iter().position(|k| *k == key) {
            let cycle = chain[start..]
                .iter()
                .copied()
                .chain(std::iter::once(key))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(FrameworkError::UnresolvableCycle {
                key: key.to_string(),
                chain: cycle,
            });
        }
        if chain.len() > self.unfolder.max_depth {
            return Err(FrameworkError::DepthLimitExceeded {
                key: key.to_string(),
                limit: self.unfolder.max_depth,
            });
        }

        chain.push(key);
        let value = self.expand(raw, key, chain);
        chain.pop();

        let value = value?;
        self.resolved.insert(key, value.clone());
        Ok(value)
    }

    /// Replaces field references in `text` until none remain; `owner` is the
    /// key `text` belongs to.
    ///
    /// Substitution can compose a new token out of surrounding text, so the
    /// result is rescanned, at most `max_passes` times.
    fn expand(&mut self, text: &str, owner: &str, chain: &mut Vec<&'a str>) -> Result<String> {
        let scope = self.scope;
        let mut current = text.to_string();
        let mut passes = 0;
        while has_field_reference(&current) {
            if passes == self.unfolder.max_passes {
                return Err(FrameworkError::PassLimitExceeded {
                    key: owner.to_string(),
                    passes,
                });
            }
            current = substitute(&current, &FIELD_REFERENCE, |reference| {
                match scope.get_key_value(reference) {
                    Some((key, raw)) => self.resolve_key(key, raw, chain),
                    None => self.unfolder.unresolved(owner, reference),
                }
            })?;
            passes += 1;
        }
        Ok(current)
    }
}
