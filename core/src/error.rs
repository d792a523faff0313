//! Error types for framework resolution.
//!
//! Every variant aborts the current resolution pass. Callers outside the core
//! decide whether to retry, log, or exit.

use thiserror::Error;

/// Errors raised while flattening or unfolding a framework.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameworkError {
    /// Two entities in the same aggregation scope produced the same key.
    #[error("duplicate key {key:?} found in {owner:?}")]
    DuplicateKey { key: String, owner: String },

    /// A chain of field references loops back onto itself.
    #[error("unresolvable reference cycle at {key:?}: {chain}")]
    UnresolvableCycle { key: String, chain: String },

    /// A placeholder names a key that does not exist (strict mode only).
    #[error("unresolved reference <<{reference}>> in {key:?}")]
    UnresolvedReference { key: String, reference: String },

    /// A reference chain is deeper than the configured bound.
    #[error("reference chain at {key:?} exceeds depth limit of {limit}")]
    DepthLimitExceeded { key: String, limit: usize },

    /// Substitution did not settle within the configured pass bound.
    #[error("substitution for {key:?} did not settle after {passes} passes")]
    PassLimitExceeded { key: String, passes: usize },
}

impl FrameworkError {
    pub(crate) fn duplicate(key: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::DuplicateKey {
            key: key.into(),
            owner: owner.into(),
        }
    }
}

/// Convenience alias for results with [`FrameworkError`].
pub type Result<T> = std::result::Result<T, FrameworkError>;
