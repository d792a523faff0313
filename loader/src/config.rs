//! Resolution configuration file.
//!
//! Controls which tags are filtered out of expression generation and how the
//! unfolder treats unresolved references and runaway substitution.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! tag_filter:
//!   - experimental
//! resolution:
//!   mode: strict
//!   max_depth: 64
//!   max_passes: 16
//!   jobs: 4
//! ```
//!
//! Every key is optional; missing keys take the defaults of
//! [`ResolveOptions`].

use std::io::{BufReader, BufWriter};
use std::path::Path;

use framework_core::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_PASSES, ResolveMode, ResolveOptions, TagFilter,
};
use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};

/// Unfolding and traversal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// `lenient` replaces unresolved references with `""`; `strict` fails.
    pub mode: ResolveMode,
    /// Bound on nested field references.
    pub max_depth: usize,
    /// Bound on substitution passes per value.
    pub max_passes: usize,
    /// Package traversal threads (`0` = sequential).
    pub jobs: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            mode: ResolveMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_passes: DEFAULT_MAX_PASSES,
            jobs: 0,
        }
    }
}

/// Top-level resolution configuration.
///
/// # Examples
///
/// ```
/// use framework_core::ResolveMode;
/// use framework_loader::ResolveConfig;
///
/// let config: ResolveConfig = serde_yaml::from_str("tag_filter: [beta]\n").unwrap();
/// let options = config.to_options();
/// assert!(options.tag_filter.contains("beta"));
/// assert_eq!(options.mode, ResolveMode::Lenient);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Configuration format version (e.g. `"1.0"`).
    pub version: String,
    /// Tags excluded from install/uninstall generation.
    pub tag_filter: Vec<String>,
    pub resolution: ResolutionConfig,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            tag_filter: Vec::new(),
            resolution: ResolutionConfig::default(),
        }
    }
}

impl ResolveConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Io`] if the file cannot be read, or
    /// [`LoaderError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| LoaderError::io(path, e))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).map_err(|e| LoaderError::yaml(path, e))
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Io`] if the file cannot be written, or
    /// [`LoaderError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| LoaderError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self).map_err(|e| LoaderError::yaml(path, e))
    }

    /// Converts into the options consumed by [`framework_core::resolve`].
    pub fn to_options(&self) -> ResolveOptions {
        ResolveOptions {
            tag_filter: self.tag_filter.iter().cloned().collect::<TagFilter>(),
            mode: self.resolution.mode,
            max_depth: self.resolution.max_depth,
            max_passes: self.resolution.max_passes,
            jobs: self.resolution.jobs,
        }
    }
}
