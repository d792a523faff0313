//! Loading of framework definitions and resolution configuration.
//!
//! This crate is the disk-facing side of the framework tooling: it reads a
//! framework directory tree (or a single bundle document) into a
//! [`framework_core::Framework`], and reads the YAML configuration that drives
//! a resolution pass. It does not resolve anything itself.
//!
//! # Quick start
//!
//! ```no_run
//! use framework_core::resolve;
//! use framework_loader::{FrameworkLoader, ResolveConfig};
//!
//! let framework = FrameworkLoader::load("frameworks/13.1.4/").unwrap();
//! let config = ResolveConfig::load("resolve.yaml").unwrap();
//! let resolution = resolve(&framework, &config.to_options()).unwrap();
//! println!("{} install expressions", resolution.install.len());
//! ```

mod config;
mod error;
mod loader;

pub use config::{ResolutionConfig, ResolveConfig};
pub use error::{LoaderError, Result};
pub use loader::{FRAMEWORK_FILE, FrameworkLoader, FrameworkSource, PACKAGES_DIR};
