//! Framework loading from a directory tree or a single bundle document.
//!
//! # Directory layout
//!
//! ```text
//! <root>/
//!   framework.yaml          # release + prefixes
//!   packages/
//!     <package>/            # one package per directory, named after it
//!       <module>.yaml       # one module per file
//!       <group>/            # nested directory: more module files
//!         <module>.yaml
//! ```
//!
//! Entries are read in file-name order so the resulting tree, and any
//! duplicate-key error raised while resolving it, is the same on every run.
//!
//! # Loading patterns
//!
//! ```no_run
//! use framework_loader::FrameworkLoader;
//!
//! // Directory tree
//! let framework = FrameworkLoader::from_dir("frameworks/13.1.4/").unwrap();
//!
//! // Single YAML or JSON document holding the whole tree
//! let framework = FrameworkLoader::from_bundle("framework.json").unwrap();
//!
//! // Either, depending on what the path points at
//! let framework = FrameworkLoader::load("frameworks/13.1.4/").unwrap();
//! ```

use std::path::{Path, PathBuf};

use framework_core::{Framework, Module, Package, Prefix, Release};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{LoaderError, Result};

/// Name of the framework header file inside a framework directory.
pub const FRAMEWORK_FILE: &str = "framework.yaml";

/// Name of the directory holding one subdirectory per package.
pub const PACKAGES_DIR: &str = "packages";

/// Describes where a framework was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameworkSource {
    /// A framework directory tree.
    Directory(PathBuf),
    /// A single YAML or JSON document.
    Bundle(PathBuf),
}

impl FrameworkSource {
    /// Classifies `path` by whether it is a directory.
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Bundle(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Bundle(path) => path,
        }
    }
}

/// Contents of `framework.yaml`; packages come from the directory tree.
#[derive(Debug, Deserialize)]
struct FrameworkHeader {
    release: Release,
    #[serde(default)]
    prefixes: Vec<Prefix>,
}

/// Reads framework definitions from disk.
///
/// The loader only builds the tree; it never resolves placeholders or checks
/// key uniqueness.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameworkLoader;

impl FrameworkLoader {
    /// Loads from a directory tree or a bundle file, whichever `path` is.
    ///
    /// # Errors
    ///
    /// See [`from_dir`](Self::from_dir) and [`from_bundle`](Self::from_bundle).
    pub fn load(path: impl AsRef<Path>) -> Result<Framework> {
        match FrameworkSource::detect(path.as_ref()) {
            FrameworkSource::Directory(path) => Self::from_dir(path),
            FrameworkSource::Bundle(path) => Self::from_bundle(path),
        }
    }

    /// Loads a framework directory tree.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::MissingFrameworkFile`] if `framework.yaml` does
    /// not exist, [`LoaderError::Io`] if a file or directory cannot be read,
    /// or [`LoaderError::Yaml`] if any document is malformed.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Framework> {
        let root = root.as_ref();
        let header_path = root.join(FRAMEWORK_FILE);
        if !header_path.is_file() {
            return Err(LoaderError::MissingFrameworkFile(header_path));
        }
        let header: FrameworkHeader = read_yaml(&header_path)?;

        let mut framework = Framework::new(header.release);
        framework.prefixes = header.prefixes;

        for path in sorted_entries(&root.join(PACKAGES_DIR))? {
            if path.is_dir() {
                framework.packages.push(load_package(&path)?);
            }
        }

        debug!(
            root = %root.display(),
            release = %framework.release,
            packages = framework.packages.len(),
            "Loaded framework directory"
        );
        Ok(framework)
    }

    /// Loads a whole framework tree from one YAML or JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnsupportedFormat`] for unknown extensions,
    /// [`LoaderError::Io`] if the file cannot be read, or
    /// [`LoaderError::Yaml`] / [`LoaderError::Json`] if it is malformed.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Framework> {
        let path = path.as_ref();
        let framework = match extension(path) {
            Some("json") => read_json(path)?,
            Some("yaml" | "yml") => read_yaml(path)?,
            _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        };
        debug!(path = %path.display(), "Loaded framework bundle");
        Ok(framework)
    }
}

fn load_package(dir: &Path) -> Result<Package> {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut package = Package::new(name);

    for path in sorted_entries(dir)? {
        if path.is_dir() {
            package.modules.extend(load_module_dir(&path)?);
        } else if is_module_file(&path) {
            package.modules.push(load_module(&path)?);
        }
    }
    Ok(package)
}

/// Loads the module files directly inside `dir`; deeper directories are ignored.
fn load_module_dir(dir: &Path) -> Result<Vec<Module>> {
    sorted_entries(dir)?
        .into_iter()
        .filter(|path| path.is_file() && is_module_file(path))
        .map(|path| load_module(&path))
        .collect()
}

fn load_module(path: &Path) -> Result<Module> {
    let module: Module = read_yaml(path)?;
    debug!(path = %path.display(), module = %module.name, "Loaded module");
    Ok(module)
}

fn is_module_file(path: &Path) -> bool {
    matches!(extension(path), Some("yaml" | "yml"))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoaderError::io(dir, e))?;
    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| LoaderError::io(dir, e))?;
    paths.sort();
    Ok(paths)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path).map_err(|e| LoaderError::io(path, e))?;
    let reader = std::io::BufReader::new(file);
    serde_yaml::from_reader(reader).map_err(|e| LoaderError::yaml(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path).map_err(|e| LoaderError::io(path, e))?;
    let reader = std::io::BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| LoaderError::json(path, e))
}
