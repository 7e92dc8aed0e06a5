//! Resolution of logical view and partial names to filesystem paths.
//!
//! Fingerprinting needs the modification time of every dependency, but
//! dependencies are recorded under the identifier the template used, which
//! may be a raw path or a logical name. A [`ViewFinder`] bridges the two.

use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::fs::Filesystem;

/// Resolves a view or partial identifier to a filesystem path.
pub trait ViewFinder {
    /// Resolves `name` to the path of its template source.
    fn find(&self, name: &str) -> Result<PathBuf, CacheError>;
}

impl<T: ViewFinder + ?Sized> ViewFinder for &T {
    fn find(&self, name: &str) -> Result<PathBuf, CacheError> {
        (**self).find(name)
    }
}

/// Finder for identifiers that already are filesystem paths.
///
/// Performs no lookup: the identifier is returned as a path verbatim. This
/// matches setups where templates reference each other by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFinder;

impl DirectFinder {
    /// Creates a new pass-through finder.
    pub fn new() -> Self {
        Self
    }
}

impl ViewFinder for DirectFinder {
    fn find(&self, name: &str) -> Result<PathBuf, CacheError> {
        Ok(PathBuf::from(name))
    }
}

/// Finder that searches configured root directories and extensions.
///
/// A dotted logical name (`partials.sidebar`) maps to a nested path
/// (`partials/sidebar`); each root is probed with each extension in order
/// and the first existing candidate wins. A name that is itself an
/// existing path short-circuits the search.
pub struct DiskFinder<F> {
    fs: F,
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl<F: Filesystem> DiskFinder<F> {
    /// Creates a finder over the given roots and extensions.
    pub fn new(
        fs: F,
        roots: impl IntoIterator<Item = impl Into<PathBuf>>,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            fs,
            roots: roots.into_iter().map(Into::into).collect(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl<F: Filesystem> ViewFinder for DiskFinder<F> {
    fn find(&self, name: &str) -> Result<PathBuf, CacheError> {
        let raw = Path::new(name);
        if self.fs.exists(raw) {
            return Ok(raw.to_path_buf());
        }

        let relative = name.replace('.', "/");
        for root in &self.roots {
            for ext in &self.extensions {
                let candidate = root.join(format!("{relative}.{ext}"));
                if self.fs.exists(&candidate) {
                    return Ok(candidate);
                }
            }
        }

        Err(CacheError::ViewNotFound {
            name: name.to_string(),
        })
    }
}
