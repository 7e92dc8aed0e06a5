//! Fragment identity computation.
//!
//! A fragment's identity concatenates identifiers and modification times
//! rather than content hashes: fingerprinting is O(dependency count) and
//! touches only filesystem metadata. The trade is mtime-granularity
//! invalidation instead of perfect content precision.

use velum_common::{Fingerprint, ViewId};

use crate::error::CacheError;
use crate::finder::ViewFinder;
use crate::fs::Filesystem;
use crate::tree::DependencyTree;

/// Capability of a model value to contribute a cache key.
///
/// The key is the per-entity identity component of the fragment
/// fingerprint, typically `"<table>/<id>-<updated_at>"` or similar.
pub trait CacheKeySource {
    /// Returns the model's cache key.
    fn cache_key(&self) -> String;
}

impl<T: CacheKeySource + ?Sized> CacheKeySource for &T {
    fn cache_key(&self) -> String {
        (**self).cache_key()
    }
}

/// Computes the fingerprint of the fragment `(model, view, serial)`.
///
/// The fingerprint is the SHA-1 digest of `.`-joined parts: the model
/// cache key, the canonical view identifier, the view's modification
/// time, then for every dependency recorded in `tree` for
/// `(view, serial)` — in stored order — the dependency identifier and its
/// modification time. Any mtime change to the view or a dependency
/// changes the digest, invalidating the stored fragment.
///
/// Resolution and stat failures propagate unchanged; a wrong answer here
/// would silently pin stale content.
pub fn fragment_fingerprint(
    model: &dyn CacheKeySource,
    view: &str,
    serial: u32,
    tree: &DependencyTree,
    finder: &dyn ViewFinder,
    fs: &dyn Filesystem,
) -> Result<Fingerprint, CacheError> {
    let id = ViewId::canonicalize(view);
    let view_mtime = fs.last_modified(&finder.find(view)?)?;

    let mut parts = vec![model.cache_key(), id.as_str().to_string(), view_mtime.to_string()];
    for dep in tree.dependencies(&id, serial) {
        let dep_mtime = fs.last_modified(&finder.find(dep)?)?;
        parts.push(dep.clone());
        parts.push(dep_mtime.to_string());
    }

    Ok(Fingerprint::digest(parts.join(".").as_bytes()))
}
