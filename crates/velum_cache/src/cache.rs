//! Request-scoped fragment cache facade.
//!
//! `FragmentCache` ties the dependency tree, fingerprint computation, and
//! capture session into a single interface for a render pass. It owns the
//! tree for the duration of a request; the store, filesystem, and view
//! finder are collaborators supplied at construction.

use std::fmt;
use std::path::Path;

use velum_common::Fingerprint;

use crate::error::CacheError;
use crate::fingerprint::{fragment_fingerprint, CacheKeySource};
use crate::finder::ViewFinder;
use crate::fs::Filesystem;
use crate::session::{Capture, FragmentSession};
use crate::store::CacheStore;
use crate::tree::DependencyTree;

/// Outcome of a fragment lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The stored content was reused; the fragment was not rendered.
    Hit,
    /// The fragment was rendered, captured, and committed to the store.
    Miss,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// Dependency-aware fragment cache for one request.
///
/// Concurrent requests each hold their own instance and their own
/// in-memory copy of the dependency tree; concurrent saves are
/// last-writer-wins and callers needing cross-request consistency must
/// serialize saves externally.
#[derive(Debug)]
pub struct FragmentCache<S, F, V> {
    store: S,
    fs: F,
    finder: V,
    tree: DependencyTree,
}

impl<S, F, V> FragmentCache<S, F, V>
where
    S: CacheStore,
    F: Filesystem,
    V: ViewFinder,
{
    /// Opens the cache, loading the dependency tree from `tree_path`.
    ///
    /// Fails with [`CacheError::MissingTreeFile`] if the tree file is
    /// absent; a malformed document degrades to an empty tree.
    pub fn open(store: S, fs: F, finder: V, tree_path: &Path) -> Result<Self, CacheError> {
        let tree = DependencyTree::load(&fs, tree_path)?;
        Ok(Self {
            store,
            fs,
            finder,
            tree,
        })
    }

    /// Computes the fingerprint of the fragment `(model, view, serial)`.
    pub fn fingerprint(
        &self,
        model: &dyn CacheKeySource,
        view: &str,
        serial: u32,
    ) -> Result<Fingerprint, CacheError> {
        fragment_fingerprint(model, view, serial, &self.tree, &self.finder, &self.fs)
    }

    /// Creates an idle capture session for the fragment.
    pub fn session(
        &self,
        model: &dyn CacheKeySource,
        view: &str,
        serial: u32,
    ) -> Result<FragmentSession, CacheError> {
        Ok(FragmentSession::new(self.fingerprint(model, view, serial)?))
    }

    /// Returns the fragment content, rendering only on a miss.
    ///
    /// The full control flow of one fragment: compute the fingerprint and
    /// probe the store. On a hit the stored content is returned and
    /// `render` never runs. On a miss a capture starts, `render` writes
    /// into it (and may register newly discovered partials on the lent
    /// dependency tree), and the captured text is committed under the
    /// fingerprint with the fixed TTL. Dependencies registered during the
    /// render shape the *next* pass's fingerprint, not this one.
    pub fn render_fragment<R>(
        &mut self,
        model: &dyn CacheKeySource,
        view: &str,
        serial: u32,
        render: R,
    ) -> Result<(String, CacheStatus), CacheError>
    where
        R: FnOnce(&mut Capture, &mut DependencyTree) -> Result<(), CacheError>,
    {
        let fingerprint = self.fingerprint(model, view, serial)?;
        let mut session = FragmentSession::new(fingerprint);

        if !session.expired(&self.store)? {
            return Ok((
                session.into_content().unwrap_or_default(),
                CacheStatus::Hit,
            ));
        }

        let mut capture = session.start()?;
        match render(&mut capture, &mut self.tree) {
            Ok(()) => {
                session.stop(capture, &self.store)?;
                Ok((
                    session.into_content().unwrap_or_default(),
                    CacheStatus::Miss,
                ))
            }
            Err(e) => {
                session.abort(capture);
                Err(e)
            }
        }
    }

    /// Records that `(view, serial)` depends on `dependency`.
    pub fn add_dependency(&mut self, view: &str, serial: u32, dependency: &str) {
        self.tree.add_dependency(view, serial, dependency);
    }

    /// Flushes the dependency tree to its backing file if it was mutated.
    ///
    /// Called once at the end of a render pass.
    pub fn save_dependencies(&self) -> Result<(), CacheError> {
        self.tree.save(&self.fs)
    }

    /// Returns the dependency tree.
    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }

    /// Returns the external store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
