//! Dependency-aware view-fragment caching.
//!
//! This crate caches rendered output fragments under a fingerprint derived
//! from a data model, the fragment's view identity, and a persisted,
//! incrementally-updated tree of partial-template dependencies. A fragment
//! is recomputed only when the view itself, its model, or any transitively
//! tracked dependency changes on disk.
//!
//! The crate does not render templates and does not own eviction policy;
//! the key-value store, filesystem, and view resolution are consumed
//! through the narrow [`CacheStore`], [`Filesystem`], and [`ViewFinder`]
//! traits.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod finder;
pub mod fingerprint;
pub mod fs;
pub mod session;
pub mod store;
pub mod tree;

pub use cache::{CacheStatus, FragmentCache};
pub use error::CacheError;
pub use finder::{DirectFinder, DiskFinder, ViewFinder};
pub use fingerprint::{fragment_fingerprint, CacheKeySource};
pub use fs::{Filesystem, MemoryFilesystem, OsFilesystem};
pub use session::{Capture, FragmentSession, FRAGMENT_TTL_SECS};
pub use store::{CacheStore, MemoryStore};
pub use tree::DependencyTree;
