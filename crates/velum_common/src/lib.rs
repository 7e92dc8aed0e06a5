//! Shared foundational types for the velum view-fragment cache.
//!
//! This crate provides the content-addressed fragment fingerprint and the
//! canonical view identifier used as keys throughout the cache.

#![warn(missing_docs)]

pub mod hash;
pub mod view;

pub use hash::Fingerprint;
pub use view::ViewId;
