//! Canonical view identifiers independent of compiled-path prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical identifier of a view or partial template.
///
/// A view may be referred to by a logical name (`view1`), a source path
/// (`views/view1.blade.php`), or a compiled-cache path
/// (`/storage/compiled/view1.blade.php`). All three must address the same
/// dependency-tree entry, so identifiers are normalized to the final path
/// component with everything from the first `.` stripped.
///
/// `ViewId` keys the persisted dependency tree; it serializes as a plain
/// JSON string and orders lexicographically so serialized trees are
/// deterministic.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    /// Normalizes a raw view reference to its canonical identifier.
    ///
    /// Strips any directory prefix (both `/` and `\` separators) and any
    /// extension chain (`.blade.php`, `.html`, ...). An already-canonical
    /// name is returned unchanged.
    pub fn canonicalize(raw: &str) -> Self {
        let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
        let stem = match base.split_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => base,
        };
        Self(stem.to_string())
    }

    /// Returns the canonical identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_unchanged() {
        assert_eq!(ViewId::canonicalize("view1").as_str(), "view1");
    }

    #[test]
    fn strips_directory_prefix() {
        assert_eq!(ViewId::canonicalize("views/partials/header").as_str(), "header");
    }

    #[test]
    fn strips_extension_chain() {
        assert_eq!(ViewId::canonicalize("view1.blade.php").as_str(), "view1");
    }

    #[test]
    fn compiled_path_matches_source_path() {
        let compiled = ViewId::canonicalize("/storage/compiled/view1.blade.php");
        let source = ViewId::canonicalize("resources/views/view1.blade.php");
        assert_eq!(compiled, source);
    }

    #[test]
    fn windows_separators() {
        assert_eq!(
            ViewId::canonicalize(r"C:\views\sidebar.html").as_str(),
            "sidebar"
        );
    }

    #[test]
    fn hidden_file_style_name_kept() {
        // A leading dot does not leave an empty identifier behind.
        assert_eq!(ViewId::canonicalize(".env").as_str(), ".env");
    }

    #[test]
    fn serde_as_plain_string() {
        let id = ViewId::canonicalize("view1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"view1\"");
        let back: ViewId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
