//! The persisted dependency tree for view fragments.
//!
//! The tree records, per `(view, serial)` fragment, which other partials
//! the fragment's rendered output depends on. It is loaded once per
//! request from a JSON document, mutated in memory while rendering
//! discovers nested partials, and flushed back only when dirty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use velum_common::ViewId;

use crate::error::CacheError;
use crate::fs::Filesystem;

/// Per-view map from fragment serial to ordered dependency identifiers.
pub type SerialMap = BTreeMap<u32, Vec<String>>;

/// In-memory, JSON-persisted mapping from `(view, serial)` to the ordered
/// dependency identifiers of that fragment.
///
/// Ordering within a dependency list is significant: fingerprint parts are
/// emitted in stored order, so reordering would change every fingerprint
/// for the fragment. Entries only accumulate; stale dependencies are never
/// pruned (an accepted limitation, mitigated by store-side TTL expiry).
#[derive(Debug)]
pub struct DependencyTree {
    tree: BTreeMap<ViewId, SerialMap>,
    path: PathBuf,
    dirty: bool,
}

impl DependencyTree {
    /// Loads the tree from its backing file.
    ///
    /// The file must exist: absence is [`CacheError::MissingTreeFile`], and
    /// no default tree is silently created. A malformed or empty document
    /// degrades to an empty tree, preserving compatibility with documents
    /// written by earlier implementations.
    pub fn load(fs: &dyn Filesystem, path: &Path) -> Result<Self, CacheError> {
        if !fs.exists(path) {
            return Err(CacheError::MissingTreeFile {
                path: path.to_path_buf(),
            });
        }
        let raw = fs.read(path)?;
        Ok(Self {
            tree: decode_tree(&raw),
            path: path.to_path_buf(),
            dirty: false,
        })
    }

    /// Returns the dependency identifiers recorded for `(view, serial)`,
    /// in stored order. Absent entries yield an empty slice.
    pub fn dependencies(&self, view: &ViewId, serial: u32) -> &[String] {
        self.tree
            .get(view)
            .and_then(|serials| serials.get(&serial))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Records that the fragment `(view, serial)` depends on `dependency`.
    ///
    /// `view` is canonicalized before lookup. The dependency is appended
    /// only if not already present. The dirty flag is set unconditionally,
    /// even when the list is structurally unchanged: persistence is
    /// deliberately conservative.
    pub fn add_dependency(&mut self, view: &str, serial: u32, dependency: &str) {
        let deps = self
            .tree
            .entry(ViewId::canonicalize(view))
            .or_default()
            .entry(serial)
            .or_default();
        if !deps.iter().any(|d| d == dependency) {
            deps.push(dependency.to_string());
        }
        self.dirty = true;
    }

    /// Persists the tree to its backing file if it was mutated.
    ///
    /// Writes the whole document (not incremental) in the canonical
    /// object-of-objects form. A no-op when the tree is clean.
    pub fn save(&self, fs: &dyn Filesystem) -> Result<(), CacheError> {
        if !self.dirty {
            return Ok(());
        }
        let json =
            serde_json::to_string(&self.tree).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        fs.write(&self.path, &json)
    }

    /// Returns `true` if `add_dependency` was called since load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying mapping.
    pub fn as_map(&self) -> &BTreeMap<ViewId, SerialMap> {
        &self.tree
    }

    /// Returns `true` if no fragment has recorded dependencies.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

/// Leniently decodes a persisted tree document.
///
/// Accepts the canonical object-of-objects form (`{"view": {"0": ["dep"]}}`)
/// and the legacy object-of-arrays form (`{"view": [["dep0"], ["dep1"]]}`,
/// array position = serial). Anything else, including invalid JSON, decodes
/// to an empty tree.
fn decode_tree(raw: &str) -> BTreeMap<ViewId, SerialMap> {
    let Ok(Value::Object(views)) = serde_json::from_str::<Value>(raw) else {
        return BTreeMap::new();
    };

    let mut tree = BTreeMap::new();
    for (view, serials) in views {
        let mut per_view = SerialMap::new();
        match serials {
            Value::Object(map) => {
                for (serial, deps) in map {
                    if let (Ok(serial), Some(deps)) = (serial.parse::<u32>(), string_list(&deps))
                    {
                        per_view.insert(serial, deps);
                    }
                }
            }
            Value::Array(rows) => {
                for (serial, deps) in rows.iter().enumerate() {
                    if let Some(deps) = string_list(deps) {
                        per_view.insert(serial as u32, deps);
                    }
                }
            }
            _ => {}
        }
        if !per_view.is_empty() {
            tree.insert(ViewId::canonicalize(&view), per_view);
        }
    }
    tree
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFilesystem;

    fn load_tree(fs: &MemoryFilesystem) -> DependencyTree {
        DependencyTree::load(fs, Path::new("tree.json")).unwrap()
    }

    fn fs_with(raw: &str) -> MemoryFilesystem {
        let fs = MemoryFilesystem::new();
        fs.set_file("tree.json", raw, 0);
        fs
    }

    #[test]
    fn missing_file_is_hard_error() {
        let fs = MemoryFilesystem::new();
        let err = DependencyTree::load(&fs, Path::new("tree.json")).unwrap_err();
        assert!(matches!(err, CacheError::MissingTreeFile { .. }));
    }

    #[test]
    fn loads_canonical_form() {
        let fs = fs_with(r#"{"view1": {"1": ["bar"]}}"#);
        let tree = load_tree(&fs);
        let deps = tree.dependencies(&ViewId::canonicalize("view1"), 1);
        assert_eq!(deps, ["bar"]);
        assert!(!tree.is_dirty());
    }

    #[test]
    fn loads_legacy_array_form() {
        // Older documents index serials by array position.
        let fs = fs_with(r#"{"foo": [["bar"], ["baz"]]}"#);
        let tree = load_tree(&fs);
        let foo = ViewId::canonicalize("foo");
        assert_eq!(tree.dependencies(&foo, 0), ["bar"]);
        assert_eq!(tree.dependencies(&foo, 1), ["baz"]);
    }

    #[test]
    fn malformed_document_degrades_to_empty() {
        for raw in ["not json {{{", "", "42", r#"["a","b"]"#, r#"{"v": 7}"#] {
            let fs = fs_with(raw);
            let tree = load_tree(&fs);
            assert!(tree.is_empty(), "expected empty tree for {raw:?}");
        }
    }

    #[test]
    fn absent_entry_yields_empty_slice() {
        let fs = fs_with("{}");
        let tree = load_tree(&fs);
        assert!(tree.dependencies(&ViewId::canonicalize("nope"), 0).is_empty());
    }

    #[test]
    fn add_dependency_appends_to_existing_list() {
        let fs = fs_with(r#"{"foo": {"0": ["bar"]}}"#);
        let mut tree = load_tree(&fs);

        tree.add_dependency("foo", 0, "zigzag");

        assert_eq!(
            tree.dependencies(&ViewId::canonicalize("foo"), 0),
            ["bar", "zigzag"]
        );
        assert!(tree.is_dirty());
    }

    #[test]
    fn add_dependency_creates_singleton_list() {
        let fs = fs_with("{}");
        let mut tree = load_tree(&fs);

        tree.add_dependency("bear", 0, "nah");

        assert_eq!(tree.dependencies(&ViewId::canonicalize("bear"), 0), ["nah"]);
    }

    #[test]
    fn add_dependency_ignores_duplicates() {
        let fs = fs_with("{}");
        let mut tree = load_tree(&fs);

        tree.add_dependency("foo", 0, "zigzag");
        tree.add_dependency("foo", 0, "zigzag");

        assert_eq!(tree.dependencies(&ViewId::canonicalize("foo"), 0).len(), 1);
    }

    #[test]
    fn add_dependency_duplicate_still_marks_dirty() {
        let fs = fs_with(r#"{"foo": {"0": ["bar"]}}"#);
        let mut tree = load_tree(&fs);
        assert!(!tree.is_dirty());

        tree.add_dependency("foo", 0, "bar");

        assert!(tree.is_dirty());
    }

    #[test]
    fn add_dependency_canonicalizes_view() {
        let fs = fs_with("{}");
        let mut tree = load_tree(&fs);

        tree.add_dependency("/storage/compiled/foo.blade.php", 2, "bar");

        assert_eq!(tree.dependencies(&ViewId::canonicalize("foo"), 2), ["bar"]);
    }

    #[test]
    fn clean_tree_save_writes_nothing() {
        let fs = fs_with("sentinel - not json");
        let tree = load_tree(&fs);

        tree.save(&fs).unwrap();

        // The backing file is untouched, dirty-gated save skipped the write.
        assert_eq!(
            fs.read(Path::new("tree.json")).unwrap(),
            "sentinel - not json"
        );
    }

    #[test]
    fn dirty_tree_save_overwrites_whole_file() {
        let fs = fs_with(r#"{"foo": {"0": ["bar"]}}"#);
        let mut tree = load_tree(&fs);

        tree.add_dependency("foo", 0, "zigzag");
        tree.save(&fs).unwrap();

        assert_eq!(
            fs.read(Path::new("tree.json")).unwrap(),
            r#"{"foo":{"0":["bar","zigzag"]}}"#
        );
    }

    #[test]
    fn save_then_reload_roundtrips() {
        let fs = fs_with("{}");
        let mut tree = load_tree(&fs);
        tree.add_dependency("view1", 1, "bar");
        tree.add_dependency("view1", 1, "baz");
        tree.add_dependency("view2", 0, "qux");
        tree.save(&fs).unwrap();

        let reloaded = load_tree(&fs);
        assert_eq!(reloaded.as_map(), tree.as_map());
        let view1 = ViewId::canonicalize("view1");
        assert_eq!(reloaded.dependencies(&view1, 1), ["bar", "baz"]);
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn legacy_form_saves_in_canonical_form() {
        let fs = fs_with(r#"{"foo": [["bar"]]}"#);
        let mut tree = load_tree(&fs);
        tree.add_dependency("foo", 0, "zigzag");
        tree.save(&fs).unwrap();

        assert_eq!(
            fs.read(Path::new("tree.json")).unwrap(),
            r#"{"foo":{"0":["bar","zigzag"]}}"#
        );
    }
}
