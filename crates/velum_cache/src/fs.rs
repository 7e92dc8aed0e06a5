//! The narrow filesystem interface consumed by the cache.
//!
//! The cache only needs existence checks, whole-file text read/write, and
//! modification-time lookup. [`OsFilesystem`] backs these with `std::fs`;
//! [`MemoryFilesystem`] is an in-memory implementation with settable
//! modification times for tests and embedded use.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::UNIX_EPOCH;

use crate::error::CacheError;

/// Filesystem operations required by the fragment cache.
///
/// Modification times are Unix seconds. A stat failure is an error, not a
/// cache miss: an unknown mtime would silently poison every fingerprint
/// derived from it.
pub trait Filesystem {
    /// Returns `true` if a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the file at `path` as UTF-8 text.
    fn read(&self, path: &Path) -> Result<String, CacheError>;

    /// Writes `contents` to `path`, replacing any existing file.
    fn write(&self, path: &Path, contents: &str) -> Result<(), CacheError>;

    /// Returns the last modification time of `path` in Unix seconds.
    fn last_modified(&self, path: &Path) -> Result<u64, CacheError>;
}

impl<T: Filesystem + ?Sized> Filesystem for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read(&self, path: &Path) -> Result<String, CacheError> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), CacheError> {
        (**self).write(path, contents)
    }

    fn last_modified(&self, path: &Path) -> Result<u64, CacheError> {
        (**self).last_modified(path)
    }
}

/// Filesystem implementation backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl OsFilesystem {
    /// Creates a new `std::fs`-backed filesystem.
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<String, CacheError> {
        std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), CacheError> {
        std::fs::write(path, contents).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn last_modified(&self, path: &Path) -> Result<u64, CacheError> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| CacheError::ModificationTime {
                path: path.to_path_buf(),
                source: e,
            })?;
        let secs = modified
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CacheError::ModificationTime {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?
            .as_secs();
        Ok(secs)
    }
}

/// A single entry in a [`MemoryFilesystem`].
#[derive(Debug, Clone)]
struct MemoryFile {
    contents: String,
    mtime: u64,
}

/// In-memory filesystem with explicit modification times.
///
/// Useful in tests, where fingerprint scenarios need exact mtimes without
/// touching the disk, and in embedded setups without a real filesystem.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    files: Mutex<HashMap<PathBuf, MemoryFile>>,
}

impl MemoryFilesystem {
    /// Creates an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a file with the given contents and mtime.
    pub fn set_file(&self, path: impl Into<PathBuf>, contents: &str, mtime: u64) {
        self.files.lock().unwrap().insert(
            path.into(),
            MemoryFile {
                contents: contents.to_string(),
                mtime,
            },
        );
    }

    /// Updates the modification time of an existing file, creating an
    /// empty one if absent.
    pub fn touch(&self, path: impl Into<PathBuf>, mtime: u64) {
        let mut files = self.files.lock().unwrap();
        files
            .entry(path.into())
            .and_modify(|f| f.mtime = mtime)
            .or_insert(MemoryFile {
                contents: String::new(),
                mtime,
            });
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<String, CacheError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|f| f.contents.clone())
            .ok_or_else(|| CacheError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), CacheError> {
        let mut files = self.files.lock().unwrap();
        let mtime = files.get(path).map(|f| f.mtime).unwrap_or(0);
        files.insert(
            path.to_path_buf(),
            MemoryFile {
                contents: contents.to_string(),
                mtime,
            },
        );
        Ok(())
    }

    fn last_modified(&self, path: &Path) -> Result<u64, CacheError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|f| f.mtime)
            .ok_or_else(|| CacheError::ModificationTime {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_read_write_roundtrip() {
        let fs = MemoryFilesystem::new();
        fs.write(Path::new("tree.json"), "{}").unwrap();
        assert!(fs.exists(Path::new("tree.json")));
        assert_eq!(fs.read(Path::new("tree.json")).unwrap(), "{}");
    }

    #[test]
    fn memory_fs_missing_file_errors() {
        let fs = MemoryFilesystem::new();
        assert!(!fs.exists(Path::new("nope")));
        assert!(fs.read(Path::new("nope")).is_err());
        assert!(matches!(
            fs.last_modified(Path::new("nope")),
            Err(CacheError::ModificationTime { .. })
        ));
    }

    #[test]
    fn memory_fs_reports_set_mtime() {
        let fs = MemoryFilesystem::new();
        fs.set_file("view1", "<html>", 100);
        assert_eq!(fs.last_modified(Path::new("view1")).unwrap(), 100);
    }

    #[test]
    fn memory_fs_write_preserves_mtime() {
        let fs = MemoryFilesystem::new();
        fs.set_file("view1", "old", 42);
        fs.write(Path::new("view1"), "new").unwrap();
        assert_eq!(fs.read(Path::new("view1")).unwrap(), "new");
        assert_eq!(fs.last_modified(Path::new("view1")).unwrap(), 42);
    }

    #[test]
    fn memory_fs_touch_updates_mtime() {
        let fs = MemoryFilesystem::new();
        fs.set_file("view1", "x", 1);
        fs.touch("view1", 200);
        assert_eq!(fs.last_modified(Path::new("view1")).unwrap(), 200);
        assert_eq!(fs.read(Path::new("view1")).unwrap(), "x");
    }

    #[test]
    fn os_fs_roundtrip_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fragment.html");
        let fs = OsFilesystem::new();

        fs.write(&path, "<p>hello</p>").unwrap();
        assert!(fs.exists(&path));
        assert_eq!(fs.read(&path).unwrap(), "<p>hello</p>");

        let mtime = fs.last_modified(&path).unwrap();
        assert!(mtime > 0);
    }

    #[test]
    fn os_fs_missing_mtime_errors() {
        let fs = OsFilesystem::new();
        let result = fs.last_modified(Path::new("/nonexistent/view.blade.php"));
        assert!(matches!(result, Err(CacheError::ModificationTime { .. })));
    }
}
