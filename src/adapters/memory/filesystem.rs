//! In-memory filesystem keyed by path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::ports::filesystem::{FileSystem, FsError};

/// Filesystem that keeps every file in a map. Directories exist implicitly
/// whenever a file lives under them.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filesystem pre-populated with `(path, contents)` pairs.
    #[must_use]
    pub fn with_files<P: Into<PathBuf>>(files: impl IntoIterator<Item = (P, String)>) -> Self {
        let map = files.into_iter().map(|(p, c)| (p.into(), c)).collect();
        Self {
            files: Mutex::new(map),
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let files = self.files.lock().map_err(|e| e.to_string())?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("file not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        let mut files = self.files.lock().map_err(|e| e.to_string())?;
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        let mut files = self.files.lock().map_err(|e| e.to_string())?;
        files.remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let Ok(files) = self.files.lock() else {
            return false;
        };
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/out/.project"), "<projectDescription/>")
            .unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("/out/.project")).unwrap(),
            "<projectDescription/>"
        );
    }

    #[test]
    fn remove_drops_the_file_only() {
        let fs = MemoryFileSystem::with_files([
            ("/out/esql/A_Main.esql", String::new()),
            ("/out/esql/B_Main.esql", String::new()),
        ]);
        fs.remove(Path::new("/out/esql/A_Main.esql")).unwrap();
        fs.remove(Path::new("/out/esql/A_Main.esql")).unwrap();
        assert!(!fs.exists(Path::new("/out/esql/A_Main.esql")));
        assert!(fs.exists(Path::new("/out/esql/B_Main.esql")));
    }

    #[test]
    fn directories_exist_implicitly() {
        let fs = MemoryFileSystem::with_files([("/out/esql/A_Main.esql", String::new())]);
        assert!(fs.exists(Path::new("/out/esql")));
        assert!(!fs.exists(Path::new("/elsewhere")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_to_string(Path::new("/nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nope.yaml"));
    }
}
