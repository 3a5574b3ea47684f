use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem storage. Relative paths resolve against `base_path`;
/// absolute paths are used as given.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(Path::new(path))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CurateError;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("output/nested/a.json", b"[]").unwrap();
        assert_eq!(storage.read_file("output/nested/a.json").unwrap(), b"[]");
        assert!(dir.path().join("output/nested/a.json").exists());
    }

    #[test]
    fn test_absolute_paths_ignore_base() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("site.csv");
        fs::write(&file, "a,b\n").unwrap();

        let storage = LocalStorage::new("/nonexistent-base");
        let data = storage.read_file(file.to_str().unwrap()).unwrap();
        assert_eq!(data, b"a,b\n");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(matches!(
            storage.read_file("nope.csv"),
            Err(CurateError::IoError(_))
        ));
    }
}
