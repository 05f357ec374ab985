use crate::error::{CommonError, CommonResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File system abstraction for reading and rewriting sources
pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> CommonResult<String>;

    /// Replace the whole file. Either the new contents land or the old
    /// file is left as it was.
    fn write(&self, path: &Path, contents: &str) -> CommonResult<()>;
}

/// Real file system implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Writes a temporary sibling and renames it over the target
    fn write(&self, path: &Path, contents: &str) -> CommonResult<()> {
        let wrap = |source: std::io::Error| CommonError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let permissions = std::fs::metadata(path).ok().map(|m| m.permissions());
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(wrap)?;
        file.write_all(contents.as_bytes()).map_err(wrap)?;
        file.as_file().sync_all().map_err(wrap)?;
        if let Some(permissions) = permissions {
            std::fs::set_permissions(file.path(), permissions).map_err(wrap)?;
        }
        file.persist(path).map_err(|e| wrap(e.error))?;

        tracing::debug!("wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

/// Mock file system for testing
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: RefCell<HashMap<PathBuf, String>>,
    writes: RefCell<usize>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.get_mut().insert(path.into(), contents.into());
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        self.contents(path).ok_or_else(|| {
            CommonError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })
    }

    fn write(&self, path: &Path, contents: &str) -> CommonResult<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_round_trip() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/src/App.jsx", "<App />");

        assert_eq!(fs.read_to_string(Path::new("/src/App.jsx")).unwrap(), "<App />");

        fs.write(Path::new("/src/App.jsx"), "<Main />").unwrap();
        assert_eq!(fs.contents(Path::new("/src/App.jsx")).as_deref(), Some("<Main />"));
        assert_eq!(fs.write_count(), 1);
    }

    #[test]
    fn test_real_write_replaces_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Card.tsx");
        std::fs::write(&path, "old").unwrap();

        RealFileSystem.write(&path, "new contents").unwrap();

        assert_eq!(RealFileSystem.read_to_string(&path).unwrap(), "new contents");
        // Only the target remains, no stray temporary files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_mock_missing_file_is_io_error() {
        let fs = MockFileSystem::new();
        let err = fs.read_to_string(Path::new("/nope.jsx")).unwrap_err();
        assert!(matches!(err, CommonError::Io(_)));
    }
}
