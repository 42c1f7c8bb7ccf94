// src/infrastructure/file_store.rs
use crate::application::FileStore;
use crate::domain::DomainError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Attachment storage in a local directory, addressed by `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(DomainError::Storage(format!("invalid storage path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStore for LocalFileStore {
    #[instrument(level = "debug", skip(self, bytes), fields(size = bytes.len()))]
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&target, bytes).map_err(|e| {
            DomainError::Storage(format!("failed to write {}: {}", target.display(), e))
        })?;

        let absolute = target.canonicalize().unwrap_or(target);
        debug!(path = %absolute.display(), "Stored attachment");
        Ok(format!("file://{}", absolute.display()))
    }

    fn delete(&mut self, path: &str) -> Result<(), DomainError> {
        let target = self.resolve(path)?;
        fs::remove_file(&target).map_err(|e| {
            DomainError::Storage(format!("failed to delete {}: {}", target.display(), e))
        })
    }
}
