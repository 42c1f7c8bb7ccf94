use anyhow::{Context, Result};
use studynotes::domain::{Author, NoteDraft, NoteKind};
use studynotes::infrastructure::{LocalFileStore, SqliteBackend};
use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary note database plus attachment directory
#[allow(dead_code)]
pub struct TestBackend {
    _temp_dir: TempDir,
    pub database_path: PathBuf,
    pub storage_root: PathBuf,
}

#[allow(dead_code)]
impl TestBackend {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let database_path = temp_dir.path().join("db").join("notes.db");
        let storage_root = temp_dir.path().join("files");

        Ok(Self {
            _temp_dir: temp_dir,
            database_path,
            storage_root,
        })
    }

    pub fn open(&self) -> Result<SqliteBackend> {
        SqliteBackend::open(&self.database_path)
    }

    pub fn file_store(&self) -> LocalFileStore {
        LocalFileStore::new(&self.storage_root)
    }
}

#[allow(dead_code)]
pub fn author(id: &str, name: &str) -> Author {
    Author {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", id),
    }
}

/// Public markdown draft by `author`
#[allow(dead_code)]
pub fn markdown_draft(author: &Author, title: &str, tags: &[&str], subject: Option<&str>) -> NoteDraft {
    NoteDraft {
        title: title.to_string(),
        content: format!("# {}\n\nNotes about {}.", title, title.to_lowercase()),
        kind: NoteKind::Markdown,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        subject: subject.map(str::to_string),
        is_public: true,
        author: author.clone(),
        file: None,
    }
}

/// Known test users
#[allow(dead_code)]
pub mod test_users {
    pub const ADA: &str = "u-ada";
    pub const BOB: &str = "u-bob";
}
