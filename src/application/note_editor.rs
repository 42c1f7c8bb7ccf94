// src/application/note_editor.rs
use crate::application::NoteRepository;
use crate::domain::{DomainError, Note, NotePatch};
use tracing::info;

pub struct NoteEditor<R: NoteRepository> {
    repository: R,
}

impl<R: NoteRepository> NoteEditor<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Apply an author's edit and return the stored result.
    ///
    /// Tag or subject changes do not adjust the usage counters.
    pub fn edit(&mut self, caller: &str, note_id: &str, patch: NotePatch) -> Result<Note, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::Validation("nothing to update".to_string()));
        }
        self.repository.update_note(caller, note_id, patch)?;
        info!(note_id, "Updated note");
        self.repository.get_note(note_id)
    }
}
