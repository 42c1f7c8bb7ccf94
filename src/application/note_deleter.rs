// src/application/note_deleter.rs
use crate::application::NoteRepository;
use crate::domain::DomainError;

pub struct NoteDeleter<R: NoteRepository> {
    repository: R,
}

impl<R: NoteRepository> NoteDeleter<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Delete a note on behalf of `caller`, who must be its author.
    ///
    /// Tag and subject counters are left as they are.
    pub fn delete_note(&mut self, caller: &str, note_id: &str) -> Result<(), DomainError> {
        self.repository.delete_note(caller, note_id)
    }
}
