// src/application/note_lister.rs
use crate::application::{NoteRepository, SnapshotListener, Subscription};
use crate::domain::{DomainError, Note, NoteFilter};

pub struct NoteLister<R: NoteRepository> {
    repository: R,
}

impl<R: NoteRepository> NoteLister<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Run a filtered, ordered query once.
    pub fn list_notes(&mut self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        self.repository.list_notes(filter)
    }

    /// Keep `listener` supplied with the result of `filter` until the returned
    /// handle is cancelled or dropped.
    pub fn watch_notes(
        &mut self,
        filter: NoteFilter,
        listener: SnapshotListener,
    ) -> Result<Subscription, DomainError> {
        self.repository.subscribe(filter, listener)
    }
}
