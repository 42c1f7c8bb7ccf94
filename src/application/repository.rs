// src/application/repository.rs
use crate::application::{SnapshotListener, Subscription};
use crate::domain::{CounterPatch, DomainError, Note, NoteDraft, NoteFilter, NotePatch};

/// Access to the `notes` collection of the document backend.
///
/// Implementations are the access-control boundary: author-only operations take
/// the calling user's id and must reject everyone else with
/// [`DomainError::Permission`].
pub trait NoteRepository {
    /// Store a validated draft; assigns id, zero counters and server timestamps.
    fn create_note(&mut self, draft: NoteDraft) -> Result<String, DomainError>;

    fn get_note(&mut self, id: &str) -> Result<Note, DomainError>;

    /// Merge `patch` into the note. Author only; always refreshes `updated_at`.
    fn update_note(&mut self, caller: &str, id: &str, patch: NotePatch) -> Result<(), DomainError>;

    /// Overwrite view/like counters. Open to any signed-in viewer.
    fn update_counters(&mut self, id: &str, patch: CounterPatch) -> Result<(), DomainError>;

    /// Author only.
    fn delete_note(&mut self, caller: &str, id: &str) -> Result<(), DomainError>;

    fn list_notes(&mut self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError>;

    /// Backend-assisted text search bounded by `filter`. May reject queries the
    /// backend cannot execute with [`DomainError::BackendQuery`].
    fn search_notes(&mut self, query: &str, filter: &NoteFilter) -> Result<Vec<Note>, DomainError>;

    /// Live variant of [`NoteRepository::list_notes`]; see [`Subscription`].
    fn subscribe(
        &mut self,
        filter: NoteFilter,
        listener: SnapshotListener,
    ) -> Result<Subscription, DomainError>;
}

impl<T: NoteRepository + ?Sized> NoteRepository for &mut T {
    fn create_note(&mut self, draft: NoteDraft) -> Result<String, DomainError> {
        (**self).create_note(draft)
    }

    fn get_note(&mut self, id: &str) -> Result<Note, DomainError> {
        (**self).get_note(id)
    }

    fn update_note(&mut self, caller: &str, id: &str, patch: NotePatch) -> Result<(), DomainError> {
        (**self).update_note(caller, id, patch)
    }

    fn update_counters(&mut self, id: &str, patch: CounterPatch) -> Result<(), DomainError> {
        (**self).update_counters(id, patch)
    }

    fn delete_note(&mut self, caller: &str, id: &str) -> Result<(), DomainError> {
        (**self).delete_note(caller, id)
    }

    fn list_notes(&mut self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        (**self).list_notes(filter)
    }

    fn search_notes(&mut self, query: &str, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        (**self).search_notes(query, filter)
    }

    fn subscribe(
        &mut self,
        filter: NoteFilter,
        listener: SnapshotListener,
    ) -> Result<Subscription, DomainError> {
        (**self).subscribe(filter, listener)
    }
}
