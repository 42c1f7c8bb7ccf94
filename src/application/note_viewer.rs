// src/application/note_viewer.rs
use crate::application::NoteRepository;
use crate::domain::{CounterPatch, DomainError, Note};
use tracing::debug;

pub struct NoteViewer<R: NoteRepository> {
    repository: R,
}

impl<R: NoteRepository> NoteViewer<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Fetch a note without touching its counters.
    pub fn peek_note(&mut self, note_id: &str) -> Result<Note, DomainError> {
        self.repository.get_note(note_id)
    }

    /// Fetch a note and count the page view.
    ///
    /// The view count is read and written back as `count + 1`; concurrent viewers
    /// may under-count.
    pub fn view_note(&mut self, note_id: &str) -> Result<Note, DomainError> {
        let mut note = self.repository.get_note(note_id)?;
        let views = note.view_count + 1;
        self.repository.update_counters(
            note_id,
            CounterPatch {
                view_count: Some(views),
                ..Default::default()
            },
        )?;
        note.view_count = views;
        debug!(note_id, views, "Counted note view");
        Ok(note)
    }

    /// Add (`liked = true`) or withdraw a like. The count never goes below zero.
    pub fn set_liked(&mut self, note_id: &str, liked: bool) -> Result<Note, DomainError> {
        let mut note = self.repository.get_note(note_id)?;
        let likes = if liked {
            note.like_count + 1
        } else {
            note.like_count.saturating_sub(1)
        };
        self.repository.update_counters(
            note_id,
            CounterPatch {
                like_count: Some(likes),
                ..Default::default()
            },
        )?;
        note.like_count = likes;
        debug!(note_id, likes, "Updated note likes");
        Ok(note)
    }
}
