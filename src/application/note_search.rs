// src/application/note_search.rs
use crate::application::NoteRepository;
use crate::domain::filter::matches_text;
use crate::domain::{DomainError, Note, NoteFilter, SearchRequest};
use tracing::{debug, instrument, warn};

/// Turns a free-text query plus subject, tag and sort selections into the
/// displayed note sequence.
pub struct NoteSearch<R: NoteRepository> {
    repository: R,
}

impl<R: NoteRepository> NoteSearch<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Run the pipeline for `request`.
    ///
    /// The scoped base list is only fetched without a query; a query is
    /// answered by the backend search instead.
    pub fn run(&mut self, request: &SearchRequest) -> Result<Vec<Note>, DomainError> {
        let base = match request.text() {
            Some(_) => Vec::new(),
            None => self
                .repository
                .list_notes(&request.scope.with_order(request.sort.fetch_order()))?,
        };
        self.refine(request, base)
    }

    pub fn into_inner(self) -> R {
        self.repository
    }

    /// Run the pipeline over an already fetched list (e.g. a live snapshot).
    ///
    /// Without a query this is a pure transformation of `displayed`. With one,
    /// the backend search replaces `displayed`; if the backend rejects it, the
    /// scoped list is fetched and matched locally.
    #[instrument(level = "debug", skip(self, displayed), fields(query = ?request.text()))]
    pub fn refine(
        &mut self,
        request: &SearchRequest,
        displayed: Vec<Note>,
    ) -> Result<Vec<Note>, DomainError> {
        let (mut notes, subject_applied) = match request.text() {
            Some(text) => (self.retrieve_matching(text, request)?, true),
            None => (displayed, false),
        };

        notes.retain(|n| request.tag.matches(n));
        if !subject_applied {
            notes.retain(|n| request.subject.matches(n));
        }
        notes.sort_by(|a, b| request.sort.compare(a, b));

        debug!(results = notes.len(), "Search pipeline finished");
        Ok(notes)
    }

    fn retrieve_matching(
        &mut self,
        text: &str,
        request: &SearchRequest,
    ) -> Result<Vec<Note>, DomainError> {
        let scope: NoteFilter = request
            .scope
            .without_limit()
            .with_subject(request.subject.as_option());

        match self.repository.search_notes(text, &scope) {
            Ok(notes) => Ok(notes),
            Err(e) => {
                warn!(error = %e, "Backend search failed, matching locally");
                let notes = self.repository.list_notes(&scope)?;
                Ok(notes.into_iter().filter(|n| matches_text(n, text)).collect())
            }
        }
    }
}
