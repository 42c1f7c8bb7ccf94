// src/util/testing.rs

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{
    CounterStore, NoteRepository, SnapshotListener, Subscription, SubscriptionRegistry,
};
use crate::domain::filter::{check_backend_support, matches_text};
use crate::domain::{
    Author, Counter, CounterKind, CounterPatch, DomainError, Note, NoteDraft, NoteFilter, NoteKind,
    NotePatch,
};

/// 2024-01-01T00:00:00Z, the creation time of a fixture with no offset.
pub const FIXTURE_EPOCH: i64 = 1_704_067_200;

/// Builder for notes used in tests.
///
/// Defaults to a public markdown note by user `u1`, created at [`FIXTURE_EPOCH`].
///
/// # Examples
///
/// ```
/// use studynotes::util::testing::NoteFixture;
///
/// let note = NoteFixture::new("n1").title("Limits").likes(3).build();
/// assert_eq!(note.like_count, 3);
/// assert!(note.is_public);
/// ```
pub struct NoteFixture {
    note: Note,
}

impl NoteFixture {
    pub fn new(id: &str) -> Self {
        let created = DateTime::<Utc>::from_timestamp(FIXTURE_EPOCH, 0).unwrap_or_default();
        Self {
            note: Note {
                id: id.to_string(),
                title: format!("Note {}", id),
                content: "content".to_string(),
                kind: NoteKind::Markdown,
                tags: vec![],
                subject: None,
                is_public: true,
                author: Author {
                    id: "u1".to_string(),
                    name: "Test Author".to_string(),
                    email: "author@example.com".to_string(),
                },
                file: None,
                view_count: 0,
                like_count: 0,
                created_at: created,
                updated_at: created,
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.note.title = title.to_string();
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.note.content = content.to_string();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.note.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.note.subject = Some(subject.to_string());
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.note.is_public = is_public;
        self
    }

    pub fn author_id(mut self, id: &str) -> Self {
        self.note.author.id = id.to_string();
        self
    }

    pub fn author_name(mut self, name: &str) -> Self {
        self.note.author.name = name.to_string();
        self
    }

    pub fn views(mut self, views: u64) -> Self {
        self.note.view_count = views;
        self
    }

    pub fn likes(mut self, likes: u64) -> Self {
        self.note.like_count = likes;
        self
    }

    /// Creation time `minutes` after [`FIXTURE_EPOCH`].
    pub fn created_minutes(mut self, minutes: i64) -> Self {
        self.note.created_at += Duration::minutes(minutes);
        self.note.updated_at = self.note.created_at;
        self
    }

    pub fn build(self) -> Note {
        self.note
    }
}

/// Shared mock repository for testing use cases that depend on NoteRepository
///
/// Queries are answered from the seeded notes with the same filter semantics as
/// the real backends; search results and search failures can be scripted.
///
/// # Examples
///
/// ```
/// use studynotes::util::testing::{MockNoteRepository, NoteFixture};
/// use studynotes::domain::DomainError;
///
/// let mock = MockNoteRepository::builder()
///     .with_note(NoteFixture::new("n1").build())
///     .with_search_failure(DomainError::BackendQuery("no index".to_string()))
///     .build();
/// ```
pub struct MockNoteRepository {
    notes: HashMap<String, Note>,
    search_results: HashMap<String, Vec<Note>>,
    search_failure: Option<DomainError>,
    create_failure: Option<DomainError>,
    counters: HashMap<(CounterKind, String), Counter>,
    counter_failure: Option<DomainError>,
    created: usize,
    list_calls: usize,
    subscriptions: SubscriptionRegistry,
}

impl MockNoteRepository {
    pub fn builder() -> MockNoteRepositoryBuilder {
        MockNoteRepositoryBuilder::new()
    }

    /// Number of `list_notes` calls answered so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls
    }

    fn query(&self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        check_backend_support(filter)?;
        let mut notes: Vec<Note> = self
            .notes
            .values()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        // HashMap order is random; make ties deterministic
        notes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(filter.arrange(notes))
    }

    fn changed(&self) {
        self.subscriptions.publish(|filter| self.query(filter));
    }

    fn owned_note(&mut self, caller: &str, id: &str) -> Result<&mut Note, DomainError> {
        let note = self
            .notes
            .get_mut(id)
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))?;
        if !note.is_authored_by(caller) {
            return Err(DomainError::Permission {
                user: caller.to_string(),
                note: id.to_string(),
            });
        }
        Ok(note)
    }
}

impl NoteRepository for MockNoteRepository {
    fn create_note(&mut self, draft: NoteDraft) -> Result<String, DomainError> {
        if let Some(e) = &self.create_failure {
            return Err(e.clone());
        }
        let draft = draft.validate()?;
        self.created += 1;
        let id = format!("mock-{}", self.created);
        self.notes
            .insert(id.clone(), Note::from_draft(id.clone(), draft, Utc::now()));
        self.changed();
        Ok(id)
    }

    fn get_note(&mut self, id: &str) -> Result<Note, DomainError> {
        self.notes
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))
    }

    fn update_note(&mut self, caller: &str, id: &str, patch: NotePatch) -> Result<(), DomainError> {
        self.owned_note(caller, id)?.apply(patch, Utc::now())?;
        self.changed();
        Ok(())
    }

    fn update_counters(&mut self, id: &str, patch: CounterPatch) -> Result<(), DomainError> {
        self.notes
            .get_mut(id)
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))?
            .apply_counters(patch, Utc::now());
        self.changed();
        Ok(())
    }

    fn delete_note(&mut self, caller: &str, id: &str) -> Result<(), DomainError> {
        self.owned_note(caller, id)?;
        self.notes.remove(id);
        self.changed();
        Ok(())
    }

    fn list_notes(&mut self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        self.list_calls += 1;
        self.query(filter)
    }

    fn search_notes(&mut self, query: &str, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        if let Some(e) = &self.search_failure {
            return Err(e.clone());
        }
        if let Some(results) = self.search_results.get(query) {
            return Ok(results.clone());
        }
        Ok(self
            .query(filter)?
            .into_iter()
            .filter(|n| matches_text(n, query))
            .collect())
    }

    fn subscribe(
        &mut self,
        filter: NoteFilter,
        listener: SnapshotListener,
    ) -> Result<Subscription, DomainError> {
        let initial = self.query(&filter)?;
        Ok(self.subscriptions.register(filter, listener, &initial))
    }
}

impl CounterStore for MockNoteRepository {
    fn get_counter(&mut self, kind: CounterKind, name: &str) -> Result<Option<Counter>, DomainError> {
        if let Some(e) = &self.counter_failure {
            return Err(e.clone());
        }
        Ok(self.counters.get(&(kind, name.to_string())).cloned())
    }

    fn put_counter(&mut self, kind: CounterKind, counter: Counter) -> Result<(), DomainError> {
        if let Some(e) = &self.counter_failure {
            return Err(e.clone());
        }
        self.counters.insert((kind, counter.name.clone()), counter);
        Ok(())
    }

    fn list_counters(&mut self, kind: CounterKind) -> Result<Vec<Counter>, DomainError> {
        if let Some(e) = &self.counter_failure {
            return Err(e.clone());
        }
        let mut counters: Vec<Counter> = self
            .counters
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, c)| c.clone())
            .collect();
        counters.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(counters)
    }
}

/// Builder for MockNoteRepository
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockNoteRepositoryBuilder {
    notes: HashMap<String, Note>,
    search_results: HashMap<String, Vec<Note>>,
    search_failure: Option<DomainError>,
    create_failure: Option<DomainError>,
    counter_failure: Option<DomainError>,
}

impl MockNoteRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            notes: HashMap::new(),
            search_results: HashMap::new(),
            search_failure: None,
            create_failure: None,
            counter_failure: None,
        }
    }

    /// Add a note that can be retrieved and listed
    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.insert(note.id.clone(), note);
        self
    }

    pub fn with_notes(self, notes: impl IntoIterator<Item = Note>) -> Self {
        notes.into_iter().fold(self, |builder, note| builder.with_note(note))
    }

    /// Configure the backend search result for a specific query
    pub fn with_search_result(mut self, query: &str, results: Vec<Note>) -> Self {
        self.search_results.insert(query.to_string(), results);
        self
    }

    /// Make every backend search fail with `error`
    pub fn with_search_failure(mut self, error: DomainError) -> Self {
        self.search_failure = Some(error);
        self
    }

    /// Make every `create_note` fail with `error`
    pub fn with_create_failure(mut self, error: DomainError) -> Self {
        self.create_failure = Some(error);
        self
    }

    /// Make every counter read and write fail with `error`
    pub fn with_counter_failure(mut self, error: DomainError) -> Self {
        self.counter_failure = Some(error);
        self
    }

    pub fn build(self) -> MockNoteRepository {
        MockNoteRepository {
            notes: self.notes,
            search_results: self.search_results,
            search_failure: self.search_failure,
            create_failure: self.create_failure,
            counters: HashMap::new(),
            counter_failure: self.counter_failure,
            created: 0,
            list_calls: 0,
            subscriptions: SubscriptionRegistry::new(),
        }
    }
}

impl Default for MockNoteRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["rusqlite", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        init_test_setup().expect("Failed to initialize test setup");
    }

    #[test]
    fn given_note_added_when_getting_note_then_returns_note() {
        let mut mock = MockNoteRepository::builder()
            .with_note(NoteFixture::new("n1").title("Test Question").build())
            .build();

        let result = mock.get_note("n1").expect("Note should exist");
        assert_eq!(result.id, "n1");
        assert_eq!(result.title, "Test Question");
    }

    #[test]
    fn given_no_note_when_getting_note_then_returns_error() {
        let mut mock = MockNoteRepository::builder().build();

        let result = mock.get_note("n9");
        assert!(matches!(result, Err(DomainError::NoteNotFound(id)) if id == "n9"));
    }

    #[test]
    fn given_scripted_search_result_when_searching_then_returns_configured_result() {
        let mut mock = MockNoteRepository::builder()
            .with_search_result("custom", vec![NoteFixture::new("n999").build()])
            .build();

        let result = mock
            .search_notes("custom", &NoteFilter::all())
            .expect("Search should succeed");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "n999");
    }

    #[test]
    fn given_subscription_when_mock_changes_then_listener_sees_new_snapshot() {
        use std::sync::{Arc, Mutex};

        let mut mock = MockNoteRepository::builder()
            .with_note(NoteFixture::new("n1").views(1).build())
            .build();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = mock
            .subscribe(
                NoteFilter::all(),
                Box::new(move |notes: &[Note]| {
                    sink.lock().unwrap().push(notes[0].view_count);
                }),
            )
            .unwrap();

        mock.update_counters(
            "n1",
            CounterPatch {
                view_count: Some(2),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }
}
