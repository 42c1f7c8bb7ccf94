// src/infrastructure/memory.rs
use crate::application::{
    CounterStore, NoteRepository, SnapshotListener, Subscription, SubscriptionRegistry, UserStore,
};
use crate::constants::SEARCH_SCAN_LIMIT;
use crate::domain::filter::{check_backend_support, matches_text};
use crate::domain::{
    Counter, CounterKind, CounterPatch, DomainError, Note, NoteDraft, NoteFilter, NotePatch, User,
};
use crate::infrastructure::ServerClock;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Document backend held entirely in memory.
///
/// Implements the same contracts as [`crate::infrastructure::SqliteBackend`]
/// and is the fake used to test use cases without a database.
#[derive(Default)]
pub struct InMemoryBackend {
    // insertion order doubles as the tie-break for equal sort keys
    notes: Vec<Note>,
    counters: HashMap<(CounterKind, String), Counter>,
    users: HashMap<String, User>,
    clock: ServerClock,
    subscriptions: SubscriptionRegistry,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.active()
    }

    fn query(&self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        check_backend_support(filter)?;
        let matching = self
            .notes
            .iter()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        Ok(filter.arrange(matching))
    }

    fn changed(&self) {
        self.subscriptions.publish(|filter| self.query(filter));
    }

    fn position(&self, id: &str) -> Result<usize, DomainError> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))
    }

    fn owned_position(&self, caller: &str, id: &str) -> Result<usize, DomainError> {
        let index = self.position(id)?;
        if !self.notes[index].is_authored_by(caller) {
            return Err(DomainError::Permission {
                user: caller.to_string(),
                note: id.to_string(),
            });
        }
        Ok(index)
    }
}

impl NoteRepository for InMemoryBackend {
    #[instrument(level = "debug", skip(self, draft))]
    fn create_note(&mut self, draft: NoteDraft) -> Result<String, DomainError> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4().to_string();
        let now = self.clock.now();
        self.notes.push(Note::from_draft(id.clone(), draft, now));
        debug!(note_id = %id, "Stored note");
        self.changed();
        Ok(id)
    }

    fn get_note(&mut self, id: &str) -> Result<Note, DomainError> {
        let index = self.position(id)?;
        Ok(self.notes[index].clone())
    }

    #[instrument(level = "debug", skip(self, patch))]
    fn update_note(&mut self, caller: &str, id: &str, patch: NotePatch) -> Result<(), DomainError> {
        let index = self.owned_position(caller, id)?;
        let now = self.clock.now();
        self.notes[index].apply(patch, now)?;
        self.changed();
        Ok(())
    }

    fn update_counters(&mut self, id: &str, patch: CounterPatch) -> Result<(), DomainError> {
        let index = self.position(id)?;
        let now = self.clock.now();
        self.notes[index].apply_counters(patch, now);
        self.changed();
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_note(&mut self, caller: &str, id: &str) -> Result<(), DomainError> {
        let index = self.owned_position(caller, id)?;
        self.notes.remove(index);
        self.changed();
        Ok(())
    }

    fn list_notes(&mut self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        self.query(filter)
    }

    fn search_notes(&mut self, query: &str, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        let mut scanned = self.query(&filter.without_limit())?;
        scanned.truncate(SEARCH_SCAN_LIMIT);
        let mut hits: Vec<Note> = scanned.into_iter().filter(|n| matches_text(n, query)).collect();
        if let Some(limit) = filter.limit() {
            hits.truncate(limit);
        }
        Ok(hits)
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

impl CounterStore for InMemoryBackend {
    fn get_counter(&mut self, kind: CounterKind, name: &str) -> Result<Option<Counter>, DomainError> {
        Ok(self.counters.get(&(kind, name.to_string())).cloned())
    }

    fn put_counter(&mut self, kind: CounterKind, counter: Counter) -> Result<(), DomainError> {
        self.counters.insert((kind, counter.name.clone()), counter);
        Ok(())
    }

    fn list_counters(&mut self, kind: CounterKind) -> Result<Vec<Counter>, DomainError> {
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

impl UserStore for InMemoryBackend {
    fn get_user(&mut self, id: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.get(id).cloned())
    }

    fn put_user(&mut self, user: &User) -> Result<(), DomainError> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, NoteKind, NoteOrder};
    use std::sync::{Arc, Mutex};

    fn draft(title: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: "body".to_string(),
            kind: NoteKind::Markdown,
            tags: vec![],
            subject: None,
            is_public: true,
            author: Author {
                id: "u1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            file: None,
        }
    }

    #[test]
    fn given_new_note_when_creating_then_counters_zero_and_timestamps_equal() {
        let mut backend = InMemoryBackend::new();

        let id = backend.create_note(draft("Limits")).unwrap();
        let note = backend.get_note(&id).unwrap();

        assert_eq!(note.view_count, 0);
        assert_eq!(note.like_count, 0);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn given_update_when_updating_then_refreshes_updated_at_only() {
        let mut backend = InMemoryBackend::new();
        let id = backend.create_note(draft("Limits")).unwrap();
        let before = backend.get_note(&id).unwrap();

        backend
            .update_note(
                "u1",
                &id,
                NotePatch {
                    title: Some("Limits II".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let after = backend.get_note(&id).unwrap();

        assert_eq!(after.title, "Limits II");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn given_unknown_id_when_updating_then_not_found() {
        let mut backend = InMemoryBackend::new();

        let result = backend.update_note("u1", "nope", NotePatch::default());

        assert!(matches!(result, Err(DomainError::NoteNotFound(_))));
    }

    #[test]
    fn given_popular_order_when_listing_then_likes_then_views() {
        let mut backend = InMemoryBackend::new();
        let a = backend.create_note(draft("a")).unwrap();
        let b = backend.create_note(draft("b")).unwrap();
        let c = backend.create_note(draft("c")).unwrap();
        for (id, likes, views) in [(&a, 2, 1), (&b, 2, 9), (&c, 5, 0)] {
            backend
                .update_counters(
                    id,
                    CounterPatch {
                        view_count: Some(views),
                        like_count: Some(likes),
                    },
                )
                .unwrap();
        }
        let filter = NoteFilter::builder().order(NoteOrder::Popular).build().unwrap();

        let listed = backend.list_notes(&filter).unwrap();

        let ids: Vec<&str> = listed.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![c.as_str(), b.as_str(), a.as_str()]);
    }

    #[test]
    fn given_live_query_when_note_created_then_listener_gets_full_snapshot() {
        let mut backend = InMemoryBackend::new();
        backend.create_note(draft("first")).unwrap();
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&sizes);
        let sub = backend
            .subscribe(
                NoteFilter::builder().public(true).build().unwrap(),
                Box::new(move |notes: &[Note]| sink.lock().unwrap().push(notes.len())),
            )
            .unwrap();

        backend.create_note(draft("second")).unwrap();
        sub.cancel();
        backend.create_note(draft("third")).unwrap();

        assert_eq!(*sizes.lock().unwrap(), vec![1, 2]);
        assert_eq!(backend.subscriber_count(), 0);
    }

    #[test]
    fn given_limit_when_searching_then_caps_hits() {
        let mut backend = InMemoryBackend::new();
        for title in ["calc one", "calc two", "bio"] {
            backend.create_note(draft(title)).unwrap();
        }
        let filter = NoteFilter::builder().limit(1).build().unwrap();

        let hits = backend.search_notes("calc", &filter).unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "calc two");
    }
}
