// src/application/subscription.rs
use crate::domain::{DomainError, Note, NoteFilter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

/// Receives a full, ordered result snapshot after every change.
pub type SnapshotListener = Box<dyn FnMut(&[Note]) + Send>;

type Sink = Arc<Mutex<Option<SnapshotListener>>>;

#[derive(Clone)]
struct Entry {
    id: u64,
    filter: NoteFilter,
    sink: Sink,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    entries: Vec<Entry>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live queries registered against one backend.
///
/// Backends call [`SubscriptionRegistry::publish`] after each committed
/// mutation; every active subscriber gets its query re-run and the complete
/// result delivered. There is no delta delivery.
#[derive(Default)]
pub struct SubscriptionRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `initial` to the listener, then keep it registered for `filter`.
    pub fn register(
        &self,
        filter: NoteFilter,
        listener: SnapshotListener,
        initial: &[Note],
    ) -> Subscription {
        let sink: Sink = Arc::new(Mutex::new(Some(listener)));
        if let Some(listener) = lock(&sink).as_mut() {
            listener(initial);
        }

        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.entries.push(Entry {
            id,
            filter,
            sink: Arc::clone(&sink),
        });
        debug!(subscription = id, active = state.entries.len(), "Registered live query");

        Subscription {
            id,
            registry: Arc::downgrade(&self.state),
            sink,
        }
    }

    /// Re-run every live query with `run` and push the results.
    ///
    /// A query that fails is skipped for this round; its subscriber stays
    /// registered and sees the next successful snapshot.
    pub fn publish<F>(&self, mut run: F)
    where
        F: FnMut(&NoteFilter) -> Result<Vec<Note>, DomainError>,
    {
        let entries = lock(&self.state).entries.clone();
        for entry in entries {
            match run(&entry.filter) {
                Ok(notes) => {
                    if let Some(listener) = lock(&entry.sink).as_mut() {
                        listener(&notes);
                    }
                }
                Err(e) => warn!(subscription = entry.id, error = %e, "Live query failed"),
            }
        }
    }

    pub fn active(&self) -> usize {
        lock(&self.state).entries.len()
    }
}

/// Handle of a live query. Cancelling (or dropping) it stops delivery.
///
/// Cancellation waits for an in-flight delivery to that subscriber to finish;
/// once it returns the listener is never called again. A listener must not
/// cancel its own subscription from inside the callback.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<RegistryState>>,
    sink: Sink,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        lock(&self.sink).is_some()
    }

    pub fn cancel(self) {
        drop(self);
    }

    fn detach(&mut self) {
        if let Some(state) = self.registry.upgrade() {
            lock(&state).entries.retain(|e| e.id != self.id);
        }
        if lock(&self.sink).take().is_some() {
            debug!(subscription = self.id, "Cancelled live query");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::NoteFixture;

    fn recording() -> (Arc<Mutex<Vec<usize>>>, SnapshotListener) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: SnapshotListener = Box::new(move |notes: &[Note]| {
            sink.lock().unwrap().push(notes.len());
        });
        (seen, listener)
    }

    #[test]
    fn given_registration_when_registering_then_delivers_initial_snapshot() {
        let registry = SubscriptionRegistry::new();
        let (seen, listener) = recording();
        let initial = vec![NoteFixture::new("a").build()];

        let _sub = registry.register(NoteFilter::all(), listener, &initial);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(registry.active(), 1);
    }

    #[test]
    fn given_two_subscribers_when_publishing_then_each_gets_full_snapshot() {
        let registry = SubscriptionRegistry::new();
        let (first, l1) = recording();
        let (second, l2) = recording();
        let _s1 = registry.register(NoteFilter::all(), l1, &[]);
        let _s2 = registry.register(NoteFilter::all(), l2, &[]);

        registry.publish(|_| Ok(vec![NoteFixture::new("a").build(), NoteFixture::new("b").build()]));

        assert_eq!(*first.lock().unwrap(), vec![0, 2]);
        assert_eq!(*second.lock().unwrap(), vec![0, 2]);
    }

    #[test]
    fn given_cancelled_subscription_when_publishing_then_no_more_callbacks() {
        let registry = SubscriptionRegistry::new();
        let (seen, listener) = recording();
        let sub = registry.register(NoteFilter::all(), listener, &[]);

        sub.cancel();
        registry.publish(|_| Ok(vec![NoteFixture::new("a").build()]));

        assert_eq!(*seen.lock().unwrap(), vec![0]);
        assert_eq!(registry.active(), 0);
    }

    #[test]
    fn given_failing_query_when_publishing_then_subscriber_survives() {
        let registry = SubscriptionRegistry::new();
        let (seen, listener) = recording();
        let sub = registry.register(NoteFilter::all(), listener, &[]);

        registry.publish(|_| Err(DomainError::Backend("offline".to_string())));
        registry.publish(|_| Ok(vec![NoteFixture::new("a").build()]));

        assert!(sub.is_active());
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }
}
