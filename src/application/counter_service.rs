// src/application/counter_service.rs
use crate::domain::{Counter, CounterKind, DomainError};
use tracing::debug;

/// Storage of the denormalized `tags` and `subjects` counter documents.
pub trait CounterStore {
    fn get_counter(&mut self, kind: CounterKind, name: &str) -> Result<Option<Counter>, DomainError>;

    /// Create or overwrite the counter document keyed by `counter.name`.
    fn put_counter(&mut self, kind: CounterKind, counter: Counter) -> Result<(), DomainError>;

    /// All counters of one kind, highest count first.
    fn list_counters(&mut self, kind: CounterKind) -> Result<Vec<Counter>, DomainError>;
}

impl<T: CounterStore + ?Sized> CounterStore for &mut T {
    fn get_counter(&mut self, kind: CounterKind, name: &str) -> Result<Option<Counter>, DomainError> {
        (**self).get_counter(kind, name)
    }

    fn put_counter(&mut self, kind: CounterKind, counter: Counter) -> Result<(), DomainError> {
        (**self).put_counter(kind, counter)
    }

    fn list_counters(&mut self, kind: CounterKind) -> Result<Vec<Counter>, DomainError> {
        (**self).list_counters(kind)
    }
}

pub struct CounterService<S: CounterStore> {
    store: S,
}

impl<S: CounterStore> CounterService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Add `delta` to the counter for `name`, creating it at zero first.
    ///
    /// This is a plain read followed by a write. Two callers racing on the same
    /// name can both read the same base and one increment is lost; the counts
    /// are display statistics and tolerate that drift.
    pub fn increment(
        &mut self,
        kind: CounterKind,
        name: &str,
        delta: i64,
    ) -> Result<Counter, DomainError> {
        let mut counter = self
            .store
            .get_counter(kind, name)?
            .unwrap_or_else(|| Counter::new(name));
        counter.count += delta;
        debug!(%kind, counter_name = name, count = counter.count, "Writing counter");
        self.store.put_counter(kind, counter.clone())?;
        Ok(counter)
    }

    /// Counters sorted by usage, most used first.
    pub fn ranking(&mut self, kind: CounterKind) -> Result<Vec<Counter>, DomainError> {
        self.store.list_counters(kind)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
