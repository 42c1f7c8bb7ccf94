mod helpers;

use anyhow::Result;
use helpers::TestBackend;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use studynotes::application::{CounterService, CounterStore};
use studynotes::domain::{Counter, CounterKind, DomainError};
use studynotes::infrastructure::InMemoryBackend;

/// Counter store shared between threads; each call takes the lock on its own,
/// so a read and the following write are not atomic.
#[derive(Clone)]
struct SharedStore {
    inner: Arc<Mutex<InMemoryBackend>>,
    // both threads read before either writes
    read_gate: Arc<Barrier>,
}

impl CounterStore for SharedStore {
    fn get_counter(&mut self, kind: CounterKind, name: &str) -> Result<Option<Counter>, DomainError> {
        let counter = self.inner.lock().unwrap().get_counter(kind, name);
        self.read_gate.wait();
        counter
    }

    fn put_counter(&mut self, kind: CounterKind, counter: Counter) -> Result<(), DomainError> {
        self.inner.lock().unwrap().put_counter(kind, counter)
    }

    fn list_counters(&mut self, kind: CounterKind) -> Result<Vec<Counter>, DomainError> {
        self.inner.lock().unwrap().list_counters(kind)
    }
}

#[test]
fn given_concurrent_increments_when_reads_interleave_then_one_update_is_lost() -> Result<()> {
    // Arrange
    let mut backend = InMemoryBackend::new();
    let mut calc = Counter::new("calc");
    calc.count = 5;
    backend.put_counter(CounterKind::Tag, calc)?;
    let store = SharedStore {
        inner: Arc::new(Mutex::new(backend)),
        read_gate: Arc::new(Barrier::new(2)),
    };

    // Act
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || CounterService::new(store).increment(CounterKind::Tag, "calc", 1))
        })
        .collect();
    for handle in handles {
        handle.join().expect("increment thread panicked")?;
    }

    // Assert
    let count = store
        .inner
        .lock()
        .unwrap()
        .get_counter(CounterKind::Tag, "calc")?
        .unwrap()
        .count;
    assert_eq!(count, 6);
    Ok(())
}

#[test]
fn given_sqlite_store_when_incrementing_new_name_then_created_with_color() -> Result<()> {
    // Arrange
    let test_backend = TestBackend::new()?;
    let mut service = CounterService::new(test_backend.open()?);

    // Act
    let created = service.increment(CounterKind::Subject, "Biology", 1)?;
    let bumped = service.increment(CounterKind::Subject, "Biology", 2)?;

    // Assert
    assert_eq!(created.count, 1);
    assert_eq!(bumped.count, 3);
    assert_eq!(bumped.color, created.color);
    Ok(())
}

#[test]
fn given_several_counters_when_ranking_then_most_used_first() -> Result<()> {
    // Arrange
    let test_backend = TestBackend::new()?;
    let mut service = CounterService::new(test_backend.open()?);
    service.increment(CounterKind::Tag, "bio", 1)?;
    service.increment(CounterKind::Tag, "calc", 3)?;
    service.increment(CounterKind::Tag, "art", 1)?;
    service.increment(CounterKind::Subject, "Calculus", 9)?;

    // Act
    let ranking = service.ranking(CounterKind::Tag)?;

    // Assert
    let names: Vec<&str> = ranking.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["calc", "art", "bio"]);
    Ok(())
}
