// src/infrastructure/clock.rs
use chrono::{DateTime, Duration, Utc};

/// Server-side timestamp source with microsecond resolution.
///
/// Successive calls never go backwards and never repeat, so creation order is
/// always recoverable from `created_at`.
#[derive(Debug, Default)]
pub struct ServerClock {
    last: Option<DateTime<Utc>>,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after the latest timestamp already handed out.
    pub fn resume_after(last: Option<DateTime<Utc>>) -> Self {
        Self { last }
    }

    pub fn now(&mut self) -> DateTime<Utc> {
        let wall = Utc::now();
        let mut now = DateTime::from_timestamp_micros(wall.timestamp_micros()).unwrap_or(wall);
        if let Some(last) = self.last {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_rapid_calls_when_reading_clock_then_strictly_increasing() {
        let mut clock = ServerClock::new();
        let stamps: Vec<_> = (0..100).map(|_| clock.now()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn given_future_last_when_resuming_then_continues_after_it() {
        let future = Utc::now() + Duration::hours(1);
        let mut clock = ServerClock::resume_after(Some(future));
        assert!(clock.now() > future);
    }
}
