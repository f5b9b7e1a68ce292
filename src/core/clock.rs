use chrono::{DateTime, Utc};

/// Time source for cooldowns and notification timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Debug, Clone)]
    pub struct ManualClock(Rc<Cell<DateTime<Utc>>>);

    impl ManualClock {
        pub fn new() -> Self {
            let start = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
            Self(Rc::new(Cell::new(start)))
        }

        pub fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }

        pub fn advance_secs(&self, secs: i64) {
            self.advance(Duration::seconds(secs));
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }
}
