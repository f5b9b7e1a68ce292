use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Per-key last-fire timestamps used to throttle repeated alerts.
///
/// Keys are asset ids on the price path and city names on the weather path;
/// each key is tracked independently.
#[derive(Debug, Clone, Default)]
pub struct CooldownGate {
    last_fired: HashMap<String, DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `key` may fire at `now`. Does not mutate state.
    pub fn can_fire(&self, key: &str, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.last_fired.get(key) {
            None => true,
            Some(last) => now.signed_duration_since(*last) >= cooldown,
        }
    }

    pub fn record_fire(&mut self, key: &str, now: DateTime<Utc>) {
        self.last_fired.insert(key.to_string(), now);
    }

    pub fn last_fired(&self, key: &str) -> Option<DateTime<Utc>> {
        self.last_fired.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_first_fire_allowed() {
        let gate = CooldownGate::new();
        assert!(gate.can_fire("bitcoin", t0(), Duration::seconds(30)));
        assert!(gate.last_fired("bitcoin").is_none());
    }

    #[test]
    fn test_suppressed_inside_window() {
        let mut gate = CooldownGate::new();
        gate.record_fire("bitcoin", t0());

        let cooldown = Duration::seconds(30);
        assert!(!gate.can_fire("bitcoin", t0() + Duration::seconds(29), cooldown));
        assert!(!gate.can_fire(
            "bitcoin",
            t0() + Duration::milliseconds(29_999),
            cooldown
        ));
    }

    #[test]
    fn test_allowed_at_exact_boundary() {
        let mut gate = CooldownGate::new();
        gate.record_fire("bitcoin", t0());
        assert!(gate.can_fire("bitcoin", t0() + Duration::seconds(30), Duration::seconds(30)));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut gate = CooldownGate::new();
        gate.record_fire("London", t0());

        let cooldown = Duration::seconds(60);
        assert!(!gate.can_fire("London", t0() + Duration::seconds(1), cooldown));
        assert!(gate.can_fire("Tokyo", t0() + Duration::seconds(1), cooldown));
    }

    #[test]
    fn test_record_fire_moves_window() {
        let mut gate = CooldownGate::new();
        gate.record_fire("bitcoin", t0());
        gate.record_fire("bitcoin", t0() + Duration::seconds(40));

        let cooldown = Duration::seconds(30);
        assert!(!gate.can_fire("bitcoin", t0() + Duration::seconds(60), cooldown));
        assert!(gate.can_fire("bitcoin", t0() + Duration::seconds(70), cooldown));
    }
}
