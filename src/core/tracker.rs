use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::config::AssetConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedAsset {
    pub id: String,
    pub current_price: f64,
    pub previous_price: f64,
    pub alert_threshold_percent: f64,
    pub last_alert_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDelta {
    /// Absolute change in percent.
    pub percent: f64,
    pub direction: Direction,
    pub price: f64,
    pub threshold_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Asset is not tracked; nothing was touched.
    Untracked,
    /// Price was non-finite or not positive; nothing was touched.
    Rejected,
    /// Recorded, but there was no earlier price to compare against.
    NoBaseline,
    Changed(PriceDelta),
}

/// Last and previous price for each tracked asset.
#[derive(Debug, Default)]
pub struct PriceTracker {
    assets: HashMap<String, TrackedAsset>,
    order: Vec<String>,
}

impl PriceTracker {
    pub fn new(assets: &[AssetConfig]) -> Self {
        let mut tracker = Self::default();
        for asset in assets {
            tracker.track(&asset.id, asset.alert_threshold_percent);
        }
        tracker
    }

    pub fn track(&mut self, id: &str, alert_threshold_percent: f64) {
        if self.assets.contains_key(id) {
            return;
        }
        self.order.push(id.to_string());
        self.assets.insert(
            id.to_string(),
            TrackedAsset {
                id: id.to_string(),
                current_price: 0.0,
                previous_price: 0.0,
                alert_threshold_percent,
                last_alert_at: None,
            },
        );
    }

    pub fn update(&mut self, id: &str, new_price: f64) -> TickOutcome {
        let Some(asset) = self.assets.get_mut(id) else {
            return TickOutcome::Untracked;
        };

        if !new_price.is_finite() || new_price <= 0.0 {
            return TickOutcome::Rejected;
        }

        asset.previous_price = asset.current_price;
        asset.current_price = new_price;

        if asset.previous_price <= 0.0 {
            return TickOutcome::NoBaseline;
        }

        let change = (asset.current_price - asset.previous_price) / asset.previous_price * 100.0;
        TickOutcome::Changed(PriceDelta {
            percent: change.abs(),
            direction: if asset.current_price > asset.previous_price {
                Direction::Increased
            } else {
                Direction::Decreased
            },
            price: asset.current_price,
            threshold_percent: asset.alert_threshold_percent,
        })
    }

    /// Sets a starting price so the first live tick has something to compare with.
    pub fn seed(&mut self, id: &str, price: f64) {
        if let Some(asset) = self.assets.get_mut(id) {
            if price.is_finite() && price > 0.0 {
                asset.current_price = price;
            }
        }
    }

    pub fn mark_alerted(&mut self, id: &str, at: DateTime<Utc>) {
        if let Some(asset) = self.assets.get_mut(id) {
            asset.last_alert_at = Some(at);
        }
    }

    pub fn get(&self, id: &str) -> Option<&TrackedAsset> {
        self.assets.get(id)
    }

    /// Assets in the order they were registered.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedAsset> {
        self.order.iter().filter_map(|id| self.assets.get(id))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> PriceTracker {
        let mut t = PriceTracker::default();
        t.track("bitcoin", 0.5);
        t
    }

    #[test]
    fn test_first_tick_has_no_baseline() {
        let mut t = tracker();
        assert_eq!(t.update("bitcoin", 100.0), TickOutcome::NoBaseline);
        let asset = t.get("bitcoin").unwrap();
        assert_eq!(asset.current_price, 100.0);
        assert_eq!(asset.previous_price, 0.0);
    }

    #[test]
    fn test_delta_and_direction() {
        let mut t = tracker();
        t.update("bitcoin", 100.0);

        match t.update("bitcoin", 101.0) {
            TickOutcome::Changed(delta) => {
                assert!((delta.percent - 1.0).abs() < 1e-9);
                assert_eq!(delta.direction, Direction::Increased);
                assert_eq!(delta.price, 101.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        match t.update("bitcoin", 99.99) {
            TickOutcome::Changed(delta) => {
                assert!((delta.percent - 1.0).abs() < 1e-9);
                assert_eq!(delta.direction, Direction::Decreased);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_unknown_asset_ignored() {
        let mut t = tracker();
        assert_eq!(t.update("dogecoin", 1.0), TickOutcome::Untracked);
        assert!(t.get("dogecoin").is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_invalid_price_leaves_state_untouched() {
        let mut t = tracker();
        t.update("bitcoin", 100.0);
        assert_eq!(t.update("bitcoin", f64::NAN), TickOutcome::Rejected);
        assert_eq!(t.update("bitcoin", -5.0), TickOutcome::Rejected);

        let asset = t.get("bitcoin").unwrap();
        assert_eq!(asset.current_price, 100.0);
        assert_eq!(asset.previous_price, 0.0);
    }

    #[test]
    fn test_seed_provides_baseline() {
        let mut t = tracker();
        t.seed("bitcoin", 200.0);
        assert!(matches!(t.update("bitcoin", 202.0), TickOutcome::Changed(_)));
    }
}
