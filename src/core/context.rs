use log::{debug, info, warn};
use rand::Rng;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

use super::alerts::{AlertEngine, AlertMessage};
use super::clock::Clock;
use super::notifications::{Notification, NotificationKind, NotificationStore};
use super::tracker::{PriceTracker, TickOutcome};
use crate::config::{AssetConfig, Config};
use crate::error::CryptoWeatherError;
use crate::format::parse_number;

/// Asset id to raw price string, as received from the push channel.
pub type PriceBatch = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Connected,
    Disconnected,
    Prices(PriceBatch),
    WeatherTick,
}

/// All live state in one place. A single owner applies events to it, so no
/// locking is involved.
pub struct LiveContext<C: Clock, R: Rng> {
    tracker: PriceTracker,
    engine: AlertEngine,
    store: NotificationStore,
    seeds: Vec<AssetConfig>,
    clock: C,
    rng: R,
    connected: bool,
    welcomed: bool,
}

impl<C: Clock, R: Rng> LiveContext<C, R> {
    pub fn new(config: &Config, clock: C, rng: R) -> Self {
        Self {
            tracker: PriceTracker::new(&config.assets),
            engine: AlertEngine::new(config),
            store: NotificationStore::new(config.max_notifications),
            seeds: config.assets.clone(),
            clock,
            rng,
            connected: false,
            welcomed: false,
        }
    }

    /// Applies one event and returns the notifications it produced.
    pub fn apply(&mut self, event: LiveEvent) -> Vec<Notification> {
        match event {
            LiveEvent::Connected => self.on_connected(),
            LiveEvent::Disconnected => {
                self.connected = false;
                Vec::new()
            }
            LiveEvent::Prices(batch) => batch
                .iter()
                .filter_map(|(asset, raw)| self.on_tick(asset, raw))
                .collect(),
            LiveEvent::WeatherTick => {
                let now = self.clock.now();
                self.engine
                    .check_weather(now, &mut self.rng)
                    .map(|alert| self.push(alert))
                    .into_iter()
                    .collect()
            }
        }
    }

    fn on_connected(&mut self) -> Vec<Notification> {
        self.connected = true;
        if self.welcomed {
            return Vec::new();
        }
        self.welcomed = true;

        for asset in &self.seeds {
            self.tracker.seed(&asset.id, asset.seed_price);
        }

        vec![self.push(AlertMessage {
            kind: NotificationKind::WeatherAlert,
            title: "Welcome to CryptoWeather Nexus".to_string(),
            message: "You will receive real-time updates for weather and crypto prices."
                .to_string(),
        })]
    }

    fn on_tick(&mut self, asset: &str, raw: &str) -> Option<Notification> {
        let price = parse_number(raw);

        match self.tracker.update(asset, price) {
            TickOutcome::Untracked => None,
            TickOutcome::Rejected => {
                let err = CryptoWeatherError::InvalidPrice {
                    asset: asset.to_string(),
                    raw: raw.to_string(),
                };
                warn!("{}", err);
                None
            }
            TickOutcome::NoBaseline => {
                debug!("{}: first price {}, no baseline yet", asset, raw);
                None
            }
            TickOutcome::Changed(delta) => {
                let now = self.clock.now();
                let alert = self.engine.check_price(asset, &delta, now)?;
                self.tracker.mark_alerted(asset, now);
                Some(self.push(alert))
            }
        }
    }

    fn push(&mut self, alert: AlertMessage) -> Notification {
        let now = self.clock.now();
        self.store
            .add(alert.kind, alert.title, alert.message, now)
            .clone()
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        self.store.mark_read(id)
    }

    pub fn mark_all_read(&mut self) {
        self.store.mark_all_read();
    }

    pub fn clear_notifications(&mut self) {
        self.store.clear();
    }

    pub fn tracker(&self) -> &PriceTracker {
        &self.tracker
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.store
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Headless consumer: drains events until every sender is gone and logs what
/// they produce.
pub struct Dispatcher<C: Clock, R: Rng> {
    context: LiveContext<C, R>,
}

impl<C: Clock, R: Rng> Dispatcher<C, R> {
    pub fn new(context: LiveContext<C, R>) -> Self {
        Self { context }
    }

    pub async fn run(&mut self, mut receiver: mpsc::Receiver<LiveEvent>) {
        while let Some(event) = receiver.recv().await {
            for notification in self.context.apply(event) {
                info!(
                    "[{}] {}: {} ({} unread)",
                    notification.kind.label(),
                    notification.title,
                    notification.message,
                    self.context.notifications().unread_count()
                );
                match serde_json::to_string(&notification) {
                    Ok(json) => debug!("notification json: {}", json),
                    Err(e) => warn!("Failed to serialize notification: {}", e),
                }
            }
        }
        info!("event channel closed, dispatcher stopping");
    }

    pub fn context(&self) -> &LiveContext<C, R> {
        &self.context
    }
}
