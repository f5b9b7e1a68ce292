use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::cooldown::CooldownGate;
use super::notifications::NotificationKind;
use super::tracker::PriceDelta;
use crate::config::{Config, WeatherCondition, WEATHER_CONDITIONS};
use crate::format::format_fixed2;

/// Alert content handed to the notification store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Decides whether price moves and weather ticks become notifications.
pub struct AlertEngine {
    // separate gates so an asset id never shares a window with a city name
    price_cooldowns: CooldownGate,
    weather_cooldowns: CooldownGate,
    price_cooldown: Duration,
    weather_cooldown: Duration,
    conditions: &'static [WeatherCondition],
    cities: Vec<String>,
}

impl AlertEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            price_cooldowns: CooldownGate::new(),
            weather_cooldowns: CooldownGate::new(),
            price_cooldown: config.price_cooldown,
            weather_cooldown: config.weather_cooldown,
            conditions: WEATHER_CONDITIONS,
            cities: config.cities.clone(),
        }
    }

    pub fn check_price(
        &mut self,
        asset_id: &str,
        delta: &PriceDelta,
        now: DateTime<Utc>,
    ) -> Option<AlertMessage> {
        // NaN compares false, so a broken delta never fires
        if !(delta.percent >= delta.threshold_percent) {
            return None;
        }
        if !self.price_cooldowns.can_fire(asset_id, now, self.price_cooldown) {
            log::debug!("price alert for {} suppressed by cooldown", asset_id);
            return None;
        }

        self.price_cooldowns.record_fire(asset_id, now);

        let name = capitalize(asset_id);
        Some(AlertMessage {
            kind: NotificationKind::PriceAlert,
            title: format!("{} Price Alert", name),
            message: format!(
                "{} has {} by {}% to ${}",
                name,
                delta.direction.as_str(),
                format_fixed2(delta.percent),
                format_fixed2(delta.price)
            ),
        })
    }

    /// One weather simulation tick. Skips entirely when every city is still
    /// cooling down.
    pub fn check_weather<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<AlertMessage> {
        let available: Vec<&String> = self
            .cities
            .iter()
            .filter(|city| self.weather_cooldowns.can_fire(city, now, self.weather_cooldown))
            .collect();

        if available.is_empty() {
            log::debug!("all cities on cooldown, skipping weather tick");
            return None;
        }

        let condition = self.conditions.choose(rng)?;
        let city = (*available.choose(rng)?).clone();

        self.weather_cooldowns.record_fire(&city, now);

        Some(AlertMessage {
            kind: NotificationKind::WeatherAlert,
            title: format!("{} Alert for {}", condition.condition, city),
            message: condition.message.to_string(),
        })
    }

    /// Marks a city as just alerted without producing a notification.
    #[cfg(test)]
    fn record_weather(&mut self, city: &str, now: DateTime<Utc>) {
        self.weather_cooldowns.record_fire(city, now);
    }

    pub fn price_cooldowns(&self) -> &CooldownGate {
        &self.price_cooldowns
    }

    pub fn weather_cooldowns(&self) -> &CooldownGate {
        &self.weather_cooldowns
    }
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracker::Direction;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn delta(percent: f64, direction: Direction, price: f64) -> PriceDelta {
        PriceDelta {
            percent,
            direction,
            price,
            threshold_percent: 0.5,
        }
    }

    #[test]
    fn test_price_alert_text() {
        let mut engine = AlertEngine::new(&Config::default());
        let alert = engine
            .check_price("bitcoin", &delta(1.0, Direction::Increased, 101.0), t0())
            .unwrap();

        assert_eq!(alert.kind, NotificationKind::PriceAlert);
        assert_eq!(alert.title, "Bitcoin Price Alert");
        assert_eq!(alert.message, "Bitcoin has increased by 1.00% to $101.00");
    }

    #[test]
    fn test_price_below_threshold_does_not_fire_or_arm_cooldown() {
        let mut engine = AlertEngine::new(&Config::default());
        assert!(engine
            .check_price("bitcoin", &delta(0.49, Direction::Decreased, 99.51), t0())
            .is_none());
        assert!(engine.price_cooldowns().last_fired("bitcoin").is_none());
    }

    #[test]
    fn test_price_cooldown_per_asset() {
        let mut engine = AlertEngine::new(&Config::default());
        let d = delta(2.0, Direction::Decreased, 98.0);

        assert!(engine.check_price("bitcoin", &d, t0()).is_some());
        assert!(engine
            .check_price("bitcoin", &d, t0() + Duration::seconds(10))
            .is_none());
        assert!(engine
            .check_price("ethereum", &d, t0() + Duration::seconds(10))
            .is_some());
        assert!(engine
            .check_price("bitcoin", &d, t0() + Duration::seconds(30))
            .is_some());
    }

    #[test]
    fn test_nan_delta_never_fires() {
        let mut engine = AlertEngine::new(&Config::default());
        assert!(engine
            .check_price("bitcoin", &delta(f64::NAN, Direction::Increased, 1.0), t0())
            .is_none());
    }

    #[test]
    fn test_nan_price_renders_zero() {
        let mut engine = AlertEngine::new(&Config::default());
        let alert = engine
            .check_price("solana", &delta(3.0, Direction::Increased, f64::NAN), t0())
            .unwrap();
        assert_eq!(alert.message, "Solana has increased by 3.00% to $0.00");
    }

    #[test]
    fn test_weather_alert_uses_catalog() {
        let mut engine = AlertEngine::new(&Config::default());
        let mut rng = StdRng::seed_from_u64(1);

        let alert = engine.check_weather(t0(), &mut rng).unwrap();
        assert_eq!(alert.kind, NotificationKind::WeatherAlert);

        let condition = WEATHER_CONDITIONS
            .iter()
            .find(|c| alert.title.starts_with(c.condition))
            .expect("title starts with a catalog condition");
        assert_eq!(alert.message, condition.message);
        assert!(Config::default()
            .cities
            .iter()
            .any(|city| alert.title.ends_with(&format!("Alert for {}", city))));
    }

    #[test]
    fn test_weather_never_repeats_city_inside_cooldown() {
        let mut engine = AlertEngine::new(&Config::default());
        let mut rng = StdRng::seed_from_u64(42);

        let mut cities = Vec::new();
        for _ in 0..3 {
            let alert = engine.check_weather(t0(), &mut rng).unwrap();
            let city = alert.title.rsplit(" for ").next().unwrap().to_string();
            assert!(!cities.contains(&city), "{} fired twice", city);
            cities.push(city);
        }

        // every city is cooling down now
        assert!(engine
            .check_weather(t0() + Duration::seconds(59), &mut rng)
            .is_none());
        assert!(engine
            .check_weather(t0() + Duration::seconds(60), &mut rng)
            .is_some());
    }

    #[test]
    fn test_weather_skips_when_only_city_is_cooling_down() {
        let config = Config {
            cities: vec!["London".to_string()],
            ..Config::default()
        };
        let mut engine = AlertEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(3);

        engine.record_weather("London", t0());
        for secs in [1, 20, 45, 59] {
            assert!(engine
                .check_weather(t0() + Duration::seconds(secs), &mut rng)
                .is_none());
        }
        assert_eq!(engine.weather_cooldowns().last_fired("London"), Some(t0()));
    }

    #[test]
    fn test_asset_and_city_with_same_name_do_not_share_cooldown() {
        let config = Config {
            cities: vec!["London".to_string()],
            ..Config::default()
        };
        let mut engine = AlertEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(8);

        assert!(engine.check_weather(t0(), &mut rng).is_some());
        assert!(engine
            .check_price("London", &delta(2.0, Direction::Increased, 102.0), t0())
            .is_some());
        assert!(engine.price_cooldowns().last_fired("London").is_some());

        // the price fire must not have touched the weather window or vice versa
        assert_eq!(engine.weather_cooldowns().last_fired("London"), Some(t0()));
        assert!(engine
            .check_weather(t0() + Duration::seconds(60), &mut rng)
            .is_some());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bitcoin"), "Bitcoin");
        assert_eq!(capitalize(""), "");
    }
}
