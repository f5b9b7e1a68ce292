use std::env;
use std::ops::Range;
use std::time::Duration;

pub const PRICE_ALERT_THRESHOLD_PERCENT: f64 = 0.5;
pub const PRICE_ALERT_COOLDOWN_MS: i64 = 30_000;
pub const WEATHER_ALERT_COOLDOWN_MS: i64 = 60_000;
pub const MAX_NOTIFICATIONS: usize = 30;
pub const RECONNECT_DELAY_MS: u64 = 5_000;

// Weather simulation timing
pub const WEATHER_INTERVAL_MS: Range<u64> = 20_000..45_000;
pub const FIRST_WEATHER_ALERT_MS: u64 = 6_000;

const DEFAULT_WS_BASE: &str = "wss://ws.coincap.io/prices";

/// A tracked asset and the baseline price seeded on first connect.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub id: String,
    pub seed_price: f64,
    pub alert_threshold_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherCondition {
    pub condition: &'static str,
    pub message: &'static str,
}

pub const WEATHER_CONDITIONS: &[WeatherCondition] = &[
    WeatherCondition {
        condition: "Heavy Rain",
        message: "Expected heavy rainfall in the next 24 hours.",
    },
    WeatherCondition {
        condition: "Strong Winds",
        message: "Wind speeds expected to reach 40mph.",
    },
    WeatherCondition {
        condition: "Heat Wave",
        message: "Temperatures expected to rise above 100°F.",
    },
    WeatherCondition {
        condition: "Thunderstorm",
        message: "Thunderstorms expected in the evening.",
    },
    WeatherCondition {
        condition: "Snow",
        message: "Heavy snowfall expected overnight.",
    },
];

pub const WEATHER_CITIES: &[&str] = &["New York", "London", "Tokyo"];

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub headless: bool,
    pub assets: Vec<AssetConfig>,
    pub cities: Vec<String>,
    pub price_cooldown: chrono::Duration,
    pub weather_cooldown: chrono::Duration,
    pub max_notifications: usize,
    pub reconnect_delay: Duration,
    pub weather_interval_ms: Range<u64>,
    pub first_weather_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let assets = vec![
            AssetConfig {
                id: "bitcoin".to_string(),
                seed_price: 68742.50,
                alert_threshold_percent: PRICE_ALERT_THRESHOLD_PERCENT,
            },
            AssetConfig {
                id: "ethereum".to_string(),
                seed_price: 3521.75,
                alert_threshold_percent: PRICE_ALERT_THRESHOLD_PERCENT,
            },
            AssetConfig {
                id: "solana".to_string(),
                seed_price: 147.25,
                alert_threshold_percent: PRICE_ALERT_THRESHOLD_PERCENT,
            },
        ];

        Self {
            feed_url: default_feed_url(&assets),
            headless: false,
            assets,
            cities: WEATHER_CITIES.iter().map(|c| c.to_string()).collect(),
            price_cooldown: chrono::Duration::milliseconds(PRICE_ALERT_COOLDOWN_MS),
            weather_cooldown: chrono::Duration::milliseconds(WEATHER_ALERT_COOLDOWN_MS),
            max_notifications: MAX_NOTIFICATIONS,
            reconnect_delay: Duration::from_millis(RECONNECT_DELAY_MS),
            weather_interval_ms: WEATHER_INTERVAL_MS,
            first_weather_delay: Duration::from_millis(FIRST_WEATHER_ALERT_MS),
        }
    }
}

impl Config {
    /// Defaults plus the runtime knobs from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("COINCAP_WEBSOCKET_URL") {
            if !url.trim().is_empty() {
                config.feed_url = url;
            }
        }

        config.headless = env::var("CRYPTOWEATHER_HEADLESS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        config
    }
}

fn default_feed_url(assets: &[AssetConfig]) -> String {
    let ids = assets
        .iter()
        .map(|a| a.id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    format!("{}?assets={}", DEFAULT_WS_BASE, ids)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
