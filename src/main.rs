use cryptoweather::api::coincap::ws::PriceFeed;
use cryptoweather::config::Config;
use cryptoweather::core::clock::SystemClock;
use cryptoweather::core::context::{Dispatcher, LiveContext};
use cryptoweather::core::weather::WeatherSimulation;
use cryptoweather::ui::dashboard::Dashboard;
use env_logger::Builder;
use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env();

    // Configure logger
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("cryptoweather", LevelFilter::Debug)
        .parse_default_env() // RUST_LOG overrides the defaults above
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr) // Keep logs separate from TUI
        .write_style(env_logger::WriteStyle::Always)
        .init();

    info!("Starting CryptoWeather Nexus...");

    let (event_tx, event_rx) = tokio::sync::mpsc::channel(100);

    let mut feed = PriceFeed::new(config.feed_url.clone(), config.reconnect_delay);
    feed.connect(event_tx.clone());

    let mut weather = WeatherSimulation::new(
        config.first_weather_delay,
        config.weather_interval_ms.clone(),
        StdRng::from_entropy(),
    );
    weather.start(event_tx);

    let context = LiveContext::new(&config, SystemClock, StdRng::from_entropy());

    let result = if config.headless {
        let mut dispatcher = Dispatcher::new(context);
        tokio::select! {
            _ = dispatcher.run(event_rx) => {},
            _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        };
        Ok(())
    } else {
        Dashboard::new(context).run(event_rx).await
    };

    // Stop timers and close the channel before exit
    weather.stop();
    feed.disconnect();

    info!("Shutdown complete");
    result
}
