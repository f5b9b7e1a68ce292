use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::context::LiveEvent;

/// Delay before the next simulated weather tick, uniform over `range_ms`.
pub fn next_weather_delay<R: Rng + ?Sized>(rng: &mut R, range_ms: &Range<u64>) -> Duration {
    if range_ms.is_empty() {
        return Duration::from_millis(range_ms.start);
    }
    Duration::from_millis(rng.gen_range(range_ms.clone()))
}

/// Timer task that feeds `LiveEvent::WeatherTick` into the event channel.
///
/// Delays come from the injected `rng`; each started task gets its own
/// generator seeded from it.
pub struct WeatherSimulation<R: Rng> {
    first_delay: Duration,
    interval_ms: Range<u64>,
    rng: R,
    task: Option<JoinHandle<()>>,
}

impl<R: Rng> WeatherSimulation<R> {
    pub fn new(first_delay: Duration, interval_ms: Range<u64>, rng: R) -> Self {
        Self {
            first_delay,
            interval_ms,
            rng,
            task: None,
        }
    }

    fn task_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.gen())
    }

    /// Starts the timer, replacing any timer already running.
    pub fn start(&mut self, sender: mpsc::Sender<LiveEvent>) {
        self.stop();

        let first_delay = self.first_delay;
        let interval_ms = self.interval_ms.clone();
        info!(
            "Starting weather alert simulation (first in {:?}, then every {}-{}ms)",
            first_delay, interval_ms.start, interval_ms.end
        );

        let mut rng = self.task_rng();
        self.task = Some(tokio::spawn(async move {
            let mut delay = first_delay;

            loop {
                tokio::time::sleep(delay).await;
                if sender.send(LiveEvent::WeatherTick).await.is_err() {
                    debug!("event channel closed, weather simulation exiting");
                    break;
                }
                delay = next_weather_delay(&mut rng, &interval_ms);
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Weather alert simulation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }
}

impl<R: Rng> Drop for WeatherSimulation<R> {
    fn drop(&mut self) {
        self.stop();
    }
}
