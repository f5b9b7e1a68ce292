use futures_util::StreamExt;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;

use super::message::decode_prices;
use crate::core::context::LiveEvent;
use crate::error::CryptoWeatherError;

/// Live price subscription with automatic reconnect.
pub struct PriceFeed {
    url: String,
    reconnect_delay: Duration,
    task: Option<JoinHandle<()>>,
}

impl PriceFeed {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
            task: None,
        }
    }

    /// (Re)subscribes. Any running connection is closed first, so calling this
    /// repeatedly never leaves more than one connection alive.
    pub fn connect(&mut self, sender: mpsc::Sender<LiveEvent>) {
        self.disconnect();

        let url = self.url.clone();
        let delay = self.reconnect_delay;
        self.task = Some(tokio::spawn(run_feed(url, delay, sender)));
    }

    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Price feed disconnected");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn run_feed(url: String, reconnect_delay: Duration, sender: mpsc::Sender<LiveEvent>) {
    loop {
        match stream_prices(&url, &sender).await {
            Ok(()) => info!("WebSocket connection closed"),
            Err(e) => error!("WebSocket error: {}", e),
        }

        if sender.send(LiveEvent::Disconnected).await.is_err() {
            debug!("event channel closed, price feed exiting");
            return;
        }

        info!("Reconnecting in {:?}", reconnect_delay);
        tokio::time::sleep(reconnect_delay).await;
    }
}

async fn stream_prices(
    url: &str,
    sender: &mpsc::Sender<LiveEvent>,
) -> Result<(), CryptoWeatherError> {
    info!("Connecting to price WebSocket: {}", url);

    let (mut ws_stream, _) = connect_async(url).await?;
    info!("Successfully connected to WebSocket");

    if sender.send(LiveEvent::Connected).await.is_err() {
        return Ok(());
    }

    while let Some(message) = ws_stream.next().await {
        match message? {
            tungstenite::protocol::Message::Text(text) => match decode_prices(&text) {
                Ok(batch) => {
                    debug!("price frame with {} assets", batch.len());
                    if sender.send(LiveEvent::Prices(batch)).await.is_err() {
                        return Ok(());
                    }
                }
                Err(e) => {
                    warn!("Failed to parse price frame: {}", e);
                }
            },
            tungstenite::protocol::Message::Close(_) => break,
            _ => {} // Ignore other message types
        }
    }

    Ok(())
}
