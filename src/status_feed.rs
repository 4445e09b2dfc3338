//! Websocket listener that mirrors server status lines into the chat.

use futures::channel::mpsc;
use futures::StreamExt as _;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::http_client::runtime;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Connect to `url` in the background and stream status lines.
///
/// The listener reconnects with capped exponential backoff and exits once the
/// returned receiver is dropped.
pub fn subscribe(url: String) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded();

    runtime().spawn(async move {
        let mut backoff = INITIAL_BACKOFF;

        while !tx.is_closed() {
            match connect_async(url.as_str()).await {
                Ok((mut stream, _)) => {
                    log::info!("Connected to status feed at {}", url);
                    backoff = INITIAL_BACKOFF;

                    while let Some(frame) = stream.next().await {
                        let text = match frame {
                            Ok(Message::Text(text)) => text,
                            Ok(Message::Close(_)) => break,
                            Ok(_) => continue,
                            Err(e) => {
                                log::warn!("Status feed error: {}", e);
                                break;
                            }
                        };

                        if let Some(line) = status_line(&text) {
                            if tx.unbounded_send(line).is_err() {
                                return;
                            }
                        }
                    }
                    log::info!("Status feed at {} disconnected", url);
                }
                Err(e) => {
                    log::debug!("Status feed at {} unavailable: {}", url, e);
                }
            }

            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    });

    rx
}

/// Extract the line to display from one websocket text frame.
///
/// JSON objects contribute their `message` (or `status`) string field; anything else
/// is shown as trimmed text. Blank frames yield nothing.
pub fn status_line(frame: &str) -> Option<String> {
    let trimmed = frame.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "status"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    Some(trimmed.to_string())
}
