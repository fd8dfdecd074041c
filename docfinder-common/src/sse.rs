//! Server-Sent Events (SSE) utilities

use axum::response::sse::{Event, KeepAlive};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Keep-alive policy shared by every event stream
pub fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("heartbeat")
}

/// Build a named SSE event with a JSON payload
///
/// Returns None (and logs) when the payload fails to serialize.
pub fn json_event<T: Serialize>(event_type: &str, data: &T) -> Option<Event> {
    match Event::default().event(event_type).json_data(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to serialize {} event: {}", event_type, e);
            None
        }
    }
}
