//! Server-Sent Events (SSE) for live roster updates
//!
//! Each connection owns its own projection subscription; closing the
//! connection drops the stream and with it the subscription.

use async_stream::stream;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use docfinder_common::sse::{json_event, keep_alive};
use futures::stream::Stream;
use std::convert::Infallible;
use tracing::debug;

use crate::roster::RosterSubscription;
use crate::AppState;

/// Event name carried by every roster push
pub const ROSTER_CHANGED: &str = "RosterChanged";

/// GET /api/events
///
/// Sends the current roster right away, then one `RosterChanged` event per
/// rebuild.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = RosterSubscription::subscribe(state.store.as_ref());
    debug!("SSE client subscribed to roster");

    let stream = stream! {
        if let Some(event) = json_event(ROSTER_CHANGED, subscription.view().as_ref()) {
            yield Ok(event);
        }
        while let Some(view) = subscription.changed().await {
            if let Some(event) = json_event(ROSTER_CHANGED, view.as_ref()) {
                yield Ok(event);
            }
        }
    };

    Sse::new(stream).keep_alive(keep_alive())
}
