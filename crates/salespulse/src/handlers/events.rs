//! SSE observer endpoint.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};

use serde::Serialize;

use salespulse_core::notify::{NotificationEvent, ObserverId};

use crate::state::AppState;

/// GET /events - Streams notification events as Server-Sent Events.
///
/// The connection registers as an observer for its lifetime and is greeted
/// with a personal `connected` event carrying its observer id.
pub async fn events_sse(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let mut shutdown_rx = state.subscribe_shutdown();
    let mut subscription = state.broadcaster.subscribe(state.observer_buffer).await;
    let observer_id = subscription.id();
    tracing::debug!(%observer_id, "SSE observer connected");

    state
        .broadcaster
        .send(observer_id, &NotificationEvent::Connected { observer_id })
        .await;

    let stream = async_stream::stream! {
        loop {
            let event = tokio::select! {
                event = subscription.recv() => event,
                _ = shutdown_rx.recv() => {
                    tracing::info!(%observer_id, "SSE session received shutdown signal");
                    break;
                }
            };

            let Some(event) = event else {
                tracing::debug!(%observer_id, "SSE observer dropped by broadcaster");
                break;
            };

            if let Some(frame) = to_sse_event(observer_id, &event) {
                yield Ok(frame);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(observer_id: ObserverId, event: &NotificationEvent) -> Option<Event> {
    let data = encode_event(observer_id, event)?;
    Some(Event::default().event(event.event_type()).data(data))
}

/// JSON text of an outgoing event. Unserializable events are logged and
/// skipped rather than sent as empty frames.
pub(crate) fn encode_event<T: Serialize + ?Sized>(
    observer_id: ObserverId,
    event: &T,
) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::warn!(%observer_id, error = %err, "Failed to serialize event, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_encode_event_renders_json() {
        let text = encode_event(ObserverId::new(), &NotificationEvent::DataUpdated).unwrap();
        assert_eq!(text, r#"{"type":"data_updated"}"#);
    }

    #[test]
    fn test_unserializable_event_is_skipped() {
        // JSON object keys must be strings.
        let event: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        assert_eq!(encode_event(ObserverId::new(), &event), None);
    }

    #[test]
    fn test_sse_frame_is_built_for_events() {
        let event = NotificationEvent::TrainingStarted {
            category: "Books".to_string(),
        };
        assert!(to_sse_event(ObserverId::new(), &event).is_some());
    }
}
