//! WebSocket observer endpoint.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

use salespulse_core::notify::NotificationEvent;

use super::events::encode_event;
use crate::state::AppState;

/// GET /ws - Upgrades to a WebSocket observer.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut shutdown_rx = state.subscribe_shutdown();
    let mut subscription = state.broadcaster.subscribe(state.observer_buffer).await;
    let observer_id = subscription.id();
    tracing::debug!(%observer_id, "WebSocket observer connected");

    state
        .broadcaster
        .send(observer_id, &NotificationEvent::Connected { observer_id })
        .await;

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    tracing::debug!(%observer_id, "WebSocket observer dropped by broadcaster");
                    break;
                };
                let Some(text) = encode_event(observer_id, &event) else {
                    continue;
                };
                if let Err(err) = sender.send(Message::Text(text.into())).await {
                    tracing::debug!(%observer_id, error = %err, "WebSocket send failed");
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!(%observer_id, message = %text.as_str(), "WebSocket message received");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%observer_id, error = %err, "WebSocket receive failed");
                    break;
                }
            },
            _ = shutdown_rx.recv() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    tracing::debug!(%observer_id, "WebSocket observer disconnected");
}
