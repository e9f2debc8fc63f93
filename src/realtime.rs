use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::auth::extractor::AuthUser;
use crate::models::{MaintenanceRequest, SecurityAlert};
use crate::sentiment::Sentiment;
use crate::state::SharedState;

const CHANNEL_CAPACITY: usize = 256;

/// Envelope pushed to every socket as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    MaintenanceRequest(MaintenanceRequest),
    UrgentMaintenance(UrgentMaintenance),
    MaintenanceCompleted(MaintenanceRequest),
    SecurityAlert(SecurityAlert),
}

#[derive(Debug, Clone, Serialize)]
pub struct UrgentMaintenance {
    pub request: MaintenanceRequest,
    pub sentiment: Sentiment,
}

/// Best-effort fan-out. Slow subscribers lose the oldest events; nothing is
/// replayed.
pub struct Broadcaster {
    tx: broadcast::Sender<String>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: &Event) {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("Failed to serialize event: {e}");
                return;
            }
        };
        // Err only means nobody is listening.
        let delivered = self.tx.send(payload).unwrap_or(0);
        tracing::debug!("Broadcast event to {delivered} subscribers");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn ws_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    ws: WebSocketUpgrade,
) -> Response {
    let rx = state.broadcaster.subscribe();
    ws.on_upgrade(move |socket| relay(socket, rx, auth.user_id))
}

async fn relay(socket: WebSocket, mut rx: broadcast::Receiver<String>, user_id: u64) {
    tracing::info!("WebSocket client connected (user {user_id})");
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(payload) => {
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("WebSocket client (user {user_id}) lagged, {skipped} events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("WebSocket error (user {user_id}): {e}");
                    break;
                }
            },
        }
    }

    tracing::info!("WebSocket client disconnected (user {user_id})");
}
