use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};
use uuid::Uuid;

use domain::services::broadcaster::Broadcaster;

use crate::messages::{ClientMessage, ServerMessage};

/// Pumps `Broadcaster` events for one draft down one axum WebSocket
/// until the draft is deleted, the socket closes, or the subscriber
/// lags far enough behind to be dropped. There is no separate
/// connection registry here — the domain `Broadcaster` already owns
/// the fan-out; this is just the wire adapter for a single connection.
#[derive(Clone)]
pub struct DraftConnectionManager {
    broadcaster: Broadcaster,
}

impl DraftConnectionManager {
    pub fn new(broadcaster: Broadcaster) -> Self {
        Self { broadcaster }
    }

    pub async fn run_connection(&self, socket: WebSocket, draft_id: Uuid) {
        let mut rx = self.broadcaster.subscribe(draft_id);
        let (mut sink, mut stream) = socket.split();

        loop {
            tokio::select! {
                event = rx.recv() => {
                    match event {
                        Ok(event) => {
                            let message = ServerMessage::from(event);
                            if !send_message(&mut sink, &message).await {
                                break;
                            }
                            if matches!(message, ServerMessage::Deleted) {
                                break;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(draft_id = %draft_id, skipped, "subscriber lagged, client should refetch state");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => {
                            if let Ok(ClientMessage::Ping) = ClientMessage::from_json(&text) {
                                if !send_message(&mut sink, &ServerMessage::Pong).await {
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => continue,
                        Some(Err(err)) => {
                            debug!(draft_id = %draft_id, error = %err, "websocket read error");
                            break;
                        }
                    }
                }
            }
        }
    }
}

async fn send_message(
    sink: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> bool {
    let Ok(json) = message.to_json() else {
        warn!("failed to serialize server message");
        return false;
    };
    sink.send(Message::Text(json.into())).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_can_be_constructed() {
        let manager = DraftConnectionManager::new(Broadcaster::new());
        let _ = manager.clone();
    }
}
