use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};

use volley_shared::config::GameConfig;
use volley_shared::protocol::{ClientMsg, ServerMsg, WelcomeMsg, PROTOCOL_VERSION};

use crate::relay::{relay_intent, RelayBroadcast, RelayCommand};

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub relay_tx: mpsc::Sender<RelayCommand>,
    pub broadcast_tx: broadcast::Sender<RelayBroadcast>,
    pub game: GameConfig,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before registering so a match formed right after our own
    // submission cannot be missed.
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .relay_tx
        .send(RelayCommand::Connect { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Connect command");
        return;
    }

    let my_id = match resp_rx.await {
        Ok(id) => id,
        Err(_) => {
            tracing::error!("Failed to receive connection id");
            return;
        }
    };

    let welcome = ServerMsg::Welcome(WelcomeMsg {
        protocol_version: PROTOCOL_VERSION,
        server_version: env!("CARGO_PKG_VERSION").to_string(),
        connection_id: my_id,
        config: app_state.game,
    });
    let sent = match serde_json::to_string(&welcome) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    };

    if sent {
        loop {
            tokio::select! {
                // Client -> Server
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let client_msg = match serde_json::from_str::<ClientMsg>(&text) {
                                Ok(m) => m,
                                Err(e) => {
                                    tracing::debug!("Ignoring frame from {}: {}", my_id, e);
                                    continue;
                                }
                            };
                            if let Some((slot, intent)) = client_msg.as_intent() {
                                tracing::debug!("{} {:?} slot {}", my_id, intent, slot);
                                let _ = app_state.broadcast_tx.send(relay_intent(slot, intent));
                                continue;
                            }
                            match client_msg {
                                ClientMsg::SubmitProfile { profile } => {
                                    let _ = app_state
                                        .relay_tx
                                        .send(RelayCommand::SubmitProfile { id: my_id, profile })
                                        .await;
                                }
                                ClientMsg::DisconnectRequest => {
                                    tracing::info!("{} requested disconnect", my_id);
                                    let _ = sink.send(Message::Close(None)).await;
                                    break;
                                }
                                _ => {}
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(_)) => break,
                        _ => {} // Ignore ping/pong/binary
                    }
                }

                // Server -> Client (broadcast)
                result = broadcast_rx.recv() => {
                    match result {
                        Ok(broadcast) => {
                            let Some(msg) = broadcast.message_for(my_id) else {
                                continue;
                            };
                            if let Ok(json) = serde_json::to_string(msg) {
                                if sink.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            // Intents are resent every tick, dropping is fine
                            tracing::warn!("Connection {} lagged by {} messages", my_id, n);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    // Cleanup on disconnect
    let _ = app_state
        .relay_tx
        .send(RelayCommand::Disconnect { id: my_id })
        .await;
}
