use std::sync::mpsc::{self, Receiver, Sender};

use volley_shared::protocol::{ClientMsg, Intent, ServerMsg, PROTOCOL_VERSION};
use volley_shared::slot::Slot;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to build network runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to spawn network thread: {0}")]
    Thread(String),
}

#[derive(Debug, Clone)]
pub enum NetEvent {
    Connected,
    Disconnected,
    Message(ServerMsg),
    ProtocolMismatch { server: u32, client: u32 },
    Failed(String),
}

type CmdSender = tokio::sync::mpsc::UnboundedSender<ClientMsg>;

/// WebSocket link to the relay, run on its own thread.
///
/// Events are drained once per tick with [`ServerConnection::poll_events`].
/// Sends are fire-and-forget. There is no reconnect: once the socket closes,
/// the match is over.
pub struct ServerConnection {
    event_rx: Receiver<NetEvent>,
    cmd_tx: CmdSender,
}

impl ServerConnection {
    pub fn connect(url: String) -> Result<Self, ConnectionError> {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let cmd_tx = spawn_network_thread(url, event_tx)?;
        Ok(Self { event_rx, cmd_tx })
    }

    pub fn poll_events(&mut self) -> Vec<NetEvent> {
        self.event_rx.try_iter().collect()
    }

    pub fn send_intent(&self, slot: Slot, intent: Intent) {
        self.send(ClientMsg::intent(slot, intent));
    }

    pub fn send_disconnect_request(&self) {
        self.send(ClientMsg::DisconnectRequest);
    }

    pub fn send(&self, msg: ClientMsg) {
        // The network thread is gone once the socket closes.
        let _ = self.cmd_tx.send(msg);
    }

    #[cfg(test)]
    fn stub() -> (Self, Sender<NetEvent>, tokio::sync::mpsc::UnboundedReceiver<ClientMsg>) {
        let (event_tx, event_rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        (
            Self { event_rx, cmd_tx },
            event_tx,
            cmd_rx,
        )
    }
}

fn spawn_network_thread(url: String, event_tx: Sender<NetEvent>) -> Result<CmdSender, ConnectionError> {
    let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel::<ClientMsg>();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;

    std::thread::Builder::new()
        .name("volley-net".to_string())
        .spawn(move || rt.block_on(run_socket(url, event_tx, cmd_rx)))
        .map_err(|e| ConnectionError::Thread(e.to_string()))?;

    Ok(cmd_tx)
}

async fn run_socket(
    url: String,
    event_tx: Sender<NetEvent>,
    mut cmd_rx: tokio::sync::mpsc::UnboundedReceiver<ClientMsg>,
) {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            tracing::warn!("Could not connect to {}: {}", url, e);
            let _ = event_tx.send(NetEvent::Failed(e.to_string()));
            return;
        }
    };

    let _ = event_tx.send(NetEvent::Connected);
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                if let Ok(text) = serde_json::to_string(&cmd) {
                    if write.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(txt))) => {
                        let server_msg = match serde_json::from_str::<ServerMsg>(&txt) {
                            Ok(m) => m,
                            Err(e) => {
                                tracing::debug!("Ignoring unparseable frame: {}", e);
                                continue;
                            }
                        };
                        if let ServerMsg::Welcome(w) = &server_msg {
                            if w.protocol_version != PROTOCOL_VERSION {
                                let _ = event_tx.send(NetEvent::ProtocolMismatch {
                                    server: w.protocol_version,
                                    client: PROTOCOL_VERSION,
                                });
                                let _ = write.close().await;
                                break;
                            }
                        }
                        let _ = event_tx.send(NetEvent::Message(server_msg));
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("Socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    let _ = event_tx.send(NetEvent::Disconnected);
}
