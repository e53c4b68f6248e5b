use tokio::sync::{broadcast, mpsc, oneshot};

use volley_shared::protocol::{ConnectionId, GotchiProfile, Intent, ServerMsg};
use volley_shared::slot::Slot;

use crate::state::RelayState;

/// Commands from client connections to the relay task
pub enum RelayCommand {
    Connect {
        response: oneshot::Sender<ConnectionId>,
    },
    SubmitProfile {
        id: ConnectionId,
        profile: GotchiProfile,
    },
    Disconnect {
        id: ConnectionId,
    },
}

/// Messages fanned out to connection tasks
#[derive(Debug, Clone)]
pub enum RelayBroadcast {
    All(ServerMsg),
    Only { id: ConnectionId, msg: ServerMsg },
}

impl RelayBroadcast {
    /// The message connection `id` should forward, if any.
    pub fn message_for(&self, id: ConnectionId) -> Option<&ServerMsg> {
        match self {
            RelayBroadcast::All(msg) => Some(msg),
            RelayBroadcast::Only { id: target, msg } if *target == id => Some(msg),
            RelayBroadcast::Only { .. } => None,
        }
    }
}

/// Mirror an intent to every connection, the sender included.
///
/// Carries no state: nothing is buffered, deduplicated or validated, and a
/// lost message is simply lost. Clients resend held input every tick.
pub fn relay_intent(player_slot: Slot, intent: Intent) -> RelayBroadcast {
    RelayBroadcast::All(ServerMsg::relayed(player_slot, intent))
}

/// Run the relay task. Owns the matchmaking state handed to it.
pub async fn run_relay(
    mut cmd_rx: mpsc::Receiver<RelayCommand>,
    broadcast_tx: broadcast::Sender<RelayBroadcast>,
    mut state: RelayState,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let outgoing = match cmd {
            RelayCommand::Connect { response } => {
                let id = state.connect();
                tracing::info!("A user connected: {}", id);
                let _ = response.send(id);
                Vec::new()
            }
            RelayCommand::SubmitProfile { id, profile } => state.submit_profile(id, profile),
            RelayCommand::Disconnect { id } => {
                tracing::info!("A user disconnected: {}", id);
                state.disconnect(id)
            }
        };

        for msg in outgoing {
            // No receivers is fine: nobody is left to notify.
            let _ = broadcast_tx.send(msg);
        }
    }

    tracing::info!("Relay loop ended");
}
