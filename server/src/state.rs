use std::collections::BTreeSet;

use volley_shared::protocol::{
    ConnectionId, GotchiProfile, JoinRejectedMsg, PeerDisconnectedMsg, ServerMsg,
};

use crate::matchmaking::{JoinOutcome, MatchmakingPool};
use crate::relay::RelayBroadcast;

/// Relay state owned by the relay task.
///
/// Handlers return the broadcasts they produce instead of sending them, so the
/// state can be driven directly in tests.
pub struct RelayState {
    pool: MatchmakingPool,
    connections: BTreeSet<ConnectionId>,
    next_connection_id: u32,
}

impl RelayState {
    pub fn new(pool: MatchmakingPool) -> Self {
        Self {
            pool,
            connections: BTreeSet::new(),
            next_connection_id: 1,
        }
    }

    /// Register a new connection and return its identity.
    pub fn connect(&mut self) -> ConnectionId {
        let id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;
        self.connections.insert(id);
        id
    }

    pub fn submit_profile(&mut self, id: ConnectionId, profile: GotchiProfile) -> Vec<RelayBroadcast> {
        let name = profile.name.clone();
        match self.pool.submit(id, profile) {
            Ok(JoinOutcome::Waiting(slot)) => {
                tracing::info!("Connection {} ({}) waiting as slot {}", id, name, slot);
                Vec::new()
            }
            Ok(JoinOutcome::Formed(m)) => {
                tracing::info!(
                    "Match formed: {} vs {}",
                    m.entries[0].profile.name,
                    m.entries[1].profile.name
                );
                vec![RelayBroadcast::All(ServerMsg::MatchFormed(m.to_msg()))]
            }
            Err(err) => {
                tracing::warn!("Rejected profile from connection {}: {}", id, err);
                vec![RelayBroadcast::Only {
                    id,
                    msg: ServerMsg::JoinRejected(JoinRejectedMsg {
                        reason: err.to_string(),
                    }),
                }]
            }
        }
    }

    /// Drop a connection. Remaining connections are always told a peer left.
    pub fn disconnect(&mut self, id: ConnectionId) -> Vec<RelayBroadcast> {
        self.connections.remove(&id);
        if let Some(entry) = self.pool.leave(id) {
            tracing::info!("Slot {} freed by connection {}", entry.slot, id);
        }
        vec![RelayBroadcast::All(ServerMsg::PeerDisconnected(
            PeerDisconnectedMsg { connection_id: id },
        ))]
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn pool(&self) -> &MatchmakingPool {
        &self.pool
    }
}
