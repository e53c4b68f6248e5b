use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::GameConfig;
use crate::slot::Slot;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Server-assigned identity of one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(transparent)]
pub struct ConnectionId(pub u32);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Aavegotchi profile a client submits to enter matchmaking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GotchiProfile {
    pub name: String,
    pub token_id: String,
    pub haunt_id: String,
    pub collateral_address: String,
    pub numeric_traits: [i32; 6],
    pub equipped_wearables: [u32; 16],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "lowercase")]
pub enum KickDirection {
    Left,
    Right,
}

/// A per-tick player input signal, independent of its wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    GoIdle,
    Jump,
    BoostDown,
    Kick(KickDirection),
}

// === Server -> Client ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "match_formed")]
    MatchFormed(MatchFormedMsg),
    #[serde(rename = "join_rejected")]
    JoinRejected(JoinRejectedMsg),
    #[serde(rename = "handle_move_left")]
    HandleMoveLeft(PlayerSlotMsg),
    #[serde(rename = "handle_move_right")]
    HandleMoveRight(PlayerSlotMsg),
    #[serde(rename = "handle_go_idle")]
    HandleGoIdle(PlayerSlotMsg),
    #[serde(rename = "handle_jump")]
    HandleJump(PlayerSlotMsg),
    #[serde(rename = "handle_boost_down")]
    HandleBoostDown(PlayerSlotMsg),
    #[serde(rename = "handle_kick")]
    HandleKick(KickMsg),
    #[serde(rename = "peer_disconnected")]
    PeerDisconnected(PeerDisconnectedMsg),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub connection_id: ConnectionId,
    pub config: GameConfig,
}

/// Both entries of a completed match, slot 1 first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct MatchFormedMsg {
    pub players: Vec<MatchEntryWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct MatchEntryWire {
    #[ts(type = "1 | 2")]
    pub slot: Slot,
    pub connection_id: ConnectionId,
    pub profile: GotchiProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct JoinRejectedMsg {
    pub reason: String,
}

/// A connection left. Sent to every remaining connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PeerDisconnectedMsg {
    pub connection_id: ConnectionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlotMsg {
    #[ts(type = "1 | 2")]
    pub player_slot: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct KickMsg {
    #[ts(type = "1 | 2")]
    pub player_slot: Slot,
    pub direction: KickDirection,
}

// === Client -> Server ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "submit_profile")]
    SubmitProfile { profile: GotchiProfile },
    #[serde(rename = "move_left")]
    MoveLeft(PlayerSlotMsg),
    #[serde(rename = "move_right")]
    MoveRight(PlayerSlotMsg),
    #[serde(rename = "go_idle")]
    GoIdle(PlayerSlotMsg),
    #[serde(rename = "jump")]
    Jump(PlayerSlotMsg),
    #[serde(rename = "boost_down")]
    BoostDown(PlayerSlotMsg),
    #[serde(rename = "kick")]
    Kick(KickMsg),
    #[serde(rename = "disconnect_request")]
    DisconnectRequest,
}

// === Intent envelopes ===

impl ClientMsg {
    pub fn intent(player_slot: Slot, intent: Intent) -> Self {
        let slot = PlayerSlotMsg { player_slot };
        match intent {
            Intent::MoveLeft => ClientMsg::MoveLeft(slot),
            Intent::MoveRight => ClientMsg::MoveRight(slot),
            Intent::GoIdle => ClientMsg::GoIdle(slot),
            Intent::Jump => ClientMsg::Jump(slot),
            Intent::BoostDown => ClientMsg::BoostDown(slot),
            Intent::Kick(direction) => ClientMsg::Kick(KickMsg {
                player_slot,
                direction,
            }),
        }
    }

    /// The intent carried by this message, if it is one.
    pub fn as_intent(&self) -> Option<(Slot, Intent)> {
        match self {
            ClientMsg::MoveLeft(m) => Some((m.player_slot, Intent::MoveLeft)),
            ClientMsg::MoveRight(m) => Some((m.player_slot, Intent::MoveRight)),
            ClientMsg::GoIdle(m) => Some((m.player_slot, Intent::GoIdle)),
            ClientMsg::Jump(m) => Some((m.player_slot, Intent::Jump)),
            ClientMsg::BoostDown(m) => Some((m.player_slot, Intent::BoostDown)),
            ClientMsg::Kick(m) => Some((m.player_slot, Intent::Kick(m.direction))),
            ClientMsg::SubmitProfile { .. } | ClientMsg::DisconnectRequest => None,
        }
    }
}

impl ServerMsg {
    /// Mirrored `handle_*` message for a relayed intent.
    pub fn relayed(player_slot: Slot, intent: Intent) -> Self {
        let slot = PlayerSlotMsg { player_slot };
        match intent {
            Intent::MoveLeft => ServerMsg::HandleMoveLeft(slot),
            Intent::MoveRight => ServerMsg::HandleMoveRight(slot),
            Intent::GoIdle => ServerMsg::HandleGoIdle(slot),
            Intent::Jump => ServerMsg::HandleJump(slot),
            Intent::BoostDown => ServerMsg::HandleBoostDown(slot),
            Intent::Kick(direction) => ServerMsg::HandleKick(KickMsg {
                player_slot,
                direction,
            }),
        }
    }

    pub fn as_relayed_intent(&self) -> Option<(Slot, Intent)> {
        match self {
            ServerMsg::HandleMoveLeft(m) => Some((m.player_slot, Intent::MoveLeft)),
            ServerMsg::HandleMoveRight(m) => Some((m.player_slot, Intent::MoveRight)),
            ServerMsg::HandleGoIdle(m) => Some((m.player_slot, Intent::GoIdle)),
            ServerMsg::HandleJump(m) => Some((m.player_slot, Intent::Jump)),
            ServerMsg::HandleBoostDown(m) => Some((m.player_slot, Intent::BoostDown)),
            ServerMsg::HandleKick(m) => Some((m.player_slot, Intent::Kick(m.direction))),
            _ => None,
        }
    }
}

impl MatchFormedMsg {
    /// Slot assigned to `id`, if it is part of this match.
    pub fn slot_of(&self, id: ConnectionId) -> Option<Slot> {
        self.players
            .iter()
            .find(|p| p.connection_id == id)
            .map(|p| p.slot)
    }

    pub fn entry(&self, slot: Slot) -> Option<&MatchEntryWire> {
        self.players.iter().find(|p| p.slot == slot)
    }
}
