use volley_shared::config::GameConfig;
use volley_shared::protocol::{ClientMsg, ConnectionId, GotchiProfile, Intent, MatchFormedMsg, ServerMsg};
use volley_shared::slot::Slot;

/// Everything a client needs to build its match scene.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchInfo {
    pub slot: Slot,
    pub own: GotchiProfile,
    pub opponent: GotchiProfile,
    pub opponent_id: ConnectionId,
    /// Same on both clients, so both spawn identical balls.
    pub seed: u64,
    pub config: GameConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Connecting,
    Lobby { connection_id: ConnectionId },
    Matched(MatchInfo),
    Ended,
}

/// What the caller should do after feeding a server message.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Send(ClientMsg),
    StartMatch(MatchInfo),
    Relay(Slot, Intent),
    RequestDisconnect,
    Rejected(String),
    Ignore,
}

/// Connection and matchmaking lifecycle of one client.
#[derive(Debug)]
pub struct Session {
    profile: GotchiProfile,
    state: SessionState,
    config: GameConfig,
}

impl Session {
    pub fn new(profile: GotchiProfile) -> Self {
        Self {
            profile,
            state: SessionState::Connecting,
            config: GameConfig::default(),
        }
    }

    pub fn handle(&mut self, msg: &ServerMsg) -> SessionAction {
        if let Some((slot, intent)) = msg.as_relayed_intent() {
            return match self.state {
                SessionState::Matched(_) => SessionAction::Relay(slot, intent),
                _ => SessionAction::Ignore,
            };
        }

        match msg {
            ServerMsg::Welcome(w) => {
                if self.state != SessionState::Connecting {
                    return SessionAction::Ignore;
                }
                tracing::info!("Connected as {} (server {})", w.connection_id, w.server_version);
                self.config = w.config;
                self.state = SessionState::Lobby {
                    connection_id: w.connection_id,
                };
                SessionAction::Send(ClientMsg::SubmitProfile {
                    profile: self.profile.clone(),
                })
            }
            ServerMsg::MatchFormed(m) => {
                let SessionState::Lobby { connection_id } = self.state else {
                    return SessionAction::Ignore;
                };
                let Some(info) = self.match_info(connection_id, m) else {
                    tracing::warn!("Match formed without {}", connection_id);
                    return SessionAction::Ignore;
                };
                tracing::info!(
                    "Matched as slot {} against {}",
                    info.slot,
                    info.opponent.name
                );
                self.state = SessionState::Matched(info.clone());
                SessionAction::StartMatch(info)
            }
            ServerMsg::JoinRejected(r) => {
                tracing::warn!("Join rejected: {}", r.reason);
                self.state = SessionState::Ended;
                SessionAction::Rejected(r.reason.clone())
            }
            ServerMsg::PeerDisconnected(p) => {
                let opponent_left = matches!(
                    &self.state,
                    SessionState::Matched(info) if info.opponent_id == p.connection_id
                );
                if !opponent_left {
                    return SessionAction::Ignore;
                }
                tracing::info!("Opponent {} left, leaving match", p.connection_id);
                self.state = SessionState::Ended;
                SessionAction::RequestDisconnect
            }
            _ => SessionAction::Ignore,
        }
    }

    fn match_info(&self, own_id: ConnectionId, m: &MatchFormedMsg) -> Option<MatchInfo> {
        let slot = m.slot_of(own_id)?;
        let own = m.entry(slot)?;
        let opponent = m.entry(slot.opponent())?;
        Some(MatchInfo {
            slot,
            own: own.profile.clone(),
            opponent: opponent.profile.clone(),
            opponent_id: opponent.connection_id,
            seed: match_seed(m)?,
            config: self.config,
        })
    }

    /// The transport went away. Nothing is recovered.
    pub fn on_closed(&mut self) {
        self.state = SessionState::Ended;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_ended(&self) -> bool {
        self.state == SessionState::Ended
    }
}

/// Seed derived from both identities, so both clients agree on it.
pub fn match_seed(m: &MatchFormedMsg) -> Option<u64> {
    let one = m.entry(Slot::One)?.connection_id.0 as u64;
    let two = m.entry(Slot::Two)?.connection_id.0 as u64;
    Some((one << 32) | two)
}
