use volley_shared::protocol::{ConnectionId, GotchiProfile, MatchEntryWire, MatchFormedMsg};
use volley_shared::slot::Slot;

/// Number of players in a match.
pub const MATCH_SIZE: usize = 2;

/// A connection that has submitted its profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEntry {
    pub id: ConnectionId,
    pub profile: GotchiProfile,
    pub slot: Slot,
}

impl MatchEntry {
    pub fn to_wire(&self) -> MatchEntryWire {
        MatchEntryWire {
            slot: self.slot,
            connection_id: self.id,
            profile: self.profile.clone(),
        }
    }
}

/// A completed pairing. `entries[0]` is slot 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub entries: [MatchEntry; MATCH_SIZE],
}

impl Match {
    pub fn to_msg(&self) -> MatchFormedMsg {
        MatchFormedMsg {
            players: self.entries.iter().map(MatchEntry::to_wire).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// Registered, still waiting for an opponent.
    Waiting(Slot),
    /// This submission completed the pair.
    Formed(Match),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JoinError {
    #[error("match is already full")]
    PoolFull,

    #[error("connection {0} already joined as slot {1}")]
    AlreadyJoined(ConnectionId, Slot),
}

/// Holds at most two submitted profiles and pairs them.
///
/// Owned by the relay task; every mutation comes from one command at a time.
#[derive(Debug, Default)]
pub struct MatchmakingPool {
    entries: Vec<MatchEntry>,
}

impl MatchmakingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `profile` for connection `id`.
    ///
    /// Entries are kept in arrival order and slots follow that order, so the
    /// earliest submitter still in the pool is slot 1. A submission that fills
    /// the pool returns the formed match; anything past capacity is rejected.
    pub fn submit(
        &mut self,
        id: ConnectionId,
        profile: GotchiProfile,
    ) -> Result<JoinOutcome, JoinError> {
        if let Some(existing) = self.entry(id) {
            return Err(JoinError::AlreadyJoined(id, existing.slot));
        }
        let slot = Slot::ALL
            .get(self.entries.len())
            .copied()
            .ok_or(JoinError::PoolFull)?;
        self.entries.push(MatchEntry { id, profile, slot });

        match &self.entries[..] {
            [first, second] => Ok(JoinOutcome::Formed(Match {
                entries: [first.clone(), second.clone()],
            })),
            _ => Ok(JoinOutcome::Waiting(slot)),
        }
    }

    /// Remove a connection's entry. Later arrivals move up one slot.
    pub fn leave(&mut self, id: ConnectionId) -> Option<MatchEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let removed = self.entries.remove(pos);
        for (entry, slot) in self.entries.iter_mut().zip(Slot::ALL) {
            entry.slot = slot;
        }
        Some(removed)
    }

    pub fn entry(&self, id: ConnectionId) -> Option<&MatchEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_formed(&self) -> bool {
        self.entries.len() == MATCH_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> GotchiProfile {
        GotchiProfile {
            name: name.to_string(),
            token_id: format!("{name}-token"),
            haunt_id: "1".to_string(),
            collateral_address: "0x0".to_string(),
            numeric_traits: [0; 6],
            equipped_wearables: [0; 16],
        }
    }

    #[test]
    fn first_submitter_waits_in_slot_one() {
        let mut pool = MatchmakingPool::new();
        let outcome = pool.submit(ConnectionId(1), profile("P")).unwrap();
        assert_eq!(outcome, JoinOutcome::Waiting(Slot::One));
        assert!(!pool.is_formed());
    }

    #[test]
    fn second_submitter_forms_match_in_arrival_order() {
        let mut pool = MatchmakingPool::new();
        pool.submit(ConnectionId(8), profile("P")).unwrap();
        let outcome = pool.submit(ConnectionId(3), profile("Q")).unwrap();

        let JoinOutcome::Formed(m) = outcome else {
            panic!("Expected Formed");
        };
        assert_eq!(m.entries[0].profile.name, "P");
        assert_eq!(m.entries[0].slot, Slot::One);
        assert_eq!(m.entries[1].profile.name, "Q");
        assert_eq!(m.entries[1].slot, Slot::Two);

        let msg = m.to_msg();
        assert_eq!(msg.slot_of(ConnectionId(8)), Some(Slot::One));
        assert_eq!(msg.slot_of(ConnectionId(3)), Some(Slot::Two));
    }

    #[test]
    fn third_submitter_is_rejected() {
        let mut pool = MatchmakingPool::new();
        pool.submit(ConnectionId(1), profile("P")).unwrap();
        pool.submit(ConnectionId(2), profile("Q")).unwrap();

        let err = pool.submit(ConnectionId(3), profile("R")).unwrap_err();
        assert_eq!(err, JoinError::PoolFull);
        assert_eq!(pool.len(), 2);
        assert!(pool.entry(ConnectionId(3)).is_none());
    }

    #[test]
    fn resubmission_is_rejected_without_changing_slot() {
        let mut pool = MatchmakingPool::new();
        pool.submit(ConnectionId(1), profile("P")).unwrap();
        let err = pool.submit(ConnectionId(1), profile("P2")).unwrap_err();
        assert_eq!(err, JoinError::AlreadyJoined(ConnectionId(1), Slot::One));
        assert_eq!(pool.entry(ConnectionId(1)).unwrap().profile.name, "P");
    }

    #[test]
    fn earlier_arrival_keeps_priority_after_a_leave() {
        let mut pool = MatchmakingPool::new();
        pool.submit(ConnectionId(1), profile("A")).unwrap();
        pool.submit(ConnectionId(2), profile("B")).unwrap();

        let left = pool.leave(ConnectionId(1)).unwrap();
        assert_eq!(left.slot, Slot::One);
        assert!(!pool.is_formed());
        assert_eq!(pool.entry(ConnectionId(2)).unwrap().slot, Slot::One);

        let outcome = pool.submit(ConnectionId(3), profile("C")).unwrap();
        let JoinOutcome::Formed(m) = outcome else {
            panic!("Expected Formed");
        };
        assert_eq!(m.entries[0].id, ConnectionId(2));
        assert_eq!(m.entries[0].slot, Slot::One);
        assert_eq!(m.entries[1].id, ConnectionId(3));
        assert_eq!(m.entries[1].slot, Slot::Two);
    }

    #[test]
    fn second_arrival_leaving_reopens_slot_two() {
        let mut pool = MatchmakingPool::new();
        pool.submit(ConnectionId(1), profile("A")).unwrap();
        pool.submit(ConnectionId(2), profile("B")).unwrap();
        pool.leave(ConnectionId(2));

        let outcome = pool.submit(ConnectionId(3), profile("C")).unwrap();
        let JoinOutcome::Formed(m) = outcome else {
            panic!("Expected Formed");
        };
        assert_eq!(m.to_msg().slot_of(ConnectionId(1)), Some(Slot::One));
        assert_eq!(m.to_msg().slot_of(ConnectionId(3)), Some(Slot::Two));
    }

    #[test]
    fn leave_unknown_connection_is_noop() {
        let mut pool = MatchmakingPool::new();
        assert!(pool.leave(ConnectionId(42)).is_none());
        assert!(pool.is_empty());
    }
}
