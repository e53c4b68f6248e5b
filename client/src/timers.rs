use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies a scheduled entry so it can be cancelled or recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deferred actions advanced by the scene clock.
///
/// Nothing fires on its own: the owner calls [`TimerQueue::drain_due`] from its
/// update, so handlers always run on the same thread as the rest of the tick.
#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: BTreeMap<(Duration, TimerId), T>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((due, id), payload);
        id
    }

    /// Remove a pending entry. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.entries.keys().find(|(_, k)| *k == id).copied()?;
        self.entries.remove(&key)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.keys().any(|(_, k)| *k == id)
    }

    /// Pop every entry due at or before `now`, earliest first. Entries due at
    /// the same instant come out in scheduling order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<(TimerId, T)> {
        let mut fired = Vec::new();
        while let Some(entry) = self.entries.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let ((_, id), payload) = entry.remove_entry();
            fired.push((id, payload));
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
