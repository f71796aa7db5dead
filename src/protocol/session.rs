use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::core::{Address, Error, EvictionPolicy, Result, SessionId};

/// One in-flight broadcast-and-aggregate operation.
///
/// A session only exists while it is active; finalization removes it from
/// the table.
#[derive(Debug, Clone)]
pub struct BroadcastSession {
    id: SessionId,
    originator: Address,
    pending_acks: u32,
    aggregate: Vec<String>,
    created_at: Instant,
}

impl BroadcastSession {
    /// Creates a session with no pending acknowledgments
    pub fn new(id: SessionId, originator: Address) -> Self {
        BroadcastSession {
            id,
            originator,
            pending_acks: 0,
            aggregate: Vec::new(),
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Where the final aggregate is delivered
    pub fn originator(&self) -> Address {
        self.originator
    }

    /// Number of neighbors still owing a response or suppression
    pub fn pending_acks(&self) -> u32 {
        self.pending_acks
    }

    /// Response fragments collected so far, in arrival order
    pub fn fragments(&self) -> &[String] {
        &self.aggregate
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Records one more neighbor that owes an acknowledgment
    pub fn expect_ack(&mut self) {
        self.pending_acks += 1;
    }

    /// Appends a fragment to the aggregate
    pub fn push_fragment(&mut self, fragment: impl Into<String>) {
        self.aggregate.push(fragment.into());
    }

    /// Accounts for one acknowledgment, returning true once none remain
    pub fn acknowledge(&mut self) -> bool {
        self.pending_acks = self.pending_acks.saturating_sub(1);
        self.pending_acks == 0
    }

    /// Concatenation of every fragment
    pub fn aggregate(&self) -> String {
        self.aggregate.concat()
    }

    /// Whether the session has been in flight for at least `ttl`
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

impl fmt::Display for BroadcastSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} pending={} originator={} fragments={}",
            self.id,
            self.pending_acks,
            self.originator,
            self.aggregate.len()
        )
    }
}

/// Bounded collection of in-flight sessions, ordered by creation
#[derive(Debug)]
pub struct SessionTable {
    sessions: VecDeque<BroadcastSession>,
    capacity: usize,
    policy: EvictionPolicy,
}

impl SessionTable {
    /// Creates an empty table holding at most `capacity` sessions
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        SessionTable {
            sessions: VecDeque::with_capacity(capacity),
            capacity,
            policy,
        }
    }

    pub fn find(&self, id: SessionId) -> Option<&BroadcastSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn find_mut(&mut self, id: SessionId) -> Option<&mut BroadcastSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.find(id).is_some()
    }

    /// Admits a new session.
    ///
    /// When the table is full, `OverwriteOldest` evicts the oldest session and
    /// returns it; `RejectNew` fails with `Error::TableFull`.
    pub fn create(&mut self, id: SessionId, originator: Address) -> Result<Option<BroadcastSession>> {
        if self.contains(id) {
            return Err(Error::SessionActive(id));
        }

        let mut evicted = None;
        if self.is_full() {
            match self.policy {
                EvictionPolicy::RejectNew => {
                    return Err(Error::TableFull { capacity: self.capacity });
                }
                EvictionPolicy::OverwriteOldest => evicted = self.sessions.pop_front(),
            }
        }

        self.sessions.push_back(BroadcastSession::new(id, originator));
        Ok(evicted)
    }

    pub fn remove(&mut self, id: SessionId) -> Option<BroadcastSession> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        self.sessions.remove(index)
    }

    /// Drops every session, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        count
    }

    /// Ids of sessions that have been in flight for at least `ttl`
    pub fn expired(&self, now: Instant, ttl: Duration) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|s| s.is_expired(now, ttl))
            .map(|s| s.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BroadcastSession> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Address = Address::new(192, 168, 4, 1);

    #[test]
    fn test_create_find_remove() {
        let mut table = SessionTable::new(5, EvictionPolicy::OverwriteOldest);
        assert!(table.create(SessionId(42), ORIGIN).unwrap().is_none());

        let session = table.find(SessionId(42)).unwrap();
        assert_eq!(session.originator(), ORIGIN);
        assert_eq!(session.pending_acks(), 0);
        assert!(table.find(SessionId(43)).is_none());

        let removed = table.remove(SessionId(42)).unwrap();
        assert_eq!(removed.id(), SessionId(42));
        assert!(table.is_empty());
        assert!(table.remove(SessionId(42)).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut table = SessionTable::new(5, EvictionPolicy::OverwriteOldest);
        table.create(SessionId(1), ORIGIN).unwrap();
        assert!(matches!(
            table.create(SessionId(1), ORIGIN),
            Err(Error::SessionActive(SessionId(1)))
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_overwrite_evicts_oldest() {
        let mut table = SessionTable::new(3, EvictionPolicy::OverwriteOldest);
        for id in 1..=3 {
            table.create(SessionId(id), ORIGIN).unwrap();
        }
        // Freeing a middle slot leaves room without eviction
        table.remove(SessionId(2));
        assert!(table.create(SessionId(4), ORIGIN).unwrap().is_none());

        let evicted = table.create(SessionId(5), ORIGIN).unwrap().unwrap();
        assert_eq!(evicted.id(), SessionId(1));
        let evicted = table.create(SessionId(6), ORIGIN).unwrap().unwrap();
        assert_eq!(evicted.id(), SessionId(3));

        let ids: Vec<_> = table.iter().map(|s| s.id().value()).collect();
        assert_eq!(ids, vec![4, 5, 6]);
        assert_eq!(table.len(), table.capacity());
    }

    #[test]
    fn test_reject_new_when_full() {
        let mut table = SessionTable::new(2, EvictionPolicy::RejectNew);
        table.create(SessionId(1), ORIGIN).unwrap();
        table.create(SessionId(2), ORIGIN).unwrap();

        assert!(matches!(
            table.create(SessionId(3), ORIGIN),
            Err(Error::TableFull { capacity: 2 })
        ));
        assert!(table.contains(SessionId(1)));
        assert!(table.contains(SessionId(2)));
        assert!(!table.contains(SessionId(3)));
    }

    #[test]
    fn test_acknowledge_counts_down() {
        let mut session = BroadcastSession::new(SessionId(7), ORIGIN);
        session.expect_ack();
        session.expect_ack();
        session.push_fragment("A ok;");

        assert!(!session.acknowledge());
        session.push_fragment("B ok;");
        assert!(session.acknowledge());
        assert_eq!(session.pending_acks(), 0);
        // Never underflows
        assert!(session.acknowledge());
        assert_eq!(session.aggregate(), "A ok;B ok;");
    }

    #[test]
    fn test_expired() {
        let mut table = SessionTable::new(5, EvictionPolicy::OverwriteOldest);
        table.create(SessionId(1), ORIGIN).unwrap();
        let now = Instant::now();

        assert!(table.expired(now, Duration::from_secs(60)).is_empty());
        let later = now + Duration::from_secs(61);
        assert_eq!(table.expired(later, Duration::from_secs(60)), vec![SessionId(1)]);
    }

    #[test]
    fn test_status_line_and_clear() {
        let mut table = SessionTable::new(5, EvictionPolicy::OverwriteOldest);
        table.create(SessionId(9), ORIGIN).unwrap();
        table.find_mut(SessionId(9)).unwrap().expect_ack();

        let status = table.find(SessionId(9)).unwrap().to_string();
        assert_eq!(status, "id=9 pending=1 originator=192.168.4.1 fragments=0");

        assert_eq!(table.clear(), 1);
        assert!(table.is_empty());
    }
}
