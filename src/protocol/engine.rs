use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::core::{Address, Config, Error, Result, SessionId};
use crate::network::{Inbound, Transport};
use crate::util::{self, FRAGMENT_TERMINATOR};
use super::executor::LocalExecutor;
use super::message::Frame;
use super::session::{BroadcastSession, SessionTable};

/// Something the application layer should hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A broadcast this node originated has been fully answered (or expired)
    Completed {
        id: SessionId,
        response: String,
    },
    /// A point-to-point message addressed to this node
    Direct {
        id: SessionId,
        origin: Address,
        payload: String,
    },
    /// A datagram heard on the local broadcast channel
    Datagram {
        id: SessionId,
        payload: String,
    },
    /// A neighbor announced itself
    Connected {
        from: Address,
    },
}

/// Flooding broadcast engine for one node.
///
/// Every method runs to completion before the next frame is looked at, so
/// the session table is never mutated by two frames at once.
pub struct BroadcastEngine<T, X> {
    node_id: String,
    address: Address,
    transport: T,
    executor: X,
    sessions: SessionTable,
    session_timeout: Option<Duration>,
    recent_datagrams: IdHistory,
    recent_broadcasts: IdHistory,
    events: VecDeque<Event>,
    rng: StdRng,
}

impl<T: Transport, X: LocalExecutor> BroadcastEngine<T, X> {
    /// Creates an engine for the node described by `config`
    pub fn new(config: &Config, transport: T, executor: X) -> Self {
        BroadcastEngine {
            node_id: config.node_id.clone(),
            address: config.address,
            transport,
            executor,
            sessions: SessionTable::new(config.session_capacity, config.eviction),
            session_timeout: config.session_timeout,
            recent_datagrams: IdHistory::new(config.datagram_history),
            recent_broadcasts: IdHistory::new(config.broadcast_history),
            events: VecDeque::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// In-flight sessions, oldest first
    pub fn sessions(&self) -> impl Iterator<Item = &BroadcastSession> {
        self.sessions.iter()
    }

    pub fn session(&self, id: SessionId) -> Option<&BroadcastSession> {
        self.sessions.find(id)
    }

    /// Drops every in-flight session without answering upstream
    pub fn clear_sessions(&mut self) -> usize {
        let cleared = self.sessions.clear();
        info!(cleared, "Cleared active broadcasts");
        cleared
    }

    /// Takes the events produced since the last call
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }

    /// Starts a new broadcast of `payload` from this node
    pub fn originate(&mut self, payload: &str) -> Result<SessionId> {
        let id = self.allocate_id();
        self.originate_with_id(id, payload)?;
        Ok(id)
    }

    /// Starts a new broadcast under a caller-chosen id
    pub fn originate_with_id(&mut self, id: SessionId, payload: &str) -> Result<()> {
        let payload = util::strip_line_terminators(payload);
        debug!(%id, payload = %payload, "Originating broadcast");
        self.start_session(id, self.address, &[], &payload)
    }

    /// Polls the transport once and dispatches at most one frame.
    ///
    /// Returns whether a frame was taken off the transport. Errors are
    /// logged, never propagated: no single frame can stop the node.
    pub fn tick(&mut self) -> bool {
        match self.transport.try_receive() {
            Ok(Some(inbound)) => {
                if let Err(e) = self.handle_frame(inbound) {
                    match e {
                        Error::UnknownSession(id) => debug!(%id, "Dropping frame for unknown session"),
                        e => warn!(error = %e, "Failed to handle frame"),
                    }
                }
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Dropping inbound frame");
                true
            }
        }
    }

    /// Dispatches one decoded frame
    pub fn handle_frame(&mut self, inbound: Inbound) -> Result<()> {
        let Inbound { frame, from } = inbound;
        match frame {
            Frame::Broadcast { id, origin, payload } => self.handle_broadcast(id, origin, from, &payload),
            Frame::Response { id, payload } => self.handle_response(id, payload),
            Frame::Suppress { id } => self.handle_suppress(id),
            Frame::Direct { id, origin, payload } => {
                debug!(%id, %origin, "Direct message received");
                self.events.push_back(Event::Direct { id, origin, payload });
                Ok(())
            }
            Frame::Connected => {
                debug!(%from, "Neighbor connected");
                self.events.push_back(Event::Connected { from });
                Ok(())
            }
            Frame::Datagram { id, payload } => self.handle_datagram(id, payload),
        }
    }

    fn handle_broadcast(&mut self, id: SessionId, origin: Address, from: Address, payload: &str) -> Result<()> {
        if self.sessions.contains(id) || self.recent_broadcasts.contains(id) {
            debug!(%id, %origin, "Duplicate broadcast, suppressing");
            self.suppress(id, origin);
            return Ok(());
        }

        match self.start_session(id, origin, &[origin, from], payload) {
            Err(Error::TableFull { capacity }) => {
                warn!(%id, capacity, "Too many active broadcasts, refusing");
                // Release the upstream slot that is waiting on us
                self.suppress(id, origin);
                Err(Error::TableFull { capacity })
            }
            result => result,
        }
    }

    fn handle_response(&mut self, id: SessionId, fragment: String) -> Result<()> {
        let session = self.sessions.find_mut(id).ok_or(Error::UnknownSession(id))?;
        session.push_fragment(fragment);
        if session.acknowledge() {
            debug!(%id, "No more responses expected");
            self.finalize(id);
        }
        Ok(())
    }

    fn handle_suppress(&mut self, id: SessionId) -> Result<()> {
        let session = self.sessions.find_mut(id).ok_or(Error::UnknownSession(id))?;
        if session.acknowledge() {
            debug!(%id, "Last branch suppressed");
            self.finalize(id);
        }
        Ok(())
    }

    fn handle_datagram(&mut self, id: SessionId, payload: String) -> Result<()> {
        if self.recent_datagrams.contains(id) {
            debug!(%id, "Datagram echo ignored");
            return Ok(());
        }
        self.recent_datagrams.remember(id);

        let relay = Frame::Datagram { id, payload: payload.clone() };
        if let Err(e) = self.transport.send_broadcast_channel(&relay) {
            debug!(%id, error = %e, "Datagram relay failed");
        }
        self.events.push_back(Event::Datagram { id, payload });
        Ok(())
    }

    /// Creates a session, records the local contribution and fans out.
    ///
    /// Neighbors listed in `exclude` never receive the relay.
    fn start_session(
        &mut self,
        id: SessionId,
        originator: Address,
        exclude: &[Address],
        payload: &str,
    ) -> Result<()> {
        if let Some(evicted) = self.sessions.create(id, originator)? {
            self.recent_broadcasts.remember(evicted.id());
            warn!(
                evicted = %evicted.id(),
                pending = evicted.pending_acks(),
                "Session table full, overwrote oldest broadcast"
            );
        }

        let contribution = self.local_contribution(payload);

        let relay = Frame::Broadcast {
            id,
            origin: self.address,
            payload: payload.to_string(),
        };
        let mut fanned_out = 0;
        for neighbor in self.transport.neighbors() {
            if neighbor == self.address || exclude.contains(&neighbor) {
                continue;
            }
            match self.transport.send(&relay, neighbor) {
                Ok(()) => fanned_out += 1,
                Err(e) => debug!(%id, %neighbor, error = %e, "Fan-out send failed, no ack owed"),
            }
        }

        let session = self.sessions.find_mut(id).ok_or(Error::UnknownSession(id))?;
        session.push_fragment(contribution);
        for _ in 0..fanned_out {
            session.expect_ack();
        }
        debug!(%id, %originator, fanned_out, "Session created");

        if fanned_out == 0 {
            self.finalize(id);
        }
        Ok(())
    }

    /// Sends the aggregate upstream (or hands it to the application) and frees the slot
    fn finalize(&mut self, id: SessionId) {
        let Some(session) = self.sessions.remove(id) else {
            return;
        };
        // Later copies of this broadcast must be suppressed, not re-run
        self.recent_broadcasts.remember(id);
        let response = session.aggregate();

        if session.originator() == self.address {
            info!(%id, fragments = session.fragments().len(), "Broadcast complete");
            self.events.push_back(Event::Completed { id, response });
            return;
        }

        let upstream = session.originator();
        match self.transport.send(&Frame::Response { id, payload: response }, upstream) {
            Ok(()) => debug!(%id, %upstream, "Response sent"),
            Err(e) => warn!(%id, %upstream, error = %e, "Couldn't reach source for broadcast response"),
        }
    }

    fn suppress(&mut self, id: SessionId, to: Address) {
        if let Err(e) = self.transport.send(&Frame::Suppress { id }, to) {
            debug!(%id, %to, error = %e, "Suppress not sent");
        }
    }

    fn local_contribution(&mut self, payload: &str) -> String {
        let result = match self.executor.run(payload) {
            Ok(result) => result,
            Err(e) => format!("error: {}", e),
        };
        format!(
            "{} {}{}",
            self.node_id,
            util::sanitize_contribution(&result),
            FRAGMENT_TERMINATOR
        )
    }

    /// Finalizes sessions older than the configured timeout with whatever
    /// they have collected. Returns how many were expired.
    pub fn expire_stale(&mut self, now: Instant) -> usize {
        let Some(ttl) = self.session_timeout else {
            return 0;
        };

        let expired = self.sessions.expired(now, ttl);
        for &id in &expired {
            if let Some(session) = self.sessions.find(id) {
                warn!(%id, pending = session.pending_acks(), "Broadcast timed out, sending partial aggregate");
            }
            self.finalize(id);
        }
        expired.len()
    }

    /// Sends a point-to-point message to `to`
    pub fn send_direct(&mut self, to: Address, payload: &str) -> Result<SessionId> {
        let id = self.allocate_id();
        let frame = Frame::Direct {
            id,
            origin: self.address,
            payload: util::strip_line_terminators(payload),
        };
        self.transport.send(&frame, to)?;
        Ok(id)
    }

    /// Sends a datagram on the local broadcast channel
    pub fn send_datagram(&mut self, payload: &str) -> Result<SessionId> {
        let id = self.allocate_id();
        self.recent_datagrams.remember(id);
        let frame = Frame::Datagram {
            id,
            payload: util::strip_line_terminators(payload),
        };
        self.transport.send_broadcast_channel(&frame)?;
        Ok(id)
    }

    /// Announces this node to every neighbor and on the broadcast channel
    pub fn announce(&mut self) {
        for neighbor in self.transport.neighbors() {
            if let Err(e) = self.transport.send(&Frame::Connected, neighbor) {
                debug!(%neighbor, error = %e, "Announcement not delivered");
            }
        }
        if let Err(e) = self.transport.send_broadcast_channel(&Frame::Connected) {
            debug!(error = %e, "Broadcast channel announcement not sent");
        }
    }

    /// Picks a random id not used by any active or recently seen session
    fn allocate_id(&mut self) -> SessionId {
        loop {
            let id = SessionId(self.rng.gen_range(1..=u32::MAX));
            if !self.sessions.contains(id)
                && !self.recent_broadcasts.contains(id)
                && !self.recent_datagrams.contains(id)
            {
                return id;
            }
        }
    }
}

/// Fixed-size memory of recently seen ids, oldest forgotten first
#[derive(Debug)]
struct IdHistory {
    ids: VecDeque<SessionId>,
    limit: usize,
}

impl IdHistory {
    fn new(limit: usize) -> Self {
        IdHistory {
            ids: VecDeque::with_capacity(limit),
            limit,
        }
    }

    fn contains(&self, id: SessionId) -> bool {
        self.ids.contains(&id)
    }

    fn remember(&mut self, id: SessionId) {
        if self.limit == 0 || self.contains(id) {
            return;
        }
        if self.ids.len() == self.limit {
            self.ids.pop_front();
        }
        self.ids.push_back(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EvictionPolicy;
    use crate::network::{MemoryNetwork, MemoryTransport};
    use crate::protocol::codec;
    use crate::protocol::message::contributions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const O: Address = Address::new(10, 0, 0, 1);
    const A: Address = Address::new(10, 0, 0, 2);
    const B: Address = Address::new(10, 0, 0, 3);

    type Executor = fn(&str) -> Result<String>;
    type Engine = BroadcastEngine<MemoryTransport, Executor>;

    fn ok_executor(payload: &str) -> Result<String> {
        Ok(format!("ok {}", payload))
    }

    fn engine(net: &MemoryNetwork, name: &str, address: Address) -> Engine {
        let mut config = Config::for_node(name, address);
        config.session_timeout = Some(Duration::from_secs(30));
        BroadcastEngine::new(&config, net.attach(address), ok_executor as Executor)
    }

    fn inbound(line: &str, from: Address) -> Inbound {
        Inbound {
            frame: codec::decode(line).unwrap(),
            from,
        }
    }

    #[test]
    fn test_leaf_finalizes_immediately() {
        let net = MemoryNetwork::new();
        let mut o = engine(&net, "O", O);

        let id = o.originate("STATUS").unwrap();
        assert_eq!(o.sessions().count(), 0);

        let events: Vec<_> = o.drain_events().collect();
        assert_eq!(
            events,
            vec![Event::Completed {
                id,
                response: "O ok STATUS;".to_string(),
            }]
        );
    }

    #[test]
    fn test_relay_leaf_responds_upstream() {
        let net = MemoryNetwork::new();
        let _o = net.attach(O);
        let mut a = engine(&net, "A", A);
        net.link(O, A);

        a.handle_frame(inbound("B 42 10.0.0.1 STATUS", O)).unwrap();

        // The only neighbor is the sender, so nothing to wait for
        assert!(a.session(SessionId(42)).is_none());
        assert_eq!(net.take_lines(O), vec![(A, "R 42 A ok STATUS;".to_string())]);
    }

    #[test]
    fn test_duplicate_broadcast_suppressed() {
        let net = MemoryNetwork::new();
        let _o = net.attach(O);
        let _b = net.attach(B);
        let mut a = engine(&net, "A", A);
        net.link(O, A);
        net.link(A, B);

        a.handle_frame(inbound("B 42 10.0.0.1 STATUS", O)).unwrap();
        assert_eq!(a.session(SessionId(42)).unwrap().pending_acks(), 1);
        assert_eq!(net.take_lines(B), vec![(A, "B 42 10.0.0.2 STATUS".to_string())]);

        // Same broadcast arriving again through B
        a.handle_frame(inbound("B 42 10.0.0.3 STATUS", B)).unwrap();
        assert_eq!(net.take_lines(B), vec![(A, "W 42".to_string())]);
        assert_eq!(a.session(SessionId(42)).unwrap().fragments().len(), 1);
        assert_eq!(a.sessions().count(), 1);
    }

    #[test]
    fn test_repeat_delivery_after_finalize_suppressed() {
        let net = MemoryNetwork::new();
        let _o = net.attach(O);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let executor = move |payload: &str| -> Result<String> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("ok {}", payload))
        };
        let mut a = BroadcastEngine::new(&Config::for_node("A", A), net.attach(A), executor);
        net.link(O, A);

        a.handle_frame(inbound("B 42 10.0.0.1 STATUS", O)).unwrap();
        assert!(a.session(SessionId(42)).is_none());
        a.handle_frame(inbound("B 42 10.0.0.1 STATUS", O)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.sessions().count(), 0);
        assert_eq!(
            net.take_lines(O),
            vec![
                (A, "R 42 A ok STATUS;".to_string()),
                (A, "W 42".to_string()),
            ]
        );
    }

    #[test]
    fn test_broadcast_history_is_bounded() {
        let net = MemoryNetwork::new();
        let _o = net.attach(O);
        let mut config = Config::for_node("A", A);
        config.broadcast_history = 2;
        let mut a = BroadcastEngine::new(&config, net.attach(A), ok_executor as Executor);
        net.link(O, A);

        for id in 1..=3 {
            a.handle_frame(inbound(&format!("B {} 10.0.0.1 PING", id), O)).unwrap();
        }
        net.take_lines(O);

        // Id 1 has been forgotten, ids 2 and 3 are still remembered
        a.handle_frame(inbound("B 3 10.0.0.1 PING", O)).unwrap();
        a.handle_frame(inbound("B 1 10.0.0.1 PING", O)).unwrap();
        assert_eq!(
            net.take_lines(O),
            vec![
                (A, "W 3".to_string()),
                (A, "R 1 A ok PING;".to_string()),
            ]
        );
    }

    #[test]
    fn test_responses_and_suppress_finalize() {
        let net = MemoryNetwork::new();
        let mut o = engine(&net, "O", O);
        let _a = net.attach(A);
        let _b = net.attach(B);
        net.link(O, A);
        net.link(O, B);

        o.originate_with_id(SessionId(7), "PING").unwrap();
        assert_eq!(o.session(SessionId(7)).unwrap().pending_acks(), 2);

        o.handle_frame(inbound("R 7 A ok PING;", A)).unwrap();
        assert_eq!(o.session(SessionId(7)).unwrap().pending_acks(), 1);
        assert!(o.drain_events().next().is_none());

        o.handle_frame(inbound("W 7", B)).unwrap();
        assert!(o.session(SessionId(7)).is_none());

        match o.drain_events().next() {
            Some(Event::Completed { id, response }) => {
                assert_eq!(id, SessionId(7));
                let nodes: Vec<_> = contributions(&response).iter().map(|c| c.node).collect();
                assert_eq!(nodes, vec!["O", "A"]);
            }
            other => panic!("Expected Completed event, got {:?}", other),
        };
    }

    #[test]
    fn test_unknown_session_dropped() {
        let net = MemoryNetwork::new();
        let mut o = engine(&net, "O", O);

        assert!(matches!(
            o.handle_frame(inbound("R 99 late;", A)),
            Err(Error::UnknownSession(SessionId(99)))
        ));
        assert!(matches!(
            o.handle_frame(inbound("W 99", A)),
            Err(Error::UnknownSession(SessionId(99)))
        ));
        assert!(o.drain_events().next().is_none());
    }

    #[test]
    fn test_failed_send_owes_no_ack() {
        let net = MemoryNetwork::new();
        let mut o = engine(&net, "O", O);
        let _a = net.attach(A);
        net.link(O, A);
        net.link(O, B); // B never attached: every send to it fails

        o.originate_with_id(SessionId(3), "PING").unwrap();
        assert_eq!(o.session(SessionId(3)).unwrap().pending_acks(), 1);

        o.handle_frame(inbound("R 3 A ok PING;", A)).unwrap();
        assert!(o.session(SessionId(3)).is_none());
        assert!(matches!(o.drain_events().next(), Some(Event::Completed { .. })));
    }

    #[test]
    fn test_executor_error_becomes_fragment() {
        let net = MemoryNetwork::new();
        let config = Config::for_node("O", O);
        let failing: Executor = |_| Err(Error::executor("sensor timeout"));
        let mut o = BroadcastEngine::new(&config, net.attach(O), failing);

        o.originate_with_id(SessionId(1), "SENSOR read").unwrap();
        assert_eq!(
            o.drain_events().next(),
            Some(Event::Completed {
                id: SessionId(1),
                response: "O error: Executor error: sensor timeout;".to_string(),
            })
        );
    }

    #[test]
    fn test_table_full_reject_suppresses_upstream() {
        let net = MemoryNetwork::new();
        let _o = net.attach(O);
        let _b = net.attach(B);
        let mut config = Config::for_node("A", A);
        config.session_capacity = 1;
        config.eviction = EvictionPolicy::RejectNew;
        let mut a = BroadcastEngine::new(&config, net.attach(A), ok_executor as Executor);
        net.link(O, A);
        net.link(A, B);

        a.handle_frame(inbound("B 1 10.0.0.1 PING", O)).unwrap();
        net.take_lines(B);

        let result = a.handle_frame(inbound("B 2 10.0.0.1 PING", O));
        assert!(matches!(result, Err(Error::TableFull { capacity: 1 })));
        assert_eq!(net.take_lines(O), vec![(A, "W 2".to_string())]);
        assert!(net.take_lines(B).is_empty());
        assert!(a.session(SessionId(1)).is_some());
    }

    #[test]
    fn test_overwrite_evicts_oldest_session() {
        let net = MemoryNetwork::new();
        let _a = net.attach(A);
        let mut config = Config::for_node("O", O);
        config.session_capacity = 2;
        let mut o = BroadcastEngine::new(&config, net.attach(O), ok_executor as Executor);
        net.link(O, A);

        for id in 1..=3 {
            o.originate_with_id(SessionId(id), "PING").unwrap();
        }
        let ids: Vec<_> = o.sessions().map(|s| s.id()).collect();
        assert_eq!(ids, vec![SessionId(2), SessionId(3)]);

        // The evicted session's response now has nowhere to go
        assert!(matches!(
            o.handle_frame(inbound("R 1 A ok;", A)),
            Err(Error::UnknownSession(SessionId(1)))
        ));
    }

    #[test]
    fn test_expire_stale_sends_partial() {
        let net = MemoryNetwork::new();
        let _o = net.attach(O);
        let _b = net.attach(B);
        let mut a = engine(&net, "A", A);
        net.link(O, A);
        net.link(A, B);

        a.handle_frame(inbound("B 5 10.0.0.1 PING", O)).unwrap();
        assert_eq!(a.expire_stale(Instant::now()), 0);

        let later = Instant::now() + Duration::from_secs(31);
        assert_eq!(a.expire_stale(later), 1);
        assert!(a.session(SessionId(5)).is_none());
        assert_eq!(net.take_lines(O), vec![(A, "R 5 A ok PING;".to_string())]);
    }

    #[test]
    fn test_datagram_echo_suppressed() {
        let net = MemoryNetwork::new();
        let mut a = engine(&net, "A", A);
        let _b = net.attach(B);

        a.handle_frame(inbound("U 200 hello", B)).unwrap();
        a.handle_frame(inbound("U 200 hello", B)).unwrap();

        let events: Vec<_> = a.drain_events().collect();
        assert_eq!(
            events,
            vec![Event::Datagram { id: SessionId(200), payload: "hello".to_string() }]
        );
        // Relayed exactly once to the other segment member
        assert_eq!(net.take_lines(B), vec![(A, "U 200 hello".to_string())]);
    }

    #[test]
    fn test_direct_and_connected_events() {
        let net = MemoryNetwork::new();
        let mut a = engine(&net, "A", A);
        let _o = net.attach(O);

        a.handle_frame(inbound("M 11 10.0.0.1 hi there", O)).unwrap();
        a.handle_frame(inbound("C", O)).unwrap();

        let events: Vec<_> = a.drain_events().collect();
        assert_eq!(
            events,
            vec![
                Event::Direct { id: SessionId(11), origin: O, payload: "hi there".to_string() },
                Event::Connected { from: O },
            ]
        );

        let id = a.send_direct(O, "reply\n").unwrap();
        assert_eq!(net.take_lines(O), vec![(A, format!("M {} 10.0.0.2 reply", id))]);
        assert!(matches!(a.send_direct(B, "x"), Err(Error::SendFailure { .. })));
    }

    #[test]
    fn test_tick_drops_malformed_and_continues() {
        let net = MemoryNetwork::new();
        let mut a = engine(&net, "A", A);

        net.inject(A, O, "Z nonsense");
        net.inject(A, O, "C");

        assert!(a.tick());
        assert!(a.drain_events().next().is_none());
        assert!(a.tick());
        assert_eq!(a.drain_events().next(), Some(Event::Connected { from: O }));
        assert!(!a.tick());
    }

    #[test]
    fn test_clear_sessions() {
        let net = MemoryNetwork::new();
        let _a = net.attach(A);
        let mut o = engine(&net, "O", O);
        net.link(O, A);

        o.originate("PING").unwrap();
        o.originate("PING").unwrap();
        assert_eq!(o.clear_sessions(), 2);
        assert_eq!(o.sessions().count(), 0);
    }
}
