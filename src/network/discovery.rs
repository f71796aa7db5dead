use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::{Address, Config};

/// Tracks which neighbors a node can relay to.
///
/// Static peers come from configuration and never expire. Peers learned from
/// `C` announcements are forgotten after `peer_timeout` of silence.
#[derive(Debug, Clone)]
pub struct PeerTable {
    local: Address,
    static_peers: Vec<Address>,
    learned: HashMap<Address, Instant>,
    peer_timeout: Duration,
    max_peers: usize,
}

impl PeerTable {
    /// Creates a peer table seeded with the configured peers
    pub fn new(config: &Config) -> Self {
        let mut static_peers: Vec<Address> = Vec::new();
        for &peer in &config.peers {
            if peer != config.address && !static_peers.contains(&peer) {
                static_peers.push(peer);
            }
        }

        PeerTable {
            local: config.address,
            static_peers,
            learned: HashMap::new(),
            peer_timeout: config.peer_timeout,
            max_peers: config.max_peers,
        }
    }

    /// Records that `peer` was heard from at `now`.
    ///
    /// Returns true when the peer was not known before.
    pub fn touch(&mut self, peer: Address, now: Instant) -> bool {
        if peer == self.local || self.static_peers.contains(&peer) {
            return false;
        }
        if let Some(last_seen) = self.learned.get_mut(&peer) {
            *last_seen = now;
            return false;
        }
        if self.len() >= self.max_peers {
            return false;
        }

        self.learned.insert(peer, now);
        true
    }

    /// Forgets learned peers that have been silent too long
    pub fn maintain(&mut self, now: Instant) -> usize {
        let before = self.learned.len();
        let timeout = self.peer_timeout;
        self.learned
            .retain(|_, last_seen| now.saturating_duration_since(*last_seen) < timeout);
        before - self.learned.len()
    }

    /// Every current neighbor, static peers first
    pub fn addresses(&self) -> Vec<Address> {
        let mut learned: Vec<Address> = self.learned.keys().copied().collect();
        learned.sort();
        self.static_peers.iter().copied().chain(learned).collect()
    }

    pub fn len(&self) -> usize {
        self.static_peers.len() + self.learned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
