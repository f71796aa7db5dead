use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{Address, Error, Result};
use crate::protocol::codec;
use crate::protocol::Frame;
use super::{Inbound, Transport};

#[derive(Default)]
struct Inner {
    /// Raw wire lines waiting at each attached node, with their sender
    inboxes: HashMap<Address, VecDeque<(Address, String)>>,
    /// Neighbor lists
    links: HashMap<Address, Vec<Address>>,
    /// Links whose sends fail while both ends still list each other
    cut: HashSet<(Address, Address)>,
}

/// In-process network for simulating several nodes in one process.
///
/// Every attached node shares one broadcast segment. Frames travel as encoded
/// lines so the wire codec is exercised end to end.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryNetwork {
    /// Creates an empty network
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaches a node and returns its transport
    pub fn attach(&self, address: Address) -> MemoryTransport {
        self.lock().inboxes.entry(address).or_default();
        MemoryTransport {
            address,
            network: self.clone(),
        }
    }

    /// Makes `a` and `b` neighbors of each other
    pub fn link(&self, a: Address, b: Address) {
        let mut inner = self.lock();
        for (from, to) in [(a, b), (b, a)] {
            let neighbors = inner.links.entry(from).or_default();
            if !neighbors.contains(&to) {
                neighbors.push(to);
            }
        }
    }

    /// Makes every send between `a` and `b` fail without removing the link
    pub fn cut(&self, a: Address, b: Address) {
        let mut inner = self.lock();
        inner.cut.insert((a, b));
        inner.cut.insert((b, a));
    }

    /// Queues a raw line at `to` as if `from` had sent it
    pub fn inject(&self, to: Address, from: Address, line: &str) {
        if let Some(inbox) = self.lock().inboxes.get_mut(&to) {
            inbox.push_back((from, line.to_string()));
        }
    }

    /// Removes and returns every line waiting at `address`
    pub fn take_lines(&self, address: Address) -> Vec<(Address, String)> {
        self.lock()
            .inboxes
            .get_mut(&address)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Number of lines waiting at `address`
    pub fn pending(&self, address: Address) -> usize {
        self.lock().inboxes.get(&address).map_or(0, VecDeque::len)
    }

    /// Whether no frame is in flight anywhere
    pub fn is_idle(&self) -> bool {
        self.lock().inboxes.values().all(VecDeque::is_empty)
    }

    fn deliver(&self, from: Address, to: Address, line: String) -> Result<()> {
        let mut inner = self.lock();
        if inner.cut.contains(&(from, to)) {
            return Err(Error::send_failure(to, "link is down"));
        }
        let inbox = inner
            .inboxes
            .get_mut(&to)
            .ok_or_else(|| Error::send_failure(to, "host unreachable"))?;
        inbox.push_back((from, line));
        Ok(())
    }

    fn deliver_segment(&self, from: Address, line: &str) {
        let mut inner = self.lock();
        for (address, inbox) in inner.inboxes.iter_mut() {
            if *address != from {
                inbox.push_back((from, line.to_string()));
            }
        }
    }

    fn neighbors_of(&self, address: Address) -> Vec<Address> {
        self.lock().links.get(&address).cloned().unwrap_or_default()
    }

    fn pop(&self, address: Address) -> Option<(Address, String)> {
        self.lock().inboxes.get_mut(&address)?.pop_front()
    }
}

/// One node's view of a `MemoryNetwork`
pub struct MemoryTransport {
    address: Address,
    network: MemoryNetwork,
}

impl MemoryTransport {
    pub fn address(&self) -> Address {
        self.address
    }
}

impl Transport for MemoryTransport {
    fn neighbors(&self) -> Vec<Address> {
        self.network.neighbors_of(self.address)
    }

    fn send(&mut self, frame: &Frame, to: Address) -> Result<()> {
        self.network.deliver(self.address, to, codec::encode(frame))
    }

    fn send_broadcast_channel(&mut self, frame: &Frame) -> Result<()> {
        self.network.deliver_segment(self.address, &codec::encode(frame));
        Ok(())
    }

    fn try_receive(&mut self) -> Result<Option<Inbound>> {
        let Some((from, line)) = self.network.pop(self.address) else {
            return Ok(None);
        };
        let frame = codec::decode(&line)?;
        Ok(Some(Inbound { frame, from }))
    }
}
