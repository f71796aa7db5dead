//! Network transport and node runtime module
//!
//! This module defines the transport port the engine talks through, its UDP
//! and in-process implementations, and the poll loop that drives one node.

mod connection;
mod discovery;
mod memory;

pub use self::connection::UdpTransport;
pub use self::discovery::PeerTable;
pub use self::memory::{MemoryNetwork, MemoryTransport};

use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::core::{Address, Config, Error, Result, SessionId};
use crate::protocol::{BroadcastEngine, Event, Frame, LocalExecutor};

/// Events buffered for the application before new ones are dropped
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// A decoded frame together with the address it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub frame: Frame,
    pub from: Address,
}

/// Best-effort frame delivery.
///
/// Every send may fail and is never retried; `try_receive` never blocks.
pub trait Transport: Send {
    /// Nodes this node can relay broadcasts to
    fn neighbors(&self) -> Vec<Address>;

    /// Sends a frame to one address
    fn send(&mut self, frame: &Frame, to: Address) -> Result<()>;

    /// Sends a frame on the local broadcast channel
    fn send_broadcast_channel(&mut self, frame: &Frame) -> Result<()>;

    /// Takes one received frame, if any is waiting
    fn try_receive(&mut self) -> Result<Option<Inbound>>;
}

/// Requests from a `NodeHandle` to its node task
enum Command {
    Broadcast {
        payload: String,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    Direct {
        to: Address,
        payload: String,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    Datagram {
        payload: String,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    ClearSessions {
        reply: oneshot::Sender<usize>,
    },
}

/// Handle for asking a running node to do something
#[derive(Clone)]
pub struct NodeHandle {
    command_tx: mpsc::Sender<Command>,
}

impl NodeHandle {
    /// Starts a network-wide broadcast; the aggregate arrives as `Event::Completed`
    pub async fn broadcast(&self, payload: impl Into<String>) -> Result<SessionId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Broadcast { payload: payload.into(), reply }).await?;
        rx.await.map_err(|_| Error::network("Node stopped before replying"))?
    }

    /// Sends a point-to-point message
    pub async fn direct(&self, to: Address, payload: impl Into<String>) -> Result<SessionId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Direct { to, payload: payload.into(), reply }).await?;
        rx.await.map_err(|_| Error::network("Node stopped before replying"))?
    }

    /// Sends a datagram on the local broadcast channel
    pub async fn datagram(&self, payload: impl Into<String>) -> Result<SessionId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Datagram { payload: payload.into(), reply }).await?;
        rx.await.map_err(|_| Error::network("Node stopped before replying"))?
    }

    /// Drops every in-flight session, returning how many there were
    pub async fn clear_sessions(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ClearSessions { reply }).await?;
        rx.await.map_err(|_| Error::network("Node stopped before replying"))
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| Error::network(format!("Failed to queue command: {}", e)))
    }
}

/// Drives one engine: polls the transport, runs commands, forwards events.
///
/// All engine access happens on the task running `run`, so frames and
/// commands are dispatched one at a time.
pub struct Node<T, X> {
    engine: BroadcastEngine<T, X>,
    command_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<Event>,
    poll_interval: Duration,
    announce_interval: Duration,
}

impl<T: Transport, X: LocalExecutor> Node<T, X> {
    /// Creates a node along with its command handle and event stream
    pub fn new(config: &Config, transport: T, executor: X) -> (Self, NodeHandle, mpsc::Receiver<Event>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let node = Node {
            engine: BroadcastEngine::new(config, transport, executor),
            command_rx,
            event_tx,
            poll_interval: config.poll_interval,
            announce_interval: config.announce_interval,
        };

        (node, NodeHandle { command_tx }, event_rx)
    }

    pub fn engine(&self) -> &BroadcastEngine<T, X> {
        &self.engine
    }

    /// Runs until every `NodeHandle` has been dropped
    pub async fn run(mut self) -> Result<()> {
        info!(
            node_id = self.engine.node_id(),
            address = %self.engine.address(),
            "Node started"
        );

        let mut poll = interval(self.poll_interval);
        let mut announce = interval(self.announce_interval);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    self.engine.tick();
                    self.engine.expire_stale(Instant::now());
                }
                _ = announce.tick() => self.engine.announce(),
                command = self.command_rx.recv() => match command {
                    Some(command) => self.execute(command),
                    None => break,
                },
            }

            self.forward_events();
        }

        info!(node_id = self.engine.node_id(), "Node stopped");
        Ok(())
    }

    fn execute(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::Broadcast { payload, reply } => {
                let _ = reply.send(self.engine.originate(&payload));
            }
            Command::Direct { to, payload, reply } => {
                let _ = reply.send(self.engine.send_direct(to, &payload));
            }
            Command::Datagram { payload, reply } => {
                let _ = reply.send(self.engine.send_datagram(&payload));
            }
            Command::ClearSessions { reply } => {
                let _ = reply.send(self.engine.clear_sessions());
            }
        }
    }

    /// Hands pending events to the application without waiting on it.
    ///
    /// Returns how many events were dropped because the channel was full.
    fn forward_events(&mut self) -> usize {
        let mut dropped = 0;
        for event in self.engine.drain_events() {
            match self.event_tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => {
                    warn!(?event, "Event channel full, dropping event");
                    dropped += 1;
                }
                Err(TrySendError::Closed(_)) => debug!("Event receiver dropped"),
            }
        }
        dropped
    }
}
