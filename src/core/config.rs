use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::types::Address;

/// What the session table does when a new session arrives and every slot is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Drop the oldest in-flight session to admit the new one.
    /// The evicted session can never be finalized.
    #[default]
    OverwriteOldest,
    /// Refuse the new session with `Error::TableFull`
    RejectNew,
}

/// Local broadcast channel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastConfig {
    /// Multicast group address
    pub group: Ipv4Addr,
    /// Multicast port
    pub port: u16,
}

impl Default for MulticastConfig {
    fn default() -> Self {
        MulticastConfig {
            group: Ipv4Addr::new(224, 1, 1, 1),
            port: super::DEFAULT_MULTICAST_PORT,
        }
    }
}

/// Configuration for a meshcast node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label used to tag this node's local contributions
    pub node_id: String,
    /// This node's own address, written into relayed frames
    pub address: Address,
    /// Local interface to bind to
    pub bind_addr: Ipv4Addr,
    /// Unicast port, shared by every node in the mesh
    pub port: u16,
    /// Local broadcast channel, `None` disables it
    pub multicast: Option<MulticastConfig>,
    /// Statically known neighbors
    pub peers: Vec<Address>,
    /// Maximum number of neighbors to maintain
    pub max_peers: usize,
    /// Number of concurrently tracked broadcast sessions
    pub session_capacity: usize,
    /// Behavior when the session table is full
    pub eviction: EvictionPolicy,
    /// Number of recently seen datagram ids kept for echo suppression
    pub datagram_history: usize,
    /// Number of finished broadcast ids remembered so late copies are suppressed
    pub broadcast_history: usize,
    /// Interval between transport polls
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub poll_interval: Duration,
    /// Interval between liveness announcements
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub announce_interval: Duration,
    /// Time after which a learned neighbor is forgotten
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub peer_timeout: Duration,
    /// Age after which an in-flight session is finalized with a partial aggregate
    #[serde(serialize_with = "super::serde::serialize_opt_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_opt_duration")]
    pub session_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            node_id: "node".to_string(),
            address: Address(Ipv4Addr::LOCALHOST),
            bind_addr: Ipv4Addr::UNSPECIFIED,
            port: super::DEFAULT_PORT,
            multicast: Some(MulticastConfig::default()),
            peers: Vec::new(),
            max_peers: 10,
            session_capacity: super::DEFAULT_SESSION_CAPACITY,
            eviction: EvictionPolicy::default(),
            datagram_history: 8,
            broadcast_history: 32,
            poll_interval: Duration::from_millis(10),
            announce_interval: Duration::from_secs(30),
            peer_timeout: Duration::from_secs(90),
            session_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl Config {
    /// Creates a default configuration for the given node label and address
    pub fn for_node(node_id: impl Into<String>, address: Address) -> Self {
        Config {
            node_id: node_id.into(),
            address,
            ..Default::default()
        }
    }

    /// Parses and validates a TOML configuration
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Checks the configuration for values the protocol cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.node_id.is_empty() {
            return Err(Error::config("node_id must not be empty"));
        }
        if self.node_id.contains(|c: char| c.is_whitespace() || c == ';') {
            return Err(Error::config(format!(
                "node_id {:?} must not contain whitespace or ';'",
                self.node_id
            )));
        }
        if self.session_capacity == 0 {
            return Err(Error::config("session_capacity must be at least 1"));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::config("poll_interval must be non-zero"));
        }
        if self.announce_interval.is_zero() {
            return Err(Error::config("announce_interval must be non-zero"));
        }
        Ok(())
    }
}
