//! meshcast: flooding broadcast with response aggregation
//!
//! A node originates a broadcast that reaches every other reachable node
//! exactly once. Each node contributes the output of its local executor, and
//! the originator receives one aggregated response. Duplicate delivery paths
//! are answered with a suppression frame instead of a second contribution.
pub mod core;

pub mod network;
pub mod protocol;
mod util;

// Re-export commonly used items
pub use self::core::{Address, Config, Error, EvictionPolicy, Result, SessionId};
pub use network::{MemoryNetwork, Node, NodeHandle, Transport, UdpTransport};
pub use protocol::{contributions, BroadcastEngine, Event, Frame, LocalExecutor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
