//! Core types for the meshcast protocol
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod config;
pub mod error;
pub mod types;
pub mod serde;

pub use self::config::{Config, EvictionPolicy, MulticastConfig};
pub use self::error::{Error, Result};
pub use self::types::{Address, SessionId};

/// Default UDP port for unicast frames
pub const DEFAULT_PORT: u16 = 4040;

/// Default multicast port for the local broadcast channel
pub const DEFAULT_MULTICAST_PORT: u16 = 5556;

/// Default number of concurrently tracked broadcast sessions
pub const DEFAULT_SESSION_CAPACITY: usize = 5;

/// Maximum frame size in bytes (maximum UDP payload)
pub const MAX_FRAME_SIZE: usize = 65507;
