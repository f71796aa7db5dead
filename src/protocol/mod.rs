//! Protocol implementation module
//!
//! This module defines the meshcast frames, their line encoding, the bounded
//! session table and the flooding engine that ties them together.

pub mod codec;
pub mod engine;
pub mod executor;
pub mod message;
pub mod session;

pub use self::codec::FrameCodec;
pub use self::engine::{BroadcastEngine, Event};
pub use self::executor::LocalExecutor;
pub use self::message::{contributions, Contribution, Frame, FrameKind};
pub use self::session::{BroadcastSession, SessionTable};
