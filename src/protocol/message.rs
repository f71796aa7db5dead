use std::fmt;

use crate::core::{Address, Error, Result, SessionId};
use crate::util::FRAGMENT_TERMINATOR;

/// Kind of a wire frame, identified by its leading flag character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `B`: disseminate a payload and expect an aggregated response
    Broadcast,
    /// `R`: aggregated or partial answer flowing back toward the originator
    Response,
    /// `W`: duplicate path, no response will follow from this branch
    Suppress,
    /// `M`: point-to-point message, never flooded
    Direct,
    /// `C`: liveness handshake
    Connected,
    /// `U`: local broadcast channel datagram
    Datagram,
}

impl FrameKind {
    /// Returns the flag character for this kind
    pub fn flag(&self) -> char {
        match self {
            FrameKind::Broadcast => 'B',
            FrameKind::Response => 'R',
            FrameKind::Suppress => 'W',
            FrameKind::Direct => 'M',
            FrameKind::Connected => 'C',
            FrameKind::Datagram => 'U',
        }
    }

    /// Looks up a kind by flag character
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'B' => Some(FrameKind::Broadcast),
            'R' => Some(FrameKind::Response),
            'W' => Some(FrameKind::Suppress),
            'M' => Some(FrameKind::Direct),
            'C' => Some(FrameKind::Connected),
            'U' => Some(FrameKind::Datagram),
            _ => None,
        }
    }
}

/// A protocol frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Broadcast {
        id: SessionId,
        /// Address of the node that sent this copy (rewritten at every relay)
        origin: Address,
        payload: String,
    },
    Response {
        id: SessionId,
        payload: String,
    },
    Suppress {
        id: SessionId,
    },
    Direct {
        id: SessionId,
        origin: Address,
        payload: String,
    },
    Connected,
    Datagram {
        id: SessionId,
        payload: String,
    },
}

impl Frame {
    /// Builds a frame from loose parts, failing when a field the kind requires is absent
    pub fn from_parts(
        kind: FrameKind,
        id: Option<SessionId>,
        origin: Option<Address>,
        payload: Option<&str>,
    ) -> Result<Self> {
        let missing = |field: &str| Error::malformed(format!("{:?} frame requires {}", kind, field));
        let id = || id.ok_or_else(|| missing("an id"));
        let origin = || origin.ok_or_else(|| missing("an origin"));
        let payload = || payload.map(str::to_string).ok_or_else(|| missing("a payload"));

        Ok(match kind {
            FrameKind::Broadcast => Frame::Broadcast {
                id: id()?,
                origin: origin()?,
                payload: payload()?,
            },
            FrameKind::Response => Frame::Response {
                id: id()?,
                payload: payload()?,
            },
            FrameKind::Suppress => Frame::Suppress { id: id()? },
            FrameKind::Direct => Frame::Direct {
                id: id()?,
                origin: origin()?,
                payload: payload()?,
            },
            FrameKind::Connected => Frame::Connected,
            FrameKind::Datagram => Frame::Datagram {
                id: id()?,
                payload: payload()?,
            },
        })
    }

    /// Returns the kind of this frame
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Broadcast { .. } => FrameKind::Broadcast,
            Frame::Response { .. } => FrameKind::Response,
            Frame::Suppress { .. } => FrameKind::Suppress,
            Frame::Direct { .. } => FrameKind::Direct,
            Frame::Connected => FrameKind::Connected,
            Frame::Datagram { .. } => FrameKind::Datagram,
        }
    }

    /// Returns the session id carried by this frame, if any
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Frame::Broadcast { id, .. }
            | Frame::Response { id, .. }
            | Frame::Suppress { id }
            | Frame::Direct { id, .. }
            | Frame::Datagram { id, .. } => Some(*id),
            Frame::Connected => None,
        }
    }
}

impl fmt::Display for Frame {
    /// Writes the single-line wire form, without the trailing newline
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = self.kind().flag();
        match self {
            Frame::Broadcast { id, origin, payload } | Frame::Direct { id, origin, payload } => {
                write!(f, "{} {} {} {}", flag, id, origin, Clean(payload))
            }
            Frame::Response { id, payload } | Frame::Datagram { id, payload } => {
                write!(f, "{} {} {}", flag, id, Clean(payload))
            }
            Frame::Suppress { id } => write!(f, "{} {}", flag, id),
            Frame::Connected => write!(f, "{}", flag),
        }
    }
}

/// Payload writer that drops embedded line terminators
struct Clean<'a>(&'a str);

impl fmt::Display for Clean<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in self.0.split(['\n', '\r']) {
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// One node's entry inside an aggregated response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution<'a> {
    /// Identifier of the contributing node
    pub node: &'a str,
    /// That node's local result
    pub result: &'a str,
}

/// Splits an aggregated response into per-node contributions
pub fn contributions(aggregate: &str) -> Vec<Contribution<'_>> {
    aggregate
        .split(FRAGMENT_TERMINATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(' ') {
            Some((node, result)) => Contribution { node, result },
            None => Contribution { node: entry, result: "" },
        })
        .collect()
}
