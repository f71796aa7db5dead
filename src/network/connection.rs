use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Instant;

use bytes::BytesMut;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, warn};

use crate::core::{Address, Config, Error, MulticastConfig, Result, MAX_FRAME_SIZE};
use crate::protocol::{Frame, FrameCodec};
use super::discovery::PeerTable;
use super::{Inbound, Transport};

/// UDP transport: one unicast socket plus an optional multicast group for the
/// local broadcast channel.
///
/// Every node listens on the same unicast port. Sends never block and are
/// never retried. A datagram may carry several newline-separated frames;
/// they are handed out one per `try_receive`.
pub struct UdpTransport {
    port: u16,
    unicast: UdpSocket,
    multicast: Option<(UdpSocket, SocketAddrV4)>,
    codec: FrameCodec,
    peers: PeerTable,
    /// Frames decoded from an earlier datagram and not yet handed out
    pending: VecDeque<Inbound>,
    recv_buffer: Vec<u8>,
    send_buffer: BytesMut,
}

impl UdpTransport {
    /// Binds the sockets described by `config`
    pub async fn bind(config: &Config) -> Result<Self> {
        let unicast = UdpSocket::bind(SocketAddrV4::new(config.bind_addr, config.port))
            .await
            .map_err(|e| Error::network(format!("Failed to bind socket: {}", e)))?;
        let port = unicast.local_addr()?.port();

        let multicast = match config.multicast {
            Some(group) => {
                let socket = join_multicast(config.bind_addr, group)
                    .map_err(|e| Error::network(format!("Failed to join {}: {}", group.group, e)))?;
                unicast.set_multicast_loop_v4(false)?;
                Some((socket, SocketAddrV4::new(group.group, group.port)))
            }
            None => None,
        };

        info!(
            port,
            multicast = ?config.multicast.map(|m| m.group),
            peers = config.peers.len(),
            "UDP transport bound"
        );

        Ok(UdpTransport {
            port,
            unicast,
            multicast,
            codec: FrameCodec::new(),
            peers: PeerTable::new(config),
            pending: VecDeque::new(),
            recv_buffer: vec![0; MAX_FRAME_SIZE],
            send_buffer: BytesMut::with_capacity(512),
        })
    }

    /// Returns the local unicast socket address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.unicast
            .local_addr()
            .map_err(|e| Error::network(format!("Failed to get local address: {}", e)))
    }

    pub fn peers(&self) -> &PeerTable {
        &self.peers
    }

    fn encode(&mut self, frame: &Frame) -> Result<()> {
        self.send_buffer.clear();
        self.codec.encode(frame, &mut self.send_buffer)
    }
}

/// Opens a non-blocking socket joined to the multicast group
fn join_multicast(interface: Ipv4Addr, group: MulticastConfig) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, group.port).into())?;
    socket.join_multicast_v4(&group.group, &interface)?;
    UdpSocket::from_std(socket.into())
}

/// Reads one datagram if one is ready
fn try_recv(socket: &UdpSocket, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>> {
    match socket.try_recv_from(buf) {
        Ok(received) => Ok(Some(received)),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Transport for UdpTransport {
    fn neighbors(&self) -> Vec<Address> {
        self.peers.addresses()
    }

    fn send(&mut self, frame: &Frame, to: Address) -> Result<()> {
        self.encode(frame)?;
        let dest = SocketAddr::V4(SocketAddrV4::new(to.ip(), self.port));
        self.unicast
            .try_send_to(&self.send_buffer, dest)
            .map(|_| ())
            .map_err(|e| Error::send_failure(to, e))
    }

    fn send_broadcast_channel(&mut self, frame: &Frame) -> Result<()> {
        let group = match &self.multicast {
            Some((_, group)) => *group,
            None => return Err(Error::network("Local broadcast channel is disabled")),
        };
        self.encode(frame)?;
        self.unicast
            .try_send_to(&self.send_buffer, SocketAddr::V4(group))
            .map(|_| ())
            .map_err(|e| Error::network(format!("Failed to send to {}: {}", group, e)))
    }

    fn try_receive(&mut self) -> Result<Option<Inbound>> {
        if let Some(inbound) = self.pending.pop_front() {
            return Ok(Some(inbound));
        }

        let now = Instant::now();
        let forgotten = self.peers.maintain(now);
        if forgotten > 0 {
            debug!(forgotten, "Dropped silent neighbors");
        }

        let mut received = try_recv(&self.unicast, &mut self.recv_buffer)?;
        if received.is_none() {
            if let Some((socket, _)) = &self.multicast {
                received = try_recv(socket, &mut self.recv_buffer)?;
            }
        }
        let Some((len, sender)) = received else {
            return Ok(None);
        };
        let SocketAddr::V4(sender) = sender else {
            return Err(Error::network(format!("Unexpected IPv6 sender {}", sender)));
        };
        let from = Address(*sender.ip());

        let mut bytes = BytesMut::from(&self.recv_buffer[..len]);
        while !bytes.is_empty() {
            // Every decode consumes the line it looked at, even a bad one
            match self.codec.decode_eof(&mut bytes) {
                Ok(Some(frame)) => {
                    if frame == Frame::Connected && self.peers.touch(from, now) {
                        info!(%from, "Learned new neighbor");
                    }
                    self.pending.push_back(Inbound { frame, from });
                }
                Ok(None) => break,
                Err(e) => warn!(%from, error = %e, "Dropping malformed line"),
            }
        }

        Ok(self.pending.pop_front())
    }
}
