//! Broadcast listener
//!
//! Receives the beacon's periodic position datagrams. The socket is bound
//! with `SO_REUSEADDR` so several trackers on one host can share the
//! broadcast port.

use std::net::SocketAddr;

use beacon_core::wire::decode_broadcast;
use beacon_core::{BroadcastRecord, BROADCAST_LEN};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{info, warn};

use crate::error::ClientResult;

/// Larger than any valid datagram so oversized ones are detected
const RECV_BUFFER_LEN: usize = 64;

/// Listener for the beacon's broadcast channel
#[derive(Debug)]
pub struct VehicleTracker {
    socket: UdpSocket,
}

impl VehicleTracker {
    /// Bind to the broadcast address/port
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(addr: SocketAddr) -> ClientResult<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;

        let socket = UdpSocket::from_std(socket.into())?;
        info!(addr = %socket.local_addr()?, "Vehicle tracker listening");
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> ClientResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait for the next well-formed record
    ///
    /// Datagrams that are not exactly 16 bytes are logged and skipped.
    pub async fn recv(&self) -> ClientResult<(BroadcastRecord, SocketAddr)> {
        let mut buf = [0u8; RECV_BUFFER_LEN];
        loop {
            let (n, from) = self.socket.recv_from(&mut buf).await?;
            match decode_broadcast(&buf[..n]) {
                Ok(record) => return Ok((record, from)),
                Err(e) => warn!(%from, len = n, expected = BROADCAST_LEN, error = %e, "Skipping malformed datagram"),
            }
        }
    }
}
