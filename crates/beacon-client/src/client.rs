//! Request/response client
//!
//! Holds one TCP connection to a beacon and issues tag requests on it. The
//! beacon serves a single client at a time, so keep the connection open for
//! the whole session rather than reconnecting per query.

use std::net::SocketAddr;
use std::time::Duration;

use beacon_core::wire::encode_request;
use beacon_core::{Pose, Reply, Request, REPLY_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the beacon's request/response channel
#[derive(Debug)]
pub struct RemoteClient {
    stream: TcpStream,
    peer: SocketAddr,
    reply_timeout: Duration,
}

impl RemoteClient {
    /// Connect with default timeouts
    pub async fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> ClientResult<Self> {
        Self::connect_with_timeout(addr, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REPLY_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        addr: impl ToSocketAddrs + std::fmt::Display,
        connect_timeout: Duration,
        reply_timeout: Duration,
    ) -> ClientResult<Self> {
        let label = addr.to_string();
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout(format!("connecting to {}", label)))?
            .map_err(|source| ClientError::Connect {
                addr: label.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;

        info!(%peer, "Connected to beacon");
        Ok(Self {
            stream,
            peer,
            reply_timeout,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Send one request and wait for its 16-byte reply
    pub async fn request(&mut self, request: Request) -> ClientResult<Reply> {
        self.send_tag(encode_request(request)).await?;

        let mut buf = [0u8; REPLY_LEN];
        tokio::time::timeout(self.reply_timeout, self.stream.read_exact(&mut buf))
            .await
            .map_err(|_| ClientError::Timeout(format!("waiting for {} reply", request.tag_str())))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ClientError::ConnectionClosed,
                _ => ClientError::Io(e),
            })?;

        let reply = Reply::decode(request, &buf)?;
        debug!(tag = request.tag_str(), ?reply, "Received reply");
        Ok(reply)
    }

    /// Write a raw 4-byte tag without waiting for a reply
    ///
    /// The beacon answers unknown tags with silence.
    pub async fn send_tag(&mut self, tag: [u8; 4]) -> ClientResult<()> {
        self.stream.write_all(&tag).await?;
        Ok(())
    }

    pub async fn identity(&mut self) -> ClientResult<u32> {
        match self.request(Request::Identity).await? {
            Reply::Identity { id } => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn position(&mut self) -> ClientResult<Pose> {
        match self.request(Request::Position).await? {
            Reply::Position(pose) => Ok(pose),
            other => Err(unexpected(other)),
        }
    }

    pub async fn obstacle(&mut self) -> ClientResult<bool> {
        match self.request(Request::Obstacle).await? {
            Reply::Obstacle { detected } => Ok(detected),
            other => Err(unexpected(other)),
        }
    }

    /// Close the connection, letting the beacon accept the next client
    pub async fn close(mut self) -> ClientResult<()> {
        self.stream.shutdown().await?;
        info!(peer = %self.peer, "Disconnected from beacon");
        Ok(())
    }
}

fn unexpected(reply: Reply) -> ClientError {
    ClientError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("unexpected reply kind: {:?}", reply),
    ))
}
