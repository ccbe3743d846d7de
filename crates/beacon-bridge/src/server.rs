//! Request/response server
//!
//! Serves one client connection at a time. Each request is a 4-byte tag and
//! each answer a 16-byte record built from the current vehicle snapshot.
//!
//! ```text
//! LISTENING ──accept──▶ CONNECTED ──read 4 bytes──▶ DECODE
//!     ▲                     ▲                          │
//!     │                     └──── write 16 bytes ◀─────┤ known tag
//!     │                     └──── (no reply) ◀─────────┘ unknown tag
//!     └──── peer closed / I/O error
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use beacon_core::wire::decode_request;
use beacon_core::{Reply, VehicleState, REQUEST_LEN};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{BridgeError, BridgeResult};

/// Only one client is served; extra connection attempts wait in the backlog
const LISTEN_BACKLOG: i32 = 1;

/// Pause after a failed accept so a persistent error doesn't spin
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Counters shared between the server task and observers
#[derive(Debug, Default)]
pub struct ServerStats {
    connections: AtomicU64,
    requests_served: AtomicU64,
    requests_rejected: AtomicU64,
}

impl ServerStats {
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    pub fn requests_rejected(&self) -> u64 {
        self.requests_rejected.load(Ordering::Relaxed)
    }
}

/// How a client session ended without an I/O error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    PeerClosed,
    Shutdown,
}

enum ReadOutcome {
    Request,
    Closed,
}

/// Single-client TCP server for identity/position/obstacle queries
pub struct RequestServer {
    listener: TcpListener,
    state: Arc<VehicleState>,
    stats: Arc<ServerStats>,
}

impl RequestServer {
    /// Bind and listen on `endpoint`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(endpoint: SocketAddr, state: Arc<VehicleState>) -> BridgeResult<Self> {
        let listener = listen(endpoint).map_err(|e| BridgeError::bind(endpoint, e))?;
        Ok(Self {
            listener,
            state,
            stats: Arc::new(ServerStats::default()),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> BridgeResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| BridgeError::bind("request listener", e))
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        self.stats.clone()
    }

    /// Accept and serve clients until `cancel` fires
    ///
    /// Per-request and per-connection failures are logged and never end the
    /// loop. The listener and any open connection are closed on return.
    pub async fn run(self, cancel: CancellationToken) {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "Request server listening");
        }

        loop {
            let accepted = tokio::select! {
                _ = cancel.cancelled() => break,
                res = self.listener.accept() => res,
            };

            match accepted {
                Ok((stream, peer)) => {
                    self.stats.connections.fetch_add(1, Ordering::Relaxed);
                    info!(%peer, "Client connected");

                    match self.serve(stream, &cancel).await {
                        Ok(SessionEnd::PeerClosed) => info!(%peer, "Client disconnected"),
                        Ok(SessionEnd::Shutdown) => {
                            info!(%peer, "Closing client connection for shutdown");
                            break;
                        }
                        Err(e) => warn!(%peer, error = %e, "Client connection aborted"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(ACCEPT_RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("Request server stopped");
    }

    /// Serve requests on one connection until the peer leaves or shutdown
    async fn serve(
        &self,
        mut stream: TcpStream,
        cancel: &CancellationToken,
    ) -> BridgeResult<SessionEnd> {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        let mut tag = [0u8; REQUEST_LEN];
        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Ok(SessionEnd::Shutdown),
                res = read_request(&mut stream, &mut tag) => res.map_err(BridgeError::Connection)?,
            };
            if let ReadOutcome::Closed = outcome {
                return Ok(SessionEnd::PeerClosed);
            }

            let request = match decode_request(&tag) {
                Ok(request) => request,
                Err(e) => {
                    self.stats.requests_rejected.fetch_add(1, Ordering::Relaxed);
                    warn!(tag = %hex::encode(tag), error = %e, "Ignoring bad request");
                    continue;
                }
            };

            let snapshot = self.state.read();
            let reply = Reply::for_request(request, &snapshot).encode();

            tokio::select! {
                _ = cancel.cancelled() => return Ok(SessionEnd::Shutdown),
                res = stream.write_all(&reply) => res.map_err(BridgeError::Connection)?,
            }

            self.stats.requests_served.fetch_add(1, Ordering::Relaxed);
            debug!(tag = request.tag_str(), reply = %hex::encode(reply), "Served request");
        }
    }
}

/// Fill `tag` with exactly one request
///
/// EOF before the first byte is a clean close. EOF inside a request is an
/// error.
async fn read_request(
    stream: &mut TcpStream,
    tag: &mut [u8; REQUEST_LEN],
) -> std::io::Result<ReadOutcome> {
    let mut filled = 0;
    while filled < tag.len() {
        let n = stream.read(&mut tag[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(ReadOutcome::Closed);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("peer closed after {filled} of {REQUEST_LEN} request bytes"),
            ));
        }
        filled += n;
    }
    Ok(ReadOutcome::Request)
}

fn listen(endpoint: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(endpoint), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&endpoint.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    TcpListener::from_std(socket.into())
}
