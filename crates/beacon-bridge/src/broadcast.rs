//! Periodic position broadcast
//!
//! Every period the emitter reads one snapshot and sends it as a single
//! 16-byte datagram. Firings are scheduled on a fixed grid from the start
//! instant (`origin + k * period`), so a slow send delays only its own tick.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use beacon_core::{BroadcastRecord, VehicleState};
use tokio::net::UdpSocket;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{BridgeError, BridgeResult};

/// Counters shared between the emitter task and observers
#[derive(Debug, Default)]
pub struct EmitterStats {
    sent: AtomicU64,
    failed: AtomicU64,
}

impl EmitterStats {
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Fixed-rate UDP sender of [`BroadcastRecord`]s
pub struct BroadcastEmitter {
    socket: UdpSocket,
    target: SocketAddr,
    period: Duration,
    state: Arc<VehicleState>,
    stats: Arc<EmitterStats>,
}

impl BroadcastEmitter {
    /// Open a broadcast-enabled socket for sending to `target`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(
        target: SocketAddr,
        period: Duration,
        state: Arc<VehicleState>,
    ) -> BridgeResult<Self> {
        if period.is_zero() {
            return Err(BridgeError::Config(
                "broadcast period must be greater than zero".to_string(),
            ));
        }

        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = open_socket(local).map_err(|e| BridgeError::bind(local, e))?;

        Ok(Self {
            socket,
            target,
            period,
            state,
            stats: Arc::new(EmitterStats::default()),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn stats(&self) -> Arc<EmitterStats> {
        self.stats.clone()
    }

    /// Emit until `cancel` fires
    ///
    /// The first datagram goes out immediately.
    pub async fn run(self, cancel: CancellationToken) {
        let origin = Instant::now();
        let mut ticker = tokio::time::interval_at(origin, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            target = %self.target,
            period_ms = self.period.as_millis() as u64,
            "Broadcast emitter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.emit().await {
                Ok(()) => {
                    let n = self.stats.sent.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(tick = n, "Broadcast sent");
                }
                Err(e) => {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "Broadcast skipped");
                }
            }
        }

        info!(
            sent = self.stats.sent(),
            failed = self.stats.failed(),
            "Broadcast emitter stopped"
        );
    }

    async fn emit(&self) -> BridgeResult<()> {
        let snapshot = self.state.read();
        let datagram = BroadcastRecord::from(&snapshot).encode();
        self.socket
            .send_to(&datagram, self.target)
            .await
            .map(|_| ())
            .map_err(|source| BridgeError::Send {
                target: self.target,
                source,
            })
    }
}

fn open_socket(local: SocketAddr) -> std::io::Result<UdpSocket> {
    let socket = std::net::UdpSocket::bind(local)?;
    socket.set_broadcast(true)?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket)
}
