//! Bridge lifecycle
//!
//! [`BridgeRuntime`] acquires both sockets, starts the request server and the
//! broadcast emitter on their own tasks, and hands producers a
//! [`StateUpdater`] for pushing pose, obstacle and identity changes.
//!
//! Startup: state → request socket → broadcast socket → server task →
//! emitter task → updates accepted.
//!
//! Shutdown: updates refused → server cancelled and joined → emitter
//! cancelled and joined. Each task owns its socket, so joining a task
//! releases its socket.

use std::net::SocketAddr;
use std::sync::Arc;

use beacon_core::{Snapshot, VehicleState};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::broadcast::{BroadcastEmitter, EmitterStats};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::server::{RequestServer, ServerStats};

/// Point-in-time counters for both channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeStats {
    pub connections: u64,
    pub requests_served: u64,
    pub requests_rejected: u64,
    pub broadcasts_sent: u64,
    pub broadcasts_failed: u64,
}

/// Update hooks handed to pose/range producers
///
/// Cheap to clone. Once the bridge begins shutting down, updates are
/// dropped.
///
/// Each update holds the gate's read lock while it writes, and shutdown
/// closes the gate under the write lock, so no update lands after the gate
/// is closed.
#[derive(Debug, Clone)]
pub struct StateUpdater {
    state: Arc<VehicleState>,
    accepting: Arc<RwLock<bool>>,
}

impl StateUpdater {
    fn apply(&self, update: impl FnOnce(&VehicleState)) {
        let accepting = self.accepting.read();
        if *accepting {
            update(&self.state);
        } else {
            debug!("Bridge is shutting down, dropping state update");
        }
    }

    pub fn set_identity(&self, id: u32) {
        self.apply(|state| state.set_identity(id));
    }

    pub fn set_position(&self, x: f32, y: f32, yaw: f32) {
        self.apply(|state| state.set_position(x, y, yaw));
    }

    pub fn set_obstacle(&self, detected: bool) {
        self.apply(|state| state.set_obstacle(detected));
    }
}

/// Running telemetry bridge
pub struct BridgeRuntime {
    state: Arc<VehicleState>,
    accepting: Arc<RwLock<bool>>,
    request_addr: SocketAddr,
    broadcast_target: SocketAddr,
    root: CancellationToken,
    server_cancel: CancellationToken,
    emitter_cancel: CancellationToken,
    server_task: Option<JoinHandle<()>>,
    emitter_task: Option<JoinHandle<()>>,
    server_stats: Arc<ServerStats>,
    emitter_stats: Arc<EmitterStats>,
}

impl BridgeRuntime {
    /// Bind both sockets and start the server and emitter tasks
    ///
    /// Fails with [`BridgeError::Config`] or [`BridgeError::Bind`] before any
    /// task is spawned. A socket acquired before a later failure is closed
    /// on return.
    pub async fn start(config: &BridgeConfig) -> BridgeResult<Self> {
        config.validate()?;

        let state = Arc::new(VehicleState::new());
        state.set_identity(config.vehicle.id);

        let server = RequestServer::bind(config.request_endpoint()?, state.clone())?;
        let request_addr = server.local_addr()?;

        let emitter = BroadcastEmitter::bind(
            config.broadcast_target()?,
            config.broadcast_period(),
            state.clone(),
        )?;
        let broadcast_target = emitter.target();

        let server_stats = server.stats();
        let emitter_stats = emitter.stats();

        let root = CancellationToken::new();
        let server_cancel = root.child_token();
        let emitter_cancel = root.child_token();

        let server_task = tokio::spawn(server.run(server_cancel.clone()));
        let emitter_task = tokio::spawn(emitter.run(emitter_cancel.clone()));

        let accepting = Arc::new(RwLock::new(true));

        info!(
            id = config.vehicle.id,
            %request_addr,
            %broadcast_target,
            period_ms = config.broadcast.period_ms,
            "Telemetry bridge started"
        );

        Ok(Self {
            state,
            accepting,
            request_addr,
            broadcast_target,
            root,
            server_cancel,
            emitter_cancel,
            server_task: Some(server_task),
            emitter_task: Some(emitter_task),
            server_stats,
            emitter_stats,
        })
    }

    /// Handle for producers to push state changes
    pub fn updates(&self) -> StateUpdater {
        StateUpdater {
            state: self.state.clone(),
            accepting: self.accepting.clone(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.read()
    }

    /// Bound request/response address
    pub fn request_addr(&self) -> SocketAddr {
        self.request_addr
    }

    pub fn broadcast_target(&self) -> SocketAddr {
        self.broadcast_target
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            connections: self.server_stats.connections(),
            requests_served: self.server_stats.requests_served(),
            requests_rejected: self.server_stats.requests_rejected(),
            broadcasts_sent: self.emitter_stats.sent(),
            broadcasts_failed: self.emitter_stats.failed(),
        }
    }

    /// Stop both tasks in order and wait for them to release their sockets
    ///
    /// Both tasks are always joined; the first join failure is returned.
    pub async fn shutdown(mut self) -> BridgeResult<BridgeStats> {
        info!("Shutting down telemetry bridge");
        *self.accepting.write() = false;

        self.server_cancel.cancel();
        let server_result = join(self.server_task.take(), "request server").await;

        self.emitter_cancel.cancel();
        let emitter_result = join(self.emitter_task.take(), "broadcast emitter").await;

        server_result?;
        emitter_result?;

        let stats = self.stats();
        info!(?stats, "Telemetry bridge stopped");
        Ok(stats)
    }
}

async fn join(task: Option<JoinHandle<()>>, name: &str) -> BridgeResult<()> {
    match task {
        Some(handle) => handle
            .await
            .map_err(|e| BridgeError::Task(format!("{}: {}", name, e))),
        None => Ok(()),
    }
}

impl Drop for BridgeRuntime {
    fn drop(&mut self) {
        *self.accepting.write() = false;
        self.root.cancel();
    }
}
