//! Shared fixture for the end-to-end tests

#![allow(dead_code)]

use std::time::Duration;

use beacon_bridge::{BridgeConfig, BridgeRuntime};
use beacon_client::VehicleTracker;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A running bridge with a tracker receiving its broadcast
pub struct Fixture {
    pub bridge: BridgeRuntime,
    pub tracker: VehicleTracker,
}

/// Loopback config broadcasting to `tracker`
pub fn loopback_config(tracker: &VehicleTracker, id: u32, period: Duration) -> BridgeConfig {
    let target = tracker.local_addr().unwrap();
    let mut config = BridgeConfig::default();
    config.vehicle.id = id;
    config.request.host = "127.0.0.1".to_string();
    config.request.port = 0;
    config.broadcast.address = target.ip().to_string();
    config.broadcast.port = target.port();
    config.broadcast.period_ms = period.as_millis() as u64;
    config
}

impl Fixture {
    pub async fn start(id: u32, period: Duration) -> Self {
        let tracker = VehicleTracker::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let config = loopback_config(&tracker, id, period);
        let bridge = BridgeRuntime::start(&config).await.unwrap();
        Self { bridge, tracker }
    }

    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.bridge.request_addr()).await.unwrap()
    }
}

/// Send a raw tag and read exactly one reply record
pub async fn raw_request(stream: &mut TcpStream, tag: &[u8; 4]) -> [u8; 16] {
    stream.write_all(tag).await.unwrap();
    let mut reply = [0u8; 16];
    tokio::time::timeout(Duration::from_secs(2), stream.read_exact(&mut reply))
        .await
        .expect("reply timed out")
        .unwrap();
    reply
}

/// True if nothing arrives on `stream` within `wait`
pub async fn stays_silent(stream: &mut TcpStream, wait: Duration) -> bool {
    let mut byte = [0u8; 1];
    tokio::time::timeout(wait, stream.read(&mut byte)).await.is_err()
}
