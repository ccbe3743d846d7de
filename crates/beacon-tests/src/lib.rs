//! End-to-end tests for the racecar beacon
//!
//! Every test starts a real [`BridgeRuntime`](beacon_bridge::BridgeRuntime)
//! on loopback. The request server binds an ephemeral port and the broadcast
//! is aimed at a [`VehicleTracker`](beacon_client::VehicleTracker) bound to
//! `127.0.0.1:0`, so no privileges or network setup are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p beacon-tests
//! ```
//!
//! Timing tests are marked `#[serial]` and sample many broadcast ticks, so
//! they take a couple of seconds each.
//!
//! # Test Structure
//!
//! - `request_channel_test.rs` - identity/position/obstacle replies, bad tags,
//!   reconnects
//! - `broadcast_channel_test.rs` - broadcast contents and tick grid
//! - `lifecycle_test.rs` - config files, startup failures, shutdown

// This crate only contains tests, no library code
