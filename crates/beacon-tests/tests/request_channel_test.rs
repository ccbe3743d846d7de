//! Request/response channel tests
//!
//! Run with: cargo test -p beacon-tests --test request_channel_test

mod common;

use std::time::Duration;

use beacon_client::{ClientError, RemoteClient};
use beacon_core::{Pose, Request};
use common::{raw_request, stays_silent, Fixture};
use pretty_assertions::assert_eq;
use tokio_test::assert_ok;

const PERIOD: Duration = Duration::from_millis(200);
const SILENCE: Duration = Duration::from_millis(300);

// =============================================================================
// Reply layout
// =============================================================================

#[tokio::test]
async fn test_identity_reply_bytes() {
    let fixture = Fixture::start(0xFFFF, PERIOD).await;
    fixture.bridge.updates().set_identity(7);

    let mut stream = fixture.connect().await;
    let reply = raw_request(&mut stream, b"RBID").await;
    assert_eq!(reply, [0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    assert_ok!(fixture.bridge.shutdown().await);
}

#[tokio::test]
async fn test_position_reply_bytes() {
    let fixture = Fixture::start(1, PERIOD).await;
    fixture.bridge.updates().set_position(1.5, -2.25, 0.0);

    let mut stream = fixture.connect().await;
    let reply = raw_request(&mut stream, b"RPOS").await;

    let mut expected = [0u8; 16];
    expected[0..4].copy_from_slice(&1.5f32.to_be_bytes());
    expected[4..8].copy_from_slice(&(-2.25f32).to_be_bytes());
    expected[8..12].copy_from_slice(&0.0f32.to_be_bytes());
    assert_eq!(reply, expected);
    assert_eq!(&reply[0..4], &[0x3F, 0xC0, 0x00, 0x00]);
    assert_eq!(&reply[4..8], &[0xC0, 0x10, 0x00, 0x00]);

    assert_ok!(fixture.bridge.shutdown().await);
}

#[tokio::test]
async fn test_obstacle_reply_follows_updates() {
    let fixture = Fixture::start(1, PERIOD).await;
    let updates = fixture.bridge.updates();
    let mut stream = fixture.connect().await;

    updates.set_obstacle(true);
    let reply = raw_request(&mut stream, b"OBSF").await;
    assert_eq!(reply, [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    updates.set_obstacle(false);
    let reply = raw_request(&mut stream, b"OBSF").await;
    assert_eq!(reply, [0u8; 16]);

    assert_ok!(fixture.bridge.shutdown().await);
}

#[tokio::test]
async fn test_initial_state_before_any_update() {
    let fixture = Fixture::start(0xFFFF, PERIOD).await;
    let mut client = RemoteClient::connect(fixture.bridge.request_addr())
        .await
        .unwrap();

    assert_eq!(client.identity().await.unwrap(), 0xFFFF);
    assert_eq!(client.position().await.unwrap(), Pose::default());
    assert!(!client.obstacle().await.unwrap());

    client.close().await.unwrap();
    assert_ok!(fixture.bridge.shutdown().await);
}

// =============================================================================
// Bad requests
// =============================================================================

#[tokio::test]
async fn test_unknown_tag_gets_no_reply() {
    let fixture = Fixture::start(7, PERIOD).await;
    let mut client = RemoteClient::connect(fixture.bridge.request_addr())
        .await
        .unwrap();

    client.send_tag(*b"XXXX").await.unwrap();
    // The connection stays usable and the next reply is not shifted
    assert_eq!(client.identity().await.unwrap(), 7);

    let stats = assert_ok!(fixture.bridge.shutdown().await);
    assert_eq!(stats.requests_rejected, 1);
    assert_eq!(stats.requests_served, 1);
}

#[tokio::test]
async fn test_unknown_tag_is_silent() {
    let fixture = Fixture::start(7, PERIOD).await;
    let mut stream = fixture.connect().await;

    tokio::io::AsyncWriteExt::write_all(&mut stream, b"rbid").await.unwrap();
    assert!(stays_silent(&mut stream, SILENCE).await);

    let reply = raw_request(&mut stream, b"RBID").await;
    assert_eq!(&reply[..4], &[0, 0, 0, 7]);

    assert_ok!(fixture.bridge.shutdown().await);
}

#[tokio::test]
async fn test_every_tag_over_one_connection() {
    let fixture = Fixture::start(3, PERIOD).await;
    fixture.bridge.updates().set_position(0.5, 0.25, -1.0);
    let mut client = RemoteClient::connect(fixture.bridge.request_addr())
        .await
        .unwrap();

    for request in Request::ALL {
        // Each reply decodes with the layout of the request that asked for it
        assert_ok!(client.request(request).await);
    }
    assert_eq!(client.position().await.unwrap(), Pose::new(0.5, 0.25, -1.0));

    client.close().await.unwrap();
    let stats = assert_ok!(fixture.bridge.shutdown().await);
    assert_eq!(stats.requests_served, 4);
}

// =============================================================================
// Connection lifecycle
// =============================================================================

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let fixture = Fixture::start(5, PERIOD).await;
    let addr = fixture.bridge.request_addr();

    let mut first = RemoteClient::connect(addr).await.unwrap();
    assert_eq!(first.identity().await.unwrap(), 5);
    first.close().await.unwrap();

    let mut second = RemoteClient::connect(addr).await.unwrap();
    assert_eq!(second.identity().await.unwrap(), 5);
    second.close().await.unwrap();

    let stats = assert_ok!(fixture.bridge.shutdown().await);
    assert_eq!(stats.connections, 2);
}

#[tokio::test]
async fn test_second_client_waits_for_first() {
    let fixture = Fixture::start(9, PERIOD).await;

    let mut first = fixture.connect().await;
    assert_eq!(&raw_request(&mut first, b"RBID").await[..4], &[0, 0, 0, 9]);

    // Queued in the backlog: connected, but not served yet
    let mut second = fixture.connect().await;
    tokio::io::AsyncWriteExt::write_all(&mut second, b"RBID").await.unwrap();
    assert!(stays_silent(&mut second, SILENCE).await);

    drop(first);

    let mut reply = [0u8; 16];
    tokio::time::timeout(
        Duration::from_secs(2),
        tokio::io::AsyncReadExt::read_exact(&mut second, &mut reply),
    )
    .await
    .expect("queued client never served")
    .unwrap();
    assert_eq!(&reply[..4], &[0, 0, 0, 9]);

    assert_ok!(fixture.bridge.shutdown().await);
}

#[tokio::test]
async fn test_shutdown_closes_client_connection() {
    let fixture = Fixture::start(1, PERIOD).await;
    let mut client = RemoteClient::connect(fixture.bridge.request_addr())
        .await
        .unwrap();
    assert_eq!(client.identity().await.unwrap(), 1);

    assert_ok!(fixture.bridge.shutdown().await);

    let err = client.identity().await.unwrap_err();
    assert!(
        matches!(err, ClientError::ConnectionClosed | ClientError::Io(_)),
        "got {:?}",
        err
    );
}
