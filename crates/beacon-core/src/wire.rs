//! Fixed-size binary records exchanged over the beacon link
//!
//! All multi-byte fields are big-endian. Replies are always [`REPLY_LEN`]
//! bytes regardless of payload; unused trailing bytes are written as zero and
//! ignored on decode. Padding never leaves this module.
//!
//! | Request | Bytes 0-3   | Bytes 4-7 | Bytes 8-11 | Bytes 12-15 |
//! |---------|-------------|-----------|------------|-------------|
//! | `RBID`  | u32 id      | 0         | 0          | 0           |
//! | `RPOS`  | f32 x       | f32 y     | f32 yaw    | 0           |
//! | `OBSF`  | u32 (0/1)   | 0         | 0          | 0           |
//!
//! Broadcast datagrams carry `f32 x | f32 y | f32 yaw | u32 id` with no padding.

use crate::error::{WireError, WireResult};
use crate::state::{Pose, Snapshot};

/// Length of a request tag
pub const REQUEST_LEN: usize = 4;
/// Length of every reply record
pub const REPLY_LEN: usize = 16;
/// Length of a broadcast datagram
pub const BROADCAST_LEN: usize = 16;

/// Request tag constants
pub mod tag {
    pub const IDENTITY: [u8; 4] = *b"RBID";
    pub const POSITION: [u8; 4] = *b"RPOS";
    pub const OBSTACLE: [u8; 4] = *b"OBSF";
}

/// Query sent by a remote client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    Identity,
    Position,
    Obstacle,
}

impl Request {
    pub const ALL: [Request; 3] = [Request::Identity, Request::Position, Request::Obstacle];

    pub const fn tag(self) -> [u8; 4] {
        match self {
            Request::Identity => tag::IDENTITY,
            Request::Position => tag::POSITION,
            Request::Obstacle => tag::OBSTACLE,
        }
    }

    pub fn tag_str(self) -> &'static str {
        match self {
            Request::Identity => "RBID",
            Request::Position => "RPOS",
            Request::Obstacle => "OBSF",
        }
    }
}

impl std::str::FromStr for Request {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_request(s.trim().as_bytes())
    }
}

/// Decoded reply payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    Identity { id: u32 },
    Position(Pose),
    Obstacle { detected: bool },
}

impl Reply {
    /// Build the reply a request gets against a snapshot
    pub fn for_request(request: Request, snapshot: &Snapshot) -> Self {
        match request {
            Request::Identity => Reply::Identity { id: snapshot.id },
            Request::Position => Reply::Position(snapshot.position),
            Request::Obstacle => Reply::Obstacle {
                detected: snapshot.obstacle_detected,
            },
        }
    }

    pub fn encode(&self) -> [u8; REPLY_LEN] {
        match *self {
            Reply::Identity { id } => encode_identity_reply(id),
            Reply::Position(p) => encode_position_reply(p.x, p.y, p.yaw),
            Reply::Obstacle { detected } => encode_obstacle_reply(detected),
        }
    }

    /// Decode a reply record, using the request it answers to pick the layout
    pub fn decode(request: Request, bytes: &[u8]) -> WireResult<Self> {
        match request {
            Request::Identity => decode_identity_reply(bytes).map(|id| Reply::Identity { id }),
            Request::Position => decode_position_reply(bytes).map(Reply::Position),
            Request::Obstacle => {
                decode_obstacle_reply(bytes).map(|detected| Reply::Obstacle { detected })
            }
        }
    }
}

/// Position and identity announced on the broadcast channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadcastRecord {
    pub position: Pose,
    pub id: u32,
}

impl From<&Snapshot> for BroadcastRecord {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            position: snapshot.position,
            id: snapshot.id,
        }
    }
}

impl BroadcastRecord {
    pub fn encode(&self) -> [u8; BROADCAST_LEN] {
        encode_broadcast(self.position.x, self.position.y, self.position.yaw, self.id)
    }
}

// =============================================================================
// Encoding
// =============================================================================

pub fn encode_request(request: Request) -> [u8; REQUEST_LEN] {
    request.tag()
}

pub fn encode_identity_reply(id: u32) -> [u8; REPLY_LEN] {
    let mut buf = [0u8; REPLY_LEN];
    buf[0..4].copy_from_slice(&id.to_be_bytes());
    buf
}

pub fn encode_position_reply(x: f32, y: f32, yaw: f32) -> [u8; REPLY_LEN] {
    let mut buf = [0u8; REPLY_LEN];
    buf[0..4].copy_from_slice(&x.to_be_bytes());
    buf[4..8].copy_from_slice(&y.to_be_bytes());
    buf[8..12].copy_from_slice(&yaw.to_be_bytes());
    buf
}

pub fn encode_obstacle_reply(detected: bool) -> [u8; REPLY_LEN] {
    encode_identity_reply(u32::from(detected))
}

pub fn encode_broadcast(x: f32, y: f32, yaw: f32, id: u32) -> [u8; BROADCAST_LEN] {
    let mut buf = [0u8; BROADCAST_LEN];
    buf[0..4].copy_from_slice(&x.to_be_bytes());
    buf[4..8].copy_from_slice(&y.to_be_bytes());
    buf[8..12].copy_from_slice(&yaw.to_be_bytes());
    buf[12..16].copy_from_slice(&id.to_be_bytes());
    buf
}

// =============================================================================
// Decoding
// =============================================================================

pub fn decode_request(bytes: &[u8]) -> WireResult<Request> {
    let tag: [u8; REQUEST_LEN] = fixed(bytes)?;
    match tag {
        tag::IDENTITY => Ok(Request::Identity),
        tag::POSITION => Ok(Request::Position),
        tag::OBSTACLE => Ok(Request::Obstacle),
        other => Err(WireError::UnknownTag(other)),
    }
}

pub fn decode_identity_reply(bytes: &[u8]) -> WireResult<u32> {
    let rec: [u8; REPLY_LEN] = fixed(bytes)?;
    Ok(be_u32(&rec, 0))
}

pub fn decode_position_reply(bytes: &[u8]) -> WireResult<Pose> {
    let rec: [u8; REPLY_LEN] = fixed(bytes)?;
    Ok(Pose::new(be_f32(&rec, 0), be_f32(&rec, 4), be_f32(&rec, 8)))
}

/// Any non-zero integer decodes as `true`
pub fn decode_obstacle_reply(bytes: &[u8]) -> WireResult<bool> {
    decode_identity_reply(bytes).map(|v| v != 0)
}

pub fn decode_broadcast(bytes: &[u8]) -> WireResult<BroadcastRecord> {
    let rec: [u8; BROADCAST_LEN] = fixed(bytes)?;
    Ok(BroadcastRecord {
        position: Pose::new(be_f32(&rec, 0), be_f32(&rec, 4), be_f32(&rec, 8)),
        id: be_u32(&rec, 12),
    })
}

fn fixed<const N: usize>(bytes: &[u8]) -> WireResult<[u8; N]> {
    bytes.try_into().map_err(|_| WireError::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}

fn be_u32(rec: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        rec[offset],
        rec[offset + 1],
        rec[offset + 2],
        rec[offset + 3],
    ])
}

fn be_f32(rec: &[u8], offset: usize) -> f32 {
    f32::from_bits(be_u32(rec, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_reply_layout() {
        let expected: [u8; 16] = [0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(encode_identity_reply(7), expected);

        let sentinel = encode_identity_reply(0xFFFF);
        assert_eq!(&sentinel[0..4], &[0x00, 0x00, 0xFF, 0xFF]);
        assert!(sentinel[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_position_reply_layout() {
        let bytes = encode_position_reply(1.5, -2.25, 0.0);
        let expected: [u8; 16] = [
            0x3F, 0xC0, 0x00, 0x00, // 1.5
            0xC0, 0x10, 0x00, 0x00, // -2.25
            0x00, 0x00, 0x00, 0x00, // 0.0
            0x00, 0x00, 0x00, 0x00, // padding
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_obstacle_reply_layout() {
        let mut expected = [0u8; 16];
        assert_eq!(encode_obstacle_reply(false), expected);
        expected[3] = 1;
        assert_eq!(encode_obstacle_reply(true), expected);
    }

    #[test]
    fn test_broadcast_layout() {
        let bytes = encode_broadcast(1.5, -2.25, 0.0, 7);
        let expected: [u8; 16] = [
            0x3F, 0xC0, 0x00, 0x00, // 1.5
            0xC0, 0x10, 0x00, 0x00, // -2.25
            0x00, 0x00, 0x00, 0x00, // 0.0
            0x00, 0x00, 0x00, 0x07, // id
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_every_reply_is_sixteen_bytes() {
        let snapshot = Snapshot {
            id: 0xDEAD_BEEF,
            position: Pose::new(f32::MAX, f32::MIN, -3.0),
            obstacle_detected: true,
        };
        for request in Request::ALL {
            let bytes = Reply::for_request(request, &snapshot).encode();
            assert_eq!(bytes.len(), REPLY_LEN);
        }
    }

    #[test]
    fn test_decode_known_tags() {
        assert_eq!(decode_request(b"RBID"), Ok(Request::Identity));
        assert_eq!(decode_request(b"RPOS"), Ok(Request::Position));
        assert_eq!(decode_request(b"OBSF"), Ok(Request::Obstacle));
        for request in Request::ALL {
            assert_eq!(decode_request(&encode_request(request)), Ok(request));
        }
    }

    #[test]
    fn test_decode_unknown_tags() {
        for bad in [b"XXXX", b"rbid", b"RBI\0", b"\0\0\0\x01", b"RPOs"] {
            assert_eq!(decode_request(bad), Err(WireError::UnknownTag(*bad)));
        }
    }

    #[test]
    fn test_decode_wrong_length() {
        assert_eq!(
            decode_request(b"RBI"),
            Err(WireError::InvalidLength {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            decode_request(b"RBIDX"),
            Err(WireError::InvalidLength {
                expected: 4,
                actual: 5
            })
        );
        assert!(decode_broadcast(&[0u8; 15]).is_err());
        assert!(decode_identity_reply(&[0u8; 17]).is_err());
    }

    #[test]
    fn test_request_from_str() {
        assert_eq!("RPOS".parse::<Request>(), Ok(Request::Position));
        assert_eq!(" OBSF\n".parse::<Request>(), Ok(Request::Obstacle));
        assert!("POS".parse::<Request>().is_err());
    }

    #[test]
    fn test_decoders_ignore_padding() {
        let mut bytes = encode_identity_reply(7);
        bytes[4..].fill(0xAA);
        assert_eq!(decode_identity_reply(&bytes), Ok(7));

        let mut bytes = encode_position_reply(1.5, -2.25, 0.0);
        bytes[12..].fill(0xFF);
        assert_eq!(
            decode_position_reply(&bytes),
            Ok(Pose::new(1.5, -2.25, 0.0))
        );

        let mut bytes = encode_obstacle_reply(true);
        bytes[4..].fill(0x55);
        assert_eq!(decode_obstacle_reply(&bytes), Ok(true));
    }

    #[test]
    fn test_reply_decode_matches_request() {
        let snapshot = Snapshot {
            id: 12,
            position: Pose::new(0.5, 0.25, -1.0),
            obstacle_detected: true,
        };
        for request in Request::ALL {
            let reply = Reply::for_request(request, &snapshot);
            assert_eq!(Reply::decode(request, &reply.encode()), Ok(reply));
        }
    }

    #[test]
    fn test_broadcast_record_from_snapshot() {
        let snapshot = Snapshot {
            id: 3,
            position: Pose::new(10.0, -4.5, 1.25),
            obstacle_detected: true,
        };
        let record = BroadcastRecord::from(&snapshot);
        assert_eq!(decode_broadcast(&record.encode()), Ok(record));
    }
}
