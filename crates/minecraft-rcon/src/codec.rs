//! Source RCON wire framing.
//!
//! Packet layout, all integers little-endian:
//!
//! ```text
//! length (i32, excludes itself) | id (i32) | type (i32) | body | NUL NUL
//! ```
//!
//! Type 3 is login, 2 is a command, 0 a response. A login rejection is
//! signalled by a response whose id is −1 rather than by a distinct type.

use crate::error::{RconError, Result};

pub const TYPE_RESPONSE: i32 = 0;
pub const TYPE_COMMAND: i32 = 2;
pub const TYPE_LOGIN: i32 = 3;

/// Response id carried by a rejected login.
pub const AUTH_FAILED_ID: i32 = -1;

/// Largest frame we accept. The protocol caps bodies at 4096 bytes but
/// some server implementations run slightly over on long responses.
pub const MAX_FRAME: usize = 8192;

/// One decoded RCON packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

/// Encode a packet, length prefix included.
pub fn encode(id: i32, kind: i32, body: &str) -> Vec<u8> {
    let len = 4 + 4 + body.len() + 2;
    let mut buf = Vec::with_capacity(4 + len);
    buf.extend_from_slice(&(len as i32).to_le_bytes());
    buf.extend_from_slice(&id.to_le_bytes());
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(body.as_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf
}

/// Decode a frame payload: everything after the length prefix.
pub fn decode(payload: &[u8]) -> Result<Packet> {
    // id + type + the two trailing NULs is the minimum.
    if payload.len() < 10 {
        return Err(RconError::Protocol(format!(
            "frame too short: {} bytes",
            payload.len()
        )));
    }
    let id = i32::from_le_bytes(payload[0..4].try_into().expect("4 bytes"));
    let kind = i32::from_le_bytes(payload[4..8].try_into().expect("4 bytes"));
    let body = String::from_utf8_lossy(&payload[8..payload.len() - 2]).into_owned();
    Ok(Packet { id, kind, body })
}
