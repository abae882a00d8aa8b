//! Core whitelist domain types

use serde::{Deserialize, Serialize};

/// A Minecraft account bound to a guild member.
///
/// Both the roster map value and the pending-removal queue element in the
/// persisted per-guild document. Kept as a struct rather than a bare
/// string because the persisted format reserves room for per-player
/// fields beyond the name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntry {
    pub name: String,
}

impl PlayerEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A roster lookup result: which member holds which account, and where.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntry {
    pub guild_id: u64,
    pub member_id: u64,
    pub player: PlayerEntry,
}

/// Per-guild Minecraft server coordinates.
///
/// `port` is the game port, carried for completeness of the persisted
/// format; the RCON client only consumes `host`, `rcon_port` and
/// `password`. The reconciliation engine treats this as read-only
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerEndpoint {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_rcon_port")]
    pub rcon_port: u16,
    #[serde(default)]
    pub password: String,
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rcon_port: default_rcon_port(),
            password: String::new(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    25565
}

fn default_rcon_port() -> u16 {
    25575
}
