//! Persisted per-guild document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use minecraft_types::{PlayerEntry, ServerEndpoint};

/// The full persisted state of one guild.
///
/// `players` maps the Discord member id (stringified, as ids are JSON map
/// keys) to the whitelisted account. `players_to_delete` is the durable
/// pending-removal queue in insertion order; it must survive restarts so
/// the sweep can resume. The endpoint fields are flattened at the top
/// level so the document keeps the shape existing deployments already
/// have on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildDocument {
    #[serde(default)]
    pub players: BTreeMap<String, PlayerEntry>,
    #[serde(flatten)]
    pub endpoint: ServerEndpoint,
    #[serde(default)]
    pub players_to_delete: Vec<PlayerEntry>,
}
