//! File-backed whitelist store with a read-through cache.
//!
//! Each guild's document is cached in memory behind its own mutex, so a
//! read-modify-write for one guild is serialized while different guilds
//! proceed independently. Every mutation persists atomically (write to a
//! sibling temp file, then rename over the target) before the guild lock
//! is released.

#[path = "store_tests.rs"]
mod store_tests;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use minecraft_types::{PlayerEntry, ServerEndpoint};

use crate::document::GuildDocument;
use crate::error::{Result, StoreError};

/// Durable per-guild roster, endpoint and pending-removal queue.
pub struct WhitelistStore {
    data_dir: PathBuf,
    guilds: RwLock<HashMap<u64, Arc<Mutex<GuildDocument>>>>,
}

impl WhitelistStore {
    /// Open (and create if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| StoreError::io("create", &data_dir, e))?;
        Ok(Self {
            data_dir,
            guilds: RwLock::new(HashMap::new()),
        })
    }

    /// Look up the account whitelisted for a member, if any.
    pub async fn member(&self, guild_id: u64, member_id: u64) -> Result<Option<PlayerEntry>> {
        let handle = self.guild(guild_id).await?;
        let doc = handle.lock().await;
        Ok(doc.players.get(&member_id.to_string()).cloned())
    }

    /// Upsert a member's roster entry.
    pub async fn put_member(
        &self,
        guild_id: u64,
        member_id: u64,
        player: PlayerEntry,
    ) -> Result<()> {
        let handle = self.guild(guild_id).await?;
        let mut doc = handle.lock().await;
        doc.players.insert(member_id.to_string(), player);
        self.persist(guild_id, &doc).await
    }

    /// Delete a member's roster entry, returning it. `None` means the
    /// member was never registered; nothing is written in that case.
    pub async fn remove_member(
        &self,
        guild_id: u64,
        member_id: u64,
    ) -> Result<Option<PlayerEntry>> {
        let handle = self.guild(guild_id).await?;
        let mut doc = handle.lock().await;
        let removed = doc.players.remove(&member_id.to_string());
        if removed.is_some() {
            self.persist(guild_id, &doc).await?;
        }
        Ok(removed)
    }

    /// The full roster, in member-id order.
    pub async fn members(&self, guild_id: u64) -> Result<Vec<(u64, PlayerEntry)>> {
        let handle = self.guild(guild_id).await?;
        let doc = handle.lock().await;
        Ok(doc
            .players
            .iter()
            .filter_map(|(id, player)| id.parse().ok().map(|id| (id, player.clone())))
            .collect())
    }

    /// Append a removal intent unless one for the same account name is
    /// already queued (set semantics on the name).
    pub async fn enqueue_removal(&self, guild_id: u64, player: PlayerEntry) -> Result<()> {
        let handle = self.guild(guild_id).await?;
        let mut doc = handle.lock().await;
        if doc.players_to_delete.iter().any(|p| p.name == player.name) {
            debug!(guild_id, name = %player.name, "removal already queued");
            return Ok(());
        }
        doc.players_to_delete.push(player);
        self.persist(guild_id, &doc).await
    }

    /// Drop a specific account name from the pending-removal queue.
    pub async fn dequeue_removal(&self, guild_id: u64, name: &str) -> Result<()> {
        let handle = self.guild(guild_id).await?;
        let mut doc = handle.lock().await;
        let before = doc.players_to_delete.len();
        doc.players_to_delete.retain(|p| p.name != name);
        if doc.players_to_delete.len() == before {
            return Ok(());
        }
        self.persist(guild_id, &doc).await
    }

    /// Pending removals in insertion order. The sweep depends on this
    /// ordering.
    pub async fn pending_removals(&self, guild_id: u64) -> Result<Vec<PlayerEntry>> {
        let handle = self.guild(guild_id).await?;
        let doc = handle.lock().await;
        Ok(doc.players_to_delete.clone())
    }

    /// The guild's server endpoint; defaults apply until `set_endpoint`
    /// is called.
    pub async fn endpoint(&self, guild_id: u64) -> Result<ServerEndpoint> {
        let handle = self.guild(guild_id).await?;
        let doc = handle.lock().await;
        Ok(doc.endpoint.clone())
    }

    /// Replace the guild's server endpoint.
    pub async fn set_endpoint(&self, guild_id: u64, endpoint: ServerEndpoint) -> Result<()> {
        let handle = self.guild(guild_id).await?;
        let mut doc = handle.lock().await;
        doc.endpoint = endpoint;
        self.persist(guild_id, &doc).await
    }

    /// Guild ids with persisted state on disk.
    pub async fn known_guilds(&self) -> Result<Vec<u64>> {
        let mut entries = tokio::fs::read_dir(&self.data_dir)
            .await
            .map_err(|e| StoreError::io("list", &self.data_dir, e))?;
        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io("list", &self.data_dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse().ok())
                {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Erase a user's roster entries in every guild (data-deletion
    /// request). Pending removals are left alone: they carry no member
    /// identity, only an account name already slated for revocation.
    pub async fn forget_user(&self, member_id: u64) -> Result<()> {
        for guild_id in self.known_guilds().await? {
            if self.remove_member(guild_id, member_id).await?.is_some() {
                info!(guild_id, member_id, "erased roster entry on user request");
            }
        }
        Ok(())
    }

    fn path_for(&self, guild_id: u64) -> PathBuf {
        self.data_dir.join(format!("{}.json", guild_id))
    }

    /// Fetch the cached document handle for a guild, loading it from disk
    /// on first touch.
    async fn guild(&self, guild_id: u64) -> Result<Arc<Mutex<GuildDocument>>> {
        if let Some(handle) = self.guilds.read().await.get(&guild_id) {
            return Ok(handle.clone());
        }
        let loaded = load(&self.path_for(guild_id)).await?;
        let mut map = self.guilds.write().await;
        // Another task may have loaded the same guild while we read the
        // file; keep whichever handle won.
        Ok(map
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(loaded)))
            .clone())
    }

    /// Atomic replace: serialize next to the target, then rename over it.
    async fn persist(&self, guild_id: u64, doc: &GuildDocument) -> Result<()> {
        let path = self.path_for(guild_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(doc).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            source: e,
        })?;
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::io("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::io("rename", &tmp, e))?;
        Ok(())
    }
}

async fn load(path: &Path) -> Result<GuildDocument> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(GuildDocument::default()),
        Err(e) => Err(StoreError::io("read", path, e)),
    }
}
