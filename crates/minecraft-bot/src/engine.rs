//! Whitelist reconciliation engine.
//!
//! Keeps the locally persisted roster and the remote server's whitelist
//! convergent under partial failure. Local roster state is authoritative
//! for intent: a member's entry is deleted the moment removal is
//! requested, whether or not the server could be told. Removals whose
//! remote command failed go into a durable queue and are retried in FIFO
//! order whenever a later action proves the server reachable. There is
//! no background scheduler; retry work piggybacks on interactive
//! actions, so an idle bot holds no connections.

#[path = "engine_tests.rs"]
mod engine_tests;

use std::collections::HashMap;
use std::sync::Arc;

use serenity::prelude::TypeMapKey;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use minecraft_rcon::{RconClient, RconExecutor, RconFailureKind};
use minecraft_store::WhitelistStore;
use minecraft_types::{commands, valid_account_name, PlayerEntry, RosterEntry, ServerEndpoint};

use crate::errors::{Result, WhitelistError};

/// What happened to the remote side of a removal.
#[derive(Debug, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The server confirmed the removal.
    Confirmed(String),
    /// The remove command failed; the name is queued for a later sweep.
    /// From the member's perspective the removal still succeeded, since
    /// access intent is revoked either way.
    Deferred(RconFailureKind),
}

/// Outcome of a member-initiated removal.
#[derive(Debug)]
pub struct RemoveOutcome {
    pub player: PlayerEntry,
    pub remote: RemoteStatus,
}

/// Result of one pending-removal sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Account names confirmed removed this pass, in queue order.
    pub removed: Vec<String>,
    /// The entry the sweep halted on, if any, with its failure kind.
    pub halted_on: Option<(String, RconFailureKind)>,
    /// Whether the post-drain `whitelist reload` went through.
    pub reloaded: bool,
}

/// Orchestrates add/remove intents against the store and the RCON
/// executor. Generic over the executor so tests inject `MockRcon`.
pub struct ReconciliationEngine<R: RconExecutor> {
    store: Arc<WhitelistStore>,
    rcon: R,
    /// One lock per guild: reconciliation operations for the same guild
    /// never interleave; different guilds proceed independently.
    guild_ops: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

/// Concrete engine type the bot runs with.
pub type Engine = ReconciliationEngine<RconClient>;

impl TypeMapKey for Engine {
    type Value = Arc<Engine>;
}

impl<R: RconExecutor> ReconciliationEngine<R> {
    pub fn new(store: Arc<WhitelistStore>, rcon: R) -> Self {
        Self {
            store,
            rcon,
            guild_ops: Mutex::new(HashMap::new()),
        }
    }

    /// Whitelist `name` for a member. All-or-nothing: a remote failure
    /// leaves no local state behind, so the caller can simply retry.
    pub async fn add_member(&self, guild_id: u64, member_id: u64, name: &str) -> Result<String> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.member(guild_id, member_id).await? {
            return Err(WhitelistError::AlreadyWhitelisted {
                name: existing.name,
            });
        }
        if !valid_account_name(name) {
            return Err(WhitelistError::InvalidAccountName {
                name: name.to_string(),
            });
        }

        let endpoint = self.store.endpoint(guild_id).await?;
        let response = self.rcon.execute(&endpoint, &commands::add(name)).await?;

        // The server just answered us: a good moment to retry queued
        // removals before committing the new entry.
        self.sweep_guild(guild_id, &endpoint).await?;

        self.store
            .put_member(guild_id, member_id, PlayerEntry::new(name))
            .await?;
        info!(guild_id, member_id, name, "whitelisted member");
        Ok(response)
    }

    /// Member-initiated removal. Local intent is committed
    /// unconditionally; if the server cannot be told right now the
    /// divergence is queued and reported as `RemoteStatus::Deferred`.
    pub async fn remove_member(&self, guild_id: u64, member_id: u64) -> Result<RemoveOutcome> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;

        let Some(player) = self.store.remove_member(guild_id, member_id).await? else {
            return Err(WhitelistError::NotWhitelisted);
        };

        let endpoint = self.store.endpoint(guild_id).await?;
        match self
            .rcon
            .execute(&endpoint, &commands::remove(&player.name))
            .await
        {
            Ok(response) => {
                info!(guild_id, member_id, name = %player.name, "member left the whitelist");
                self.sweep_guild(guild_id, &endpoint).await?;
                Ok(RemoveOutcome {
                    player,
                    remote: RemoteStatus::Confirmed(response),
                })
            }
            Err(err) => {
                let kind = err.kind();
                warn!(
                    guild_id,
                    name = %player.name,
                    %err,
                    "remote removal failed; queued for retry"
                );
                self.store.enqueue_removal(guild_id, player.clone()).await?;
                Ok(RemoveOutcome {
                    player,
                    remote: RemoteStatus::Deferred(kind),
                })
            }
        }
    }

    /// Membership-loss path: the member left the guild, so their access
    /// intent is gone. Same local-first removal as `remove_member`, but
    /// with nobody to report to and no opportunistic sweep. Failures
    /// surface only through the log and the retained queue entry.
    pub async fn handle_member_departure(&self, guild_id: u64, member_id: u64) -> Result<()> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;

        let Some(player) = self.store.remove_member(guild_id, member_id).await? else {
            return Ok(()); // never registered through us
        };

        let endpoint = self.store.endpoint(guild_id).await?;
        match self
            .rcon
            .execute(&endpoint, &commands::remove(&player.name))
            .await
        {
            Ok(_) => {
                info!(guild_id, member_id, name = %player.name, "removed departed member");
            }
            Err(err) => {
                warn!(
                    guild_id,
                    member_id,
                    name = %player.name,
                    %err,
                    "couldn't remove departed member; queued for retry"
                );
                self.store.enqueue_removal(guild_id, player).await?;
            }
        }
        Ok(())
    }

    /// Operator add: not tied to a member, no roster entry, never
    /// auto-removed on departure. Failures are returned, never queued.
    pub async fn admin_add(&self, guild_id: u64, name: &str) -> Result<String> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;

        if !valid_account_name(name) {
            return Err(WhitelistError::InvalidAccountName {
                name: name.to_string(),
            });
        }
        let endpoint = self.store.endpoint(guild_id).await?;
        let response = self.rcon.execute(&endpoint, &commands::add(name)).await?;
        info!(guild_id, name, "operator whitelisted account");
        self.sweep_guild(guild_id, &endpoint).await?;
        Ok(response)
    }

    /// Operator remove by account name. Like `admin_add`, all-or-nothing.
    pub async fn admin_remove(&self, guild_id: u64, name: &str) -> Result<String> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;

        if !valid_account_name(name) {
            return Err(WhitelistError::InvalidAccountName {
                name: name.to_string(),
            });
        }
        let endpoint = self.store.endpoint(guild_id).await?;
        let response = self
            .rcon
            .execute(&endpoint, &commands::remove(name))
            .await?;
        info!(guild_id, name, "operator removed account");
        self.sweep_guild(guild_id, &endpoint).await?;
        Ok(response)
    }

    /// Retry queued removals now, without piggybacking on another action.
    pub async fn sweep_orphans(&self, guild_id: u64) -> Result<SweepOutcome> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;
        let endpoint = self.store.endpoint(guild_id).await?;
        self.sweep_guild(guild_id, &endpoint).await
    }

    /// Fetch the server's own whitelist. A successful round trip doubles
    /// as proof the server is reachable, so it triggers a sweep too.
    pub async fn remote_whitelist(&self, guild_id: u64) -> Result<String> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;

        let endpoint = self.store.endpoint(guild_id).await?;
        let response = self.rcon.execute(&endpoint, commands::list()).await?;
        self.sweep_guild(guild_id, &endpoint).await?;
        Ok(response)
    }

    /// Persist a guild's server endpoint, then probe it with a harmless
    /// command so a bad password is reported now rather than on the
    /// first member action.
    pub async fn configure_server(
        &self,
        guild_id: u64,
        endpoint: ServerEndpoint,
    ) -> Result<String> {
        let lock = self.op_lock(guild_id).await;
        let _guard = lock.lock().await;

        self.store.set_endpoint(guild_id, endpoint.clone()).await?;
        let response = self.rcon.execute(&endpoint, "help").await?;
        info!(guild_id, host = %endpoint.host, "server endpoint configured");
        Ok(response)
    }

    /// Local roster view for display surfaces.
    pub async fn roster(&self, guild_id: u64) -> Result<Vec<RosterEntry>> {
        Ok(self
            .store
            .members(guild_id)
            .await?
            .into_iter()
            .map(|(member_id, player)| RosterEntry {
                guild_id,
                member_id,
                player,
            })
            .collect())
    }

    /// Process pending removals strictly in insertion order, dequeueing
    /// each on success and halting at the first failure. Halting leaves
    /// that entry and everything behind it untouched, and no reload is
    /// issued over an unconfirmed removal, at the cost of a stuck head
    /// starving later entries until it clears. A full drain of a
    /// non-empty queue issues exactly one batched `whitelist reload`;
    /// an empty queue sends nothing at all.
    async fn sweep_guild(&self, guild_id: u64, endpoint: &ServerEndpoint) -> Result<SweepOutcome> {
        let pending = self.store.pending_removals(guild_id).await?;
        if pending.is_empty() {
            return Ok(SweepOutcome::default());
        }

        let mut outcome = SweepOutcome::default();
        for player in pending {
            match self
                .rcon
                .execute(endpoint, &commands::remove(&player.name))
                .await
            {
                Ok(_) => {
                    self.store.dequeue_removal(guild_id, &player.name).await?;
                    debug!(guild_id, name = %player.name, "cleared queued removal");
                    outcome.removed.push(player.name);
                }
                Err(err) => {
                    warn!(guild_id, name = %player.name, %err, "sweep halted");
                    outcome.halted_on = Some((player.name.clone(), err.kind()));
                    return Ok(outcome);
                }
            }
        }

        match self.rcon.execute(endpoint, commands::reload()).await {
            Ok(_) => outcome.reloaded = true,
            Err(err) => {
                // The queue is already drained; the reload is best-effort.
                warn!(guild_id, %err, "whitelist reload failed after drain");
            }
        }
        Ok(outcome)
    }

    async fn op_lock(&self, guild_id: u64) -> Arc<Mutex<()>> {
        let mut map = self.guild_ops.lock().await;
        map.entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
