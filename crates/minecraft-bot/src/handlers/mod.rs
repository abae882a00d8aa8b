//! Serenity event handler implementation

use serenity::async_trait;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::*;
use tracing::{error, info};

use crate::engine::Engine;
use crate::health::AppState;

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Whitelist bot connected as {}", ready.user.name);
        let data = ctx.data.read().await;
        if let Some(state) = data.get::<AppState>() {
            state.set_bot_username(ready.user.name.clone()).await;
        }
    }

    /// A member leaving the guild loses whitelist access through us.
    /// Reconciliation failures are logged, never propagated into the
    /// gateway loop; the removal intent is already durable either way.
    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        _member: Option<Member>,
    ) {
        let engine = {
            let data = ctx.data.read().await;
            match data.get::<Engine>() {
                Some(engine) => engine.clone(),
                None => {
                    error!("ReconciliationEngine not found in context data");
                    return;
                }
            }
        };

        if let Err(e) = engine
            .handle_member_departure(guild_id.get(), user.id.get())
            .await
        {
            error!(
                "Failed to reconcile departure of {} from {}: {}",
                user.id, guild_id, e
            );
        }
    }
}
