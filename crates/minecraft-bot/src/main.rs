//! Minecraft Whitelist Bot
//!
//! Keeps a per-guild roster of Discord-member → Minecraft-account
//! mappings in sync with each guild's game server whitelist over RCON,
//! and revokes access automatically when a member leaves the guild.
//! Removals the server couldn't be told about are queued durably and
//! retried whenever a later action proves the server reachable.

mod config;
mod engine;
mod errors;
mod handlers;
mod health;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use minecraft_rcon::RconClient;
use minecraft_store::WhitelistStore;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, SystemEnv};
use crate::engine::{Engine, ReconciliationEngine};
use crate::handlers::Handler;
use crate::health::AppState;

/// Minecraft Whitelist Bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/minecraft-bot.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Directory for persisted per-guild whitelist state (overrides config file)
    #[arg(long, env = "WHITELIST_DATA_DIR")]
    data_dir: Option<String>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "minecraft_bot=debug,minecraft_store=debug,minecraft_rcon=debug,info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Minecraft whitelist bot");

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env(&SystemEnv)?
    };
    if let Some(bot_token) = args.bot_token {
        config.discord.bot_token = bot_token;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }

    info!("Whitelist state directory: {}", config.storage.data_dir);

    // Open the store and build the engine
    let store = Arc::new(WhitelistStore::open(&config.storage.data_dir)?);
    let rcon = RconClient::new(Duration::from_secs(config.rcon.timeout_secs));
    let engine = Arc::new(ReconciliationEngine::new(store.clone(), rcon));

    // Build serenity client; member events are the whole point here.
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    // Set up health check state before inserting into client data
    let health_state = AppState::new(store);

    // Insert engine and health state into client data
    {
        let mut data = client.data.write().await;
        data.insert::<Engine>(engine);
        data.insert::<AppState>(health_state.clone());
    }

    // Start health check server
    let health_state_clone = health_state.clone();
    let health_port = args.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state_clone, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    // Start the Discord client (blocks until all shards are stopped)
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Whitelist bot stopped");
    Ok(())
}
