//! Shared types for the Minecraft whitelist reconciliation bot

pub mod commands;
pub mod types;
pub mod username;

pub use types::{PlayerEntry, RosterEntry, ServerEndpoint};
pub use username::valid_account_name;
