//! Engine-facing error taxonomy.
//!
//! Every failure the reconciliation engine can produce is a classified
//! value; nothing here is fatal to the process. Remote failures arrive
//! pre-classified from the RCON layer, state-precondition violations and
//! validation failures are produced locally.

use minecraft_rcon::{RconError, RconFailureKind};
use minecraft_store::StoreError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, WhitelistError>;

/// Error types for reconciliation operations
#[derive(Debug, Error)]
pub enum WhitelistError {
    /// The member already holds an entry; they must remove it first.
    #[error("already whitelisted as {name}; remove that account first")]
    AlreadyWhitelisted { name: String },

    /// The member holds no entry to remove.
    #[error("not registered to the Minecraft server through this bot")]
    NotWhitelisted,

    /// The account name failed local syntax validation.
    #[error("invalid account name: {name}")]
    InvalidAccountName { name: String },

    /// A remote command failed where the operation is all-or-nothing.
    #[error(transparent)]
    Remote(#[from] RconError),

    /// The persisted guild state could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WhitelistError {
    /// The remote failure classification, if this is a remote failure.
    pub fn remote_kind(&self) -> Option<RconFailureKind> {
        match self {
            WhitelistError::Remote(err) => Some(err.kind()),
            _ => None,
        }
    }
}
