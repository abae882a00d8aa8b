//! Durable per-guild whitelist state
//!
//! One JSON document per guild holding the member→account roster, the
//! server endpoint, and the pending-removal queue. The store owns no
//! reconciliation behavior, only storage and atomic replace.

mod document;
pub mod error;
mod store;

pub use document::GuildDocument;
pub use error::{Result, StoreError};
pub use store::WhitelistStore;
