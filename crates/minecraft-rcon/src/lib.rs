//! One-shot RCON transport for the whitelist reconciliation engine
//!
//! Exposes the remote-command contract (`RconExecutor`), a real TCP
//! client speaking the Source RCON framing, a closed failure
//! classification, and an in-memory mock for tests.

pub mod client;
pub mod codec;
pub mod error;
pub mod mock;

pub use client::{RconClient, RconExecutor, DEFAULT_DEADLINE};
pub use error::{RconError, RconFailureKind, Result};
pub use mock::MockRcon;
