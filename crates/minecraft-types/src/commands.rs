//! Console command strings for whitelist administration
//!
//! The server console speaks a single-line text protocol; one builder per
//! administrative action so command spelling lives in exactly one place.
//!
//! Commands:
//! - `whitelist add <name>`
//! - `whitelist remove <name>`
//! - `whitelist reload`
//! - `whitelist list`

/// Grant `name` access.
pub fn add(name: &str) -> String {
    format!("whitelist add {}", name)
}

/// Revoke access for `name`.
pub fn remove(name: &str) -> String {
    format!("whitelist remove {}", name)
}

/// Make the server re-read its whitelist file into active memory.
pub fn reload() -> &'static str {
    "whitelist reload"
}

/// Enumerate the server's current whitelist.
pub fn list() -> &'static str {
    "whitelist list"
}
