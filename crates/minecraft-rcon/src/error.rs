//! Error types for minecraft-rcon

use std::time::Duration;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, RconError>;

/// Closed classification of remote-command failures.
///
/// Retry policy lives entirely in the caller; the kind tells it whether a
/// retry can ever help and whether an operator needs to fix credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RconFailureKind {
    /// TCP connect/read/write failure, or the per-command deadline expired.
    ConnectionUnreachable,
    /// The server rejected the RCON password.
    AuthenticationRejected,
    /// The server answered, but not in a way we can classify.
    ProtocolOther,
}

/// Error types for RCON exchanges
#[derive(Debug, Error)]
pub enum RconError {
    #[error("couldn't connect to the server: {0}")]
    Connection(#[source] std::io::Error),

    #[error("server did not respond within {0:?}")]
    Timeout(Duration),

    #[error("server rejected the RCON password")]
    AuthenticationRejected,

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl RconError {
    /// Collapse into the closed failure classification.
    pub fn kind(&self) -> RconFailureKind {
        match self {
            RconError::Connection(_) | RconError::Timeout(_) => {
                RconFailureKind::ConnectionUnreachable
            }
            RconError::AuthenticationRejected => RconFailureKind::AuthenticationRejected,
            RconError::Protocol(_) => RconFailureKind::ProtocolOther,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_connection_unreachable() {
        let err = RconError::Timeout(Duration::from_secs(10));
        assert_eq!(err.kind(), RconFailureKind::ConnectionUnreachable);
    }

    #[test]
    fn test_io_failure_is_connection_unreachable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            RconError::Connection(io).kind(),
            RconFailureKind::ConnectionUnreachable
        );
    }

    #[test]
    fn test_auth_rejection_kind() {
        assert_eq!(
            RconError::AuthenticationRejected.kind(),
            RconFailureKind::AuthenticationRejected
        );
    }

    #[test]
    fn test_protocol_error_display() {
        let err = RconError::Protocol("bad frame".to_string());
        assert_eq!(err.kind(), RconFailureKind::ProtocolOther);
        assert_eq!(err.to_string(), "protocol error: bad frame");
    }
}
