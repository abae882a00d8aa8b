//! One-shot RCON client.
//!
//! Every `execute` opens a fresh TCP connection, authenticates, sends a
//! single command, reads one response and closes. No connection is held
//! across calls and no retries happen at this layer; retry policy
//! belongs to the reconciliation engine, which knows what a failed
//! command means for its bookkeeping.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use minecraft_types::ServerEndpoint;

use crate::codec::{self, Packet, AUTH_FAILED_ID, MAX_FRAME, TYPE_COMMAND, TYPE_LOGIN};
use crate::error::{RconError, Result};

/// Default per-command deadline. Expiry is reported as unreachable.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Trait for executing one console command against a server endpoint.
/// Implemented by `RconClient` (real TCP) and `MockRcon` (in-memory, tests).
#[allow(async_fn_in_trait)]
pub trait RconExecutor {
    /// Run one command, returning the response body.
    async fn execute(&self, endpoint: &ServerEndpoint, command: &str) -> Result<String>;
}

/// RCON client with a bounded per-command deadline
#[derive(Debug, Clone)]
pub struct RconClient {
    deadline: Duration,
}

impl RconClient {
    /// Create a client whose whole connect-login-exchange cycle must
    /// finish within `deadline`.
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    async fn exchange(&self, endpoint: &ServerEndpoint, command: &str) -> Result<String> {
        let addr = format!("{}:{}", endpoint.host, endpoint.rcon_port);
        let mut stream = TcpStream::connect(&addr)
            .await
            .map_err(RconError::Connection)?;
        debug!(%addr, "RCON connection established");

        stream
            .write_all(&codec::encode(1, TYPE_LOGIN, &endpoint.password))
            .await
            .map_err(RconError::Connection)?;
        let auth = read_packet(&mut stream).await?;
        if auth.id == AUTH_FAILED_ID {
            return Err(RconError::AuthenticationRejected);
        }

        stream
            .write_all(&codec::encode(2, TYPE_COMMAND, command))
            .await
            .map_err(RconError::Connection)?;
        let response = read_packet(&mut stream).await?;
        debug!(
            command,
            response_len = response.body.len(),
            "RCON command executed"
        );
        Ok(response.body)
    }
}

impl Default for RconClient {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE)
    }
}

impl RconExecutor for RconClient {
    async fn execute(&self, endpoint: &ServerEndpoint, command: &str) -> Result<String> {
        match timeout(self.deadline, self.exchange(endpoint, command)).await {
            Ok(result) => result,
            Err(_) => Err(RconError::Timeout(self.deadline)),
        }
    }
}

async fn read_packet(stream: &mut TcpStream) -> Result<Packet> {
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(RconError::Connection)?;
    let len = i32::from_le_bytes(len_buf);
    if len < 10 || len as usize > MAX_FRAME {
        return Err(RconError::Protocol(format!("invalid frame length {}", len)));
    }
    let mut payload = vec![0u8; len as usize];
    stream
        .read_exact(&mut payload)
        .await
        .map_err(RconError::Connection)?;
    codec::decode(&payload)
}
