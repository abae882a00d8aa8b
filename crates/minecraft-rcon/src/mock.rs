//! In-memory executor for unit testing without a real server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use minecraft_types::ServerEndpoint;

use crate::client::RconExecutor;
use crate::error::{RconError, RconFailureKind, Result};

/// In-memory executor that records every command it is asked to run.
/// Use in tests instead of a real `RconClient`.
///
/// # Example
/// ```rust,ignore
/// let mock = MockRcon::new();
/// mock.fail_matching("remove Alex", RconFailureKind::ConnectionUnreachable);
/// engine_under_test(mock.clone()).remove_member(guild, member).await?;
/// assert_eq!(mock.commands(), vec!["whitelist remove Alex"]);
/// ```
#[derive(Clone, Default)]
pub struct MockRcon {
    sent: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<(String, RconFailureKind)>>>,
    responses: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockRcon {
    /// Create a mock that answers every command with an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all attempted commands in execution order.
    /// Failed attempts are recorded too: the engine's at-most-once
    /// guarantees are about attempts, not successes.
    pub fn commands(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of commands attempted so far.
    pub fn command_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Count attempted commands containing `fragment`.
    pub fn count_matching(&self, fragment: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.contains(fragment))
            .count()
    }

    /// Commands containing `fragment` fail with `kind` until cleared.
    pub fn fail_matching(&self, fragment: impl Into<String>, kind: RconFailureKind) {
        self.failures.lock().unwrap().push((fragment.into(), kind));
    }

    /// Stop failing any command.
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Commands containing `fragment` answer with `text` instead of the
    /// default empty response.
    pub fn respond_with(&self, fragment: impl Into<String>, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), text.into()));
    }
}

impl RconExecutor for MockRcon {
    async fn execute(&self, _endpoint: &ServerEndpoint, command: &str) -> Result<String> {
        self.sent.lock().unwrap().push(command.to_string());

        let scripted_failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| command.contains(fragment.as_str()))
            .map(|(_, kind)| *kind);
        if let Some(kind) = scripted_failure {
            return Err(match kind {
                RconFailureKind::ConnectionUnreachable => {
                    RconError::Timeout(Duration::from_secs(10))
                }
                RconFailureKind::AuthenticationRejected => RconError::AuthenticationRejected,
                RconFailureKind::ProtocolOther => {
                    RconError::Protocol("scripted failure".to_string())
                }
            });
        }

        let scripted_response = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| command.contains(fragment.as_str()))
            .map(|(_, text)| text.clone());
        Ok(scripted_response.unwrap_or_default())
    }
}
