//! Chat transport seam
//!
//! The pipeline sends one status message per command and edits it as the
//! command progresses. Prompts attach choices to that message; the transport
//! routes the requester's pick to `ConfirmationSession::choose`.

mod console;

pub use console::{parse_command_line, ConsoleCommand, ConsoleTransport};

use crate::confirm::{Choice, ConfirmationSession};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Transport-assigned message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transport errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Bot lacks the rights for this action (e.g. removing reactions)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transport could not deliver
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    /// Message does not exist (or no longer exists)
    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),
}

/// Chat transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a new message
    async fn send(&self, text: &str) -> Result<MessageId, TransportError>;

    /// Replace the text of a sent message
    async fn edit(&self, message: MessageId, text: &str) -> Result<(), TransportError>;

    /// Whether choices can be attached to messages in this channel
    fn can_prompt(&self) -> bool {
        true
    }

    /// Set `text` on `message` and attach `choices` routed to `session`
    async fn offer_choices(
        &self,
        message: MessageId,
        text: &str,
        choices: &[Choice],
        session: Arc<ConfirmationSession>,
    ) -> Result<(), TransportError>;

    /// Remove choices from `message`
    async fn clear_choices(&self, message: MessageId) -> Result<(), TransportError>;
}
