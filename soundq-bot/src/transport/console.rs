//! Line-oriented console transport
//!
//! Messages print as `[#id] text`, edits as `[#id edited] text`. The most
//! recent open prompt is answered with `load` or `cancel`; opening a new
//! prompt cancels the previous one.

use super::{MessageId, Transport, TransportError};
use crate::confirm::{Choice, ConfirmationSession};
use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Console transport writing to any `Write` sink
pub struct ConsoleTransport {
    out: Mutex<Box<dyn Write + Send>>,
    last_id: AtomicU64,
    prompts: bool,
    pending: Mutex<Option<(MessageId, Arc<ConfirmationSession>)>>,
}

impl ConsoleTransport {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            last_id: AtomicU64::new(0),
            prompts: true,
            pending: Mutex::new(None),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Disable prompts, as if the bot could not add reactions
    pub fn without_prompts(mut self) -> Self {
        self.prompts = false;
        self
    }

    /// Answer the open prompt. Returns false when none is open or it already settled.
    pub fn answer(&self, choice: Choice) -> bool {
        let pending = self.lock_pending().take();
        match pending {
            Some((message, session)) => {
                debug!(message = %message, choice = ?choice, "Prompt answered");
                session.choose(choice)
            }
            None => false,
        }
    }

    /// Message carrying the open prompt
    pub fn pending_prompt(&self) -> Option<MessageId> {
        self.lock_pending().as_ref().map(|(id, _)| *id)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<(MessageId, Arc<ConfirmationSession>)>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_line(&self, line: &str) -> Result<(), TransportError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| TransportError::Unavailable("console writer poisoned".to_string()))?;
        writeln!(out, "{}", line)
            .and_then(|_| out.flush())
            .map_err(|e| TransportError::Unavailable(e.to_string()))
    }

    fn check_known(&self, message: MessageId) -> Result<(), TransportError> {
        if message.0 == 0 || message.0 > self.last_id.load(Ordering::Acquire) {
            return Err(TransportError::UnknownMessage(message));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, text: &str) -> Result<MessageId, TransportError> {
        let id = MessageId(self.last_id.fetch_add(1, Ordering::AcqRel) + 1);
        self.write_line(&format!("[{}] {}", id, text))?;
        Ok(id)
    }

    async fn edit(&self, message: MessageId, text: &str) -> Result<(), TransportError> {
        self.check_known(message)?;
        self.write_line(&format!("[{} edited] {}", message, text))
    }

    fn can_prompt(&self) -> bool {
        self.prompts
    }

    async fn offer_choices(
        &self,
        message: MessageId,
        text: &str,
        choices: &[Choice],
        session: Arc<ConfirmationSession>,
    ) -> Result<(), TransportError> {
        if !self.prompts {
            return Err(TransportError::PermissionDenied(
                "cannot add reactions".to_string(),
            ));
        }
        self.edit(message, text).await?;

        let labels: Vec<String> = choices
            .iter()
            .map(|c| match c {
                Choice::Load => format!("{} load", c.emoji()),
                Choice::Cancel => format!("{} cancel", c.emoji()),
            })
            .collect();
        self.write_line(&format!("[{}] choices: {}", message, labels.join(" | ")))?;

        let superseded = self.lock_pending().replace((message, session));
        if let Some((old, old_session)) = superseded {
            debug!(message = %old, "Prompt superseded");
            old_session.cancel();
        }
        Ok(())
    }

    async fn clear_choices(&self, message: MessageId) -> Result<(), TransportError> {
        self.check_known(message)?;
        let mut pending = self.lock_pending();
        if matches!(pending.as_ref(), Some((id, _)) if *id == message) {
            pending.take();
        }
        Ok(())
    }
}

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `<prefix>sound [args]`
    Sound(String),
    Load,
    Cancel,
    Pause,
    Queue,
    Skip,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse a console input line
pub fn parse_command_line(line: &str, prefix: &str) -> ConsoleCommand {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleCommand::Empty;
    }

    if let Some(rest) = line.strip_prefix(prefix) {
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        if name.eq_ignore_ascii_case("sound") {
            return ConsoleCommand::Sound(args.to_string());
        }
    }

    match line.to_ascii_lowercase().as_str() {
        "load" => ConsoleCommand::Load,
        "cancel" => ConsoleCommand::Cancel,
        "pause" => ConsoleCommand::Pause,
        "queue" => ConsoleCommand::Queue,
        "skip" => ConsoleCommand::Skip,
        "quit" | "exit" => ConsoleCommand::Quit,
        _ => ConsoleCommand::Unknown(line.to_string()),
    }
}
