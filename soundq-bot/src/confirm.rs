//! Expand/decline confirmation for bundles attached to a queued track
//!
//! A session starts Offered and settles exactly once, to whichever of these
//! happens first:
//! - an explicit choice (Expanded or Declined)
//! - the 30 second deadline (TimedOut), counted from when the prompt is shown
//! - cancellation of its token (Declined)
//!
//! The result cell is a compare-and-set on an atomic, so later attempts are
//! no-ops no matter which task makes them.

use crate::track::{Track, TrackBundle};
use crate::transport::{MessageId, Transport};
use soundq_common::events::ConfirmationOutcome;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long a prompt stays open
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

const UNSET: u8 = 0;
const EXPANDED: u8 = 1;
const DECLINED: u8 = 2;
const TIMED_OUT: u8 = 3;

fn encode(outcome: ConfirmationOutcome) -> u8 {
    match outcome {
        ConfirmationOutcome::Expanded => EXPANDED,
        ConfirmationOutcome::Declined => DECLINED,
        ConfirmationOutcome::TimedOut => TIMED_OUT,
    }
}

fn decode(value: u8) -> Option<ConfirmationOutcome> {
    match value {
        EXPANDED => Some(ConfirmationOutcome::Expanded),
        DECLINED => Some(ConfirmationOutcome::Declined),
        TIMED_OUT => Some(ConfirmationOutcome::TimedOut),
        _ => None,
    }
}

/// A choice the requester can make on the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Load,
    Cancel,
}

impl Choice {
    /// Choices in display order
    pub const ALL: [Choice; 2] = [Choice::Load, Choice::Cancel];

    pub fn emoji(self) -> &'static str {
        match self {
            Choice::Load => "📥",
            Choice::Cancel => "🚫",
        }
    }

    pub fn from_emoji(emoji: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.emoji() == emoji)
    }
}

/// Exactly-once state behind one prompt
pub struct ConfirmationSession {
    primary: Track,
    bundle: TrackBundle,
    deadline: OnceLock<Instant>,
    result: AtomicU8,
    settled: Notify,
    cancel: CancellationToken,
}

impl ConfirmationSession {
    /// Open a session for `bundle`, whose `primary` track is already queued
    pub fn new(primary: Track, bundle: TrackBundle) -> Self {
        Self {
            primary,
            bundle,
            deadline: OnceLock::new(),
            result: AtomicU8::new(UNSET),
            settled: Notify::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Tie the session to a parent token (e.g. process shutdown)
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Bundle the prompt would load
    pub fn bundle(&self) -> &TrackBundle {
        &self.bundle
    }

    /// Track already queued, left out of the expansion
    pub fn excluded(&self) -> &Track {
        &self.primary
    }

    /// None until the prompt has been shown
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.get().copied()
    }

    /// Start the timeout clock. Only the first call has any effect.
    pub fn start_clock(&self) -> Instant {
        *self.deadline.get_or_init(|| Instant::now() + CONFIRM_TIMEOUT)
    }

    /// Settled outcome, None while still Offered
    pub fn outcome(&self) -> Option<ConfirmationOutcome> {
        decode(self.result.load(Ordering::Acquire))
    }

    /// Apply a user choice. Returns false if the session had already settled.
    pub fn choose(&self, choice: Choice) -> bool {
        let outcome = match choice {
            Choice::Load => ConfirmationOutcome::Expanded,
            Choice::Cancel => ConfirmationOutcome::Declined,
        };
        self.settle(outcome)
    }

    /// Cancel the session; settles as Declined if still Offered
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.settle(ConfirmationOutcome::Declined);
    }

    fn settle(&self, outcome: ConfirmationOutcome) -> bool {
        let won = self
            .result
            .compare_exchange(UNSET, encode(outcome), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            debug!(outcome = %outcome, "Confirmation settled");
            self.settled.notify_waiters();
        }
        won
    }

    /// Wait until the session settles. Any number of tasks may wait at once.
    ///
    /// Starts the clock if nothing has started it yet.
    pub async fn wait(&self) -> ConfirmationOutcome {
        let deadline = self.start_clock();
        loop {
            // Register before checking the cell so a settle in between is not missed
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(outcome) = self.outcome() {
                return outcome;
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep_until(deadline) => {
                    self.settle(ConfirmationOutcome::TimedOut);
                }
                _ = self.cancel.cancelled() => {
                    self.settle(ConfirmationOutcome::Declined);
                }
            }
        }
    }
}

/// Show the prompt, wait for it to settle, then remove its choices.
///
/// The timeout starts once the choices are shown. Failing to show them
/// settles the session as Declined. Failing to clear them is logged and
/// otherwise ignored.
pub async fn run_prompt(
    transport: &dyn Transport,
    message: MessageId,
    text: &str,
    session: Arc<ConfirmationSession>,
) -> ConfirmationOutcome {
    if let Err(e) = transport
        .offer_choices(message, text, &Choice::ALL, session.clone())
        .await
    {
        debug!(message = %message, error = %e, "Could not offer choices");
        session.cancel();
    } else {
        session.start_clock();
    }

    let outcome = session.wait().await;

    if let Err(e) = transport.clear_choices(message).await {
        debug!(message = %message, error = %e, "Could not clear choices");
    }

    outcome
}
