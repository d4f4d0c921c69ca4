//! Event types for the SoundQ event system
//!
//! Provides the telemetry event enum and the EventBus the command pipeline
//! publishes on. Nothing in the pipeline depends on anyone listening.

mod pipeline_types;

pub use pipeline_types::{ConfirmationOutcome, OutcomeKind};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// SoundQ event types
///
/// Events are broadcast via EventBus and can be serialized for log shipping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SoundEvent {
    /// A resolution finished (after the optional search retry)
    ResolutionFinished {
        guild_id: u64,
        /// Query of the final attempt
        query: String,
        /// 1, or 2 when the search retry ran
        attempts: u8,
        outcome: OutcomeKind,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A single track was appended to the guild queue
    TrackQueued {
        guild_id: u64,
        requester_id: u64,
        title: String,
        duration_ms: u64,
        /// 0-based queue index, None when the track started playing
        position: Option<usize>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A single track was refused by the duration policy
    TrackRejected {
        guild_id: u64,
        title: String,
        duration_ms: u64,
        max_duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A bundle (or the remainder of one) was bulk inserted
    BundleQueued {
        guild_id: u64,
        name: Option<String>,
        total: usize,
        inserted: usize,
        too_long: usize,
        excluded: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An expand/decline prompt was shown for an attached bundle
    ConfirmationOffered {
        guild_id: u64,
        bundle_size: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An expand/decline prompt was retired
    ConfirmationResolved {
        guild_id: u64,
        outcome: ConfirmationOutcome,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus for SoundEvent
pub struct EventBus {
    tx: broadcast::Sender<SoundEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use soundq_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SoundEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SoundEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
