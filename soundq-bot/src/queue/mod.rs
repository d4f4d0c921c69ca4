//! Shared playback queue seam and queue insertion
//!
//! The pipeline only ever talks to the queue through `QueueService`. The
//! in-memory `SessionQueue` is the implementation the binary uses; a real
//! player would provide its own.

mod insertion;
mod session_queue;

pub use insertion::{plan_bulk, BulkInsertion, QueueInserter};
pub use session_queue::SessionQueue;

use crate::track::{QueuedEntry, Track};
use async_trait::async_trait;
use std::sync::Arc;

/// Where an enqueued entry landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePosition {
    /// Queue was idle; the entry starts playing immediately
    NowPlaying,
    /// 0-based index among entries waiting behind the current one
    Queued(usize),
}

impl QueuePosition {
    /// 1-based position shown to users, None when playing immediately
    pub fn display_position(&self) -> Option<usize> {
        match self {
            QueuePosition::NowPlaying => None,
            QueuePosition::Queued(index) => Some(index + 1),
        }
    }
}

/// Shared ordered playback queue
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Append an entry and report where it landed
    async fn enqueue(&self, entry: QueuedEntry) -> QueuePosition;

    /// Number of entries including the one playing
    async fn len(&self) -> usize;

    /// Track that is loaded but paused, if any
    async fn paused_track(&self) -> Option<Track> {
        None
    }

    /// Resume a paused player. Returns false when nothing was paused.
    async fn resume(&self) -> bool {
        false
    }
}

/// Queue handle passed explicitly into the pipeline
pub type QueueHandle = Arc<dyn QueueService>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_position_is_one_based() {
        assert_eq!(QueuePosition::NowPlaying.display_position(), None);
        assert_eq!(QueuePosition::Queued(0).display_position(), Some(1));
        assert_eq!(QueuePosition::Queued(4).display_position(), Some(5));
    }
}
