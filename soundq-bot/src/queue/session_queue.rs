//! In-memory session queue
//!
//! One queue per guild. Entries sit in three slots:
//! - Current: playing (or paused)
//! - Next: plays after current
//! - Queued: everything after next
//!
//! The total count is cached and maintained on every mutation.

use super::{QueuePosition, QueueService};
use crate::track::{QueuedEntry, Track};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct QueueState {
    /// Currently playing entry
    current: Option<QueuedEntry>,

    /// Next to play
    next: Option<QueuedEntry>,

    /// After next
    queued: Vec<QueuedEntry>,

    /// Cached total count (current + next + queued.len())
    total_count: usize,

    /// Player holds `current` but is not playing it
    paused: bool,
}

impl QueueState {
    fn enqueue(&mut self, entry: QueuedEntry) -> QueuePosition {
        self.total_count += 1;

        if self.current.is_none() {
            self.current = Some(entry);
            return QueuePosition::NowPlaying;
        }

        if self.next.is_none() {
            self.next = Some(entry);
            return QueuePosition::Queued(0);
        }

        self.queued.push(entry);
        QueuePosition::Queued(self.queued.len())
    }

    /// current <- next, next <- queued[0]
    fn advance(&mut self) -> Option<QueuedEntry> {
        if self.current.is_some() {
            self.total_count -= 1;
        }

        self.current = self.next.take();
        if !self.queued.is_empty() {
            self.next = Some(self.queued.remove(0));
        }
        self.paused = false;

        self.current.clone()
    }

    fn entries(&self) -> Vec<QueuedEntry> {
        self.current
            .iter()
            .chain(self.next.iter())
            .chain(self.queued.iter())
            .cloned()
            .collect()
    }
}

/// Per-guild playback queue
pub struct SessionQueue {
    guild_id: u64,
    state: Mutex<QueueState>,
}

impl SessionQueue {
    pub fn new(guild_id: u64) -> Self {
        Self {
            guild_id,
            state: Mutex::new(QueueState::default()),
        }
    }

    pub fn guild_id(&self) -> u64 {
        self.guild_id
    }

    /// Snapshot of all entries in play order, current first
    pub async fn entries(&self) -> Vec<QueuedEntry> {
        self.state.lock().await.entries()
    }

    /// Finish the current entry and start the next one
    pub async fn advance(&self) -> Option<QueuedEntry> {
        let current = self.state.lock().await.advance();
        match &current {
            Some(entry) => info!(guild_id = self.guild_id, title = %entry.track.title, "Now playing"),
            None => info!(guild_id = self.guild_id, "Queue finished"),
        }
        current
    }

    /// Pause or unpause the current entry. Returns false when nothing is loaded.
    pub async fn set_paused(&self, paused: bool) -> bool {
        let mut state = self.state.lock().await;
        if state.current.is_none() {
            return false;
        }
        state.paused = paused;
        debug!(guild_id = self.guild_id, paused, "Pause state changed");
        true
    }

    pub async fn is_paused(&self) -> bool {
        self.state.lock().await.paused
    }
}

#[async_trait]
impl QueueService for SessionQueue {
    async fn enqueue(&self, entry: QueuedEntry) -> QueuePosition {
        let title = entry.track.title.clone();
        let position = self.state.lock().await.enqueue(entry);
        debug!(guild_id = self.guild_id, title = %title, ?position, "Entry enqueued");
        position
    }

    async fn len(&self) -> usize {
        self.state.lock().await.total_count
    }

    async fn paused_track(&self) -> Option<Track> {
        let state = self.state.lock().await;
        if !state.paused {
            return None;
        }
        state.current.as_ref().map(|e| e.track.clone())
    }

    async fn resume(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.paused || state.current.is_none() {
            return false;
        }
        state.paused = false;
        info!(guild_id = self.guild_id, "Player resumed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{Requester, SourceRef};

    fn entry(title: &str) -> QueuedEntry {
        QueuedEntry::new(
            Track::new(title, 1_000, SourceRef::new(title)),
            Requester::new(7, "ann"),
        )
    }

    fn titles(entries: &[QueuedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.track.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_enqueue_positions() {
        let queue = SessionQueue::new(1);
        assert_eq!(queue.enqueue(entry("a")).await, QueuePosition::NowPlaying);
        assert_eq!(queue.enqueue(entry("b")).await, QueuePosition::Queued(0));
        assert_eq!(queue.enqueue(entry("c")).await, QueuePosition::Queued(1));
        assert_eq!(queue.enqueue(entry("d")).await, QueuePosition::Queued(2));
        assert_eq!(queue.len().await, 4);
        assert_eq!(titles(&queue.entries().await), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_advance() {
        let queue = SessionQueue::new(1);
        queue.enqueue(entry("a")).await;
        queue.enqueue(entry("b")).await;
        queue.enqueue(entry("c")).await;

        assert_eq!(queue.advance().await.unwrap().track.title, "b");
        assert_eq!(queue.len().await, 2);
        assert_eq!(titles(&queue.entries().await), vec!["b", "c"]);

        assert_eq!(queue.advance().await.unwrap().track.title, "c");
        assert!(queue.advance().await.is_none());
        assert_eq!(queue.len().await, 0);

        // Idle again, so the next entry plays immediately
        assert_eq!(queue.enqueue(entry("d")).await, QueuePosition::NowPlaying);
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let queue = SessionQueue::new(1);
        assert!(!queue.set_paused(true).await);
        assert!(!queue.resume().await);

        queue.enqueue(entry("a")).await;
        assert!(queue.paused_track().await.is_none());

        assert!(queue.set_paused(true).await);
        assert_eq!(queue.paused_track().await.unwrap().title, "a");

        assert!(queue.resume().await);
        assert!(!queue.is_paused().await);
        assert!(!queue.resume().await);
    }
}
