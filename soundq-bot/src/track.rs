//! Track metadata and queue entry types
//!
//! Tracks are produced by resolver backends and never mutated afterwards.

use chrono::{DateTime, Utc};
use soundq_common::human_time::LIVE_DURATION_MS;
use std::fmt;
use uuid::Uuid;

/// Opaque handle the playback queue uses to locate a track's audio
/// (a canonical file path or a backend URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRef(String);

impl SourceRef {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable track metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub author: Option<String>,
    /// Length in milliseconds, LIVE_DURATION_MS for streams
    pub duration_ms: u64,
    pub source: SourceRef,
}

impl Track {
    pub fn new(title: impl Into<String>, duration_ms: u64, source: SourceRef) -> Self {
        Self {
            title: title.into(),
            author: None,
            duration_ms,
            source,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn is_live(&self) -> bool {
        self.duration_ms == LIVE_DURATION_MS
    }
}

/// Ordered collection of tracks returned by a single resolution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackBundle {
    pub name: Option<String>,
    pub tracks: Vec<Track>,
    /// Index into `tracks` of the backend's pre-selected entry
    pub selected: Option<usize>,
    /// Produced by a keyword search rather than an authored playlist
    pub is_search_result: bool,
}

impl TrackBundle {
    pub fn new(name: Option<String>, tracks: Vec<Track>) -> Self {
        Self {
            name,
            tracks,
            selected: None,
            is_search_result: false,
        }
    }

    /// Bundle produced by a keyword search
    pub fn search_results(term: &str, tracks: Vec<Track>) -> Self {
        Self {
            name: Some(format!("Search results for: {}", term)),
            tracks,
            selected: None,
            is_search_result: true,
        }
    }

    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected = Some(index);
        self
    }

    /// Pre-selected track, if the index points inside the bundle
    pub fn selected_track(&self) -> Option<&Track> {
        self.selected.and_then(|i| self.tracks.get(i))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Identity of the user who issued the command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: u64,
    pub name: String,
    /// May resume a paused player
    pub is_dj: bool,
}

impl Requester {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_dj: false,
        }
    }

    pub fn dj(mut self) -> Self {
        self.is_dj = true;
        self
    }
}

/// A track paired with its requester, owned by the queue once enqueued
#[derive(Debug, Clone)]
pub struct QueuedEntry {
    pub entry_id: Uuid,
    pub track: Track,
    pub requester: Requester,
    pub queued_at: DateTime<Utc>,
}

impl QueuedEntry {
    pub fn new(track: Track, requester: Requester) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            track,
            requester,
            queued_at: Utc::now(),
        }
    }
}
