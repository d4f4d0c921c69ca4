//! Bundle dispatch
//!
//! Decides how a resolved bundle is handled before anything is queued.

use crate::track::{Track, TrackBundle};

/// How a bundle should be queued
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Queue one track, no prompt
    Single(Track),
    /// Queue the pre-selected track now, offer the rest of the bundle
    WithAttachment { primary: Track, bundle: TrackBundle },
    /// Queue every acceptable track
    Bulk(TrackBundle),
    /// Nothing to queue
    Empty,
}

/// Classify a bundle.
///
/// Size-1 bundles and search results collapse to a single track (the
/// pre-selected one, else the first). A pre-selected track in a larger
/// authored bundle becomes the primary of a confirmation. Anything else is
/// queued in bulk.
pub fn classify(bundle: TrackBundle) -> Dispatch {
    if bundle.is_empty() {
        return Dispatch::Empty;
    }

    if bundle.len() == 1 || bundle.is_search_result {
        let track = bundle
            .selected_track()
            .or_else(|| bundle.tracks.first())
            .cloned();
        return match track {
            Some(track) => Dispatch::Single(track),
            None => Dispatch::Empty,
        };
    }

    match bundle.selected_track().cloned() {
        Some(primary) => Dispatch::WithAttachment { primary, bundle },
        None => Dispatch::Bulk(bundle),
    }
}
