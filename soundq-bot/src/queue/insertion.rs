//! Queue insertion under the duration policy
//!
//! Rejected tracks never reach the queue. Bulk insertion decides every track
//! up front with a fold, so each track lands in exactly one bucket:
//! excluded, too long, or inserted.

use super::{QueueHandle, QueuePosition};
use crate::policy::DurationPolicy;
use crate::track::{QueuedEntry, Requester, Track};
use crate::{Error, Result};
use tracing::debug;

/// Counts from one bulk insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkInsertion {
    /// Tracks offered
    pub total: usize,
    /// Tracks enqueued
    pub inserted: usize,
    /// Tracks rejected by the duration policy
    pub too_long: usize,
    /// Tracks matching the excluded (already queued) track
    pub excluded: usize,
}

impl BulkInsertion {
    /// Tracks offered but not enqueued
    pub fn skipped(&self) -> usize {
        self.too_long + self.excluded
    }
}

/// Decide which tracks a bulk insertion enqueues.
///
/// The exclusion check runs before the duration check, so an excluded track
/// that is also too long counts as excluded only.
pub fn plan_bulk<'a>(
    tracks: &'a [Track],
    policy: &DurationPolicy,
    exclude: Option<&Track>,
) -> (Vec<&'a Track>, BulkInsertion) {
    let initial = (
        Vec::with_capacity(tracks.len()),
        BulkInsertion {
            total: tracks.len(),
            ..Default::default()
        },
    );

    tracks
        .iter()
        .fold(initial, |(mut accepted, mut counts), track| {
            if exclude == Some(track) {
                counts.excluded += 1;
            } else if !policy.accept(track) {
                counts.too_long += 1;
            } else {
                counts.inserted += 1;
                accepted.push(track);
            }
            (accepted, counts)
        })
}

/// Applies the duration policy in front of the shared queue
#[derive(Clone)]
pub struct QueueInserter {
    queue: QueueHandle,
    policy: DurationPolicy,
}

impl QueueInserter {
    pub fn new(queue: QueueHandle, policy: DurationPolicy) -> Self {
        Self { queue, policy }
    }

    pub fn policy(&self) -> &DurationPolicy {
        &self.policy
    }

    /// Enqueue one track, or reject it without touching the queue
    pub async fn insert_one(&self, track: &Track, requester: &Requester) -> Result<QueuePosition> {
        if !self.policy.accept(track) {
            debug!(title = %track.title, duration_ms = track.duration_ms, "Track rejected by duration policy");
            return Err(Error::DurationExceeded {
                title: track.title.clone(),
                duration_ms: track.duration_ms,
                max_duration_ms: self.policy.max_duration_ms().unwrap_or(u64::MAX),
            });
        }

        let entry = QueuedEntry::new(track.clone(), requester.clone());
        Ok(self.queue.enqueue(entry).await)
    }

    /// Enqueue every acceptable track except `exclude`, in bundle order
    pub async fn insert_many(
        &self,
        tracks: &[Track],
        requester: &Requester,
        exclude: Option<&Track>,
    ) -> BulkInsertion {
        let (accepted, counts) = plan_bulk(tracks, &self.policy, exclude);

        for track in accepted {
            let entry = QueuedEntry::new(track.clone(), requester.clone());
            self.queue.enqueue(entry).await;
        }

        debug!(
            total = counts.total,
            inserted = counts.inserted,
            too_long = counts.too_long,
            excluded = counts.excluded,
            "Bulk insertion finished"
        );
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::SourceRef;

    fn track(title: &str, duration_ms: u64) -> Track {
        Track::new(title, duration_ms, SourceRef::new(title))
    }

    #[test]
    fn test_plan_buckets_each_track_once() {
        let policy = DurationPolicy::new(Some(600_000));
        let a = track("A", 500_000);
        let b = track("B", 700_000);
        let c = track("C", 300_000);
        let tracks = vec![a.clone(), b, c];

        let (accepted, counts) = plan_bulk(&tracks, &policy, Some(&a));
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].title, "C");
        assert_eq!(
            counts,
            BulkInsertion {
                total: 3,
                inserted: 1,
                too_long: 1,
                excluded: 1,
            }
        );
        assert_eq!(counts.skipped(), 2);
    }

    #[test]
    fn test_excluded_wins_over_too_long() {
        let policy = DurationPolicy::new(Some(1_000));
        let long = track("long", 5_000);
        let (accepted, counts) = plan_bulk(std::slice::from_ref(&long), &policy, Some(&long));
        assert!(accepted.is_empty());
        assert_eq!(counts.excluded, 1);
        assert_eq!(counts.too_long, 0);
    }

    #[test]
    fn test_unlimited_policy_accepts_all() {
        let tracks = vec![track("a", 1), track("b", u64::MAX)];
        let (accepted, counts) = plan_bulk(&tracks, &DurationPolicy::unlimited(), None);
        assert_eq!(accepted.len(), 2);
        assert_eq!(counts.skipped(), 0);
    }
}
