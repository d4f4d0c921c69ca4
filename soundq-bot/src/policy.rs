//! Duration policy

use crate::track::Track;

/// Accepts tracks whose length is within the configured maximum.
///
/// `None` means no limit; every track (live streams included) is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationPolicy {
    max_duration_ms: Option<u64>,
}

impl DurationPolicy {
    pub fn new(max_duration_ms: Option<u64>) -> Self {
        Self { max_duration_ms }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn max_duration_ms(&self) -> Option<u64> {
        self.max_duration_ms
    }

    /// True iff `track.duration_ms <= max`
    pub fn accept(&self, track: &Track) -> bool {
        match self.max_duration_ms {
            Some(max) => track.duration_ms <= max,
            None => true,
        }
    }
}
