//! Local file backend
//!
//! Resolves a filesystem path to a single track. Title and artist come from
//! the file's primary tag when present; the title falls back to the file stem.

use super::{LoadFailure, ResolutionOutcome, ResolverBackend};
use crate::track::{SourceRef, Track};
use async_trait::async_trait;
use lofty::prelude::*;
use lofty::probe::Probe;
use soundq_common::human_time::LIVE_DURATION_MS;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Millisecond length of a file, saturating below the live-stream marker
fn file_duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis())
        .unwrap_or(u64::MAX)
        .min(LIVE_DURATION_MS - 1)
}

/// Backend for files in the sounds folder
#[derive(Debug, Default, Clone)]
pub struct LocalFileBackend;

impl LocalFileBackend {
    pub fn new() -> Self {
        Self
    }

    /// Read track metadata from an audio file (blocking)
    fn read_track(path: &Path) -> Result<Track, LoadFailure> {
        let tagged_file = Probe::open(path)
            .map_err(|e| LoadFailure::common(format!("Could not open file: {}", e)))?
            .read()
            .map_err(|_| LoadFailure::common("Unknown file format."))?;

        let duration_ms = file_duration_ms(tagged_file.properties().duration());
        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

        let title = tag
            .and_then(|t| t.title().map(|s| s.to_string()))
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "Unknown title".to_string());

        let mut track = Track::new(
            title,
            duration_ms,
            SourceRef::new(path.to_string_lossy().into_owned()),
        );
        if let Some(artist) = tag.and_then(|t| t.artist().map(|s| s.to_string())) {
            track = track.with_author(artist);
        }

        Ok(track)
    }
}

#[async_trait]
impl ResolverBackend for LocalFileBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self, query: &str) -> ResolutionOutcome {
        let path = PathBuf::from(query);
        if !path.is_file() {
            debug!(query = %query, "Not a local file");
            return ResolutionOutcome::NoMatch;
        }

        match tokio::task::spawn_blocking(move || Self::read_track(&path)).await {
            Ok(Ok(track)) => ResolutionOutcome::Single(track),
            Ok(Err(failure)) => {
                debug!(query = %query, error = %failure.message, "Local file unreadable");
                ResolutionOutcome::Failed(failure)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Metadata task failed");
                ResolutionOutcome::Failed(LoadFailure::fault(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Severity;
    use tempfile::TempDir;

    #[test]
    fn test_file_duration_saturates() {
        assert_eq!(file_duration_ms(Duration::from_millis(65_000)), 65_000);
        assert_eq!(file_duration_ms(Duration::MAX), LIVE_DURATION_MS - 1);
        assert_eq!(
            file_duration_ms(Duration::from_millis(u64::MAX)),
            LIVE_DURATION_MS - 1
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_no_match() {
        let backend = LocalFileBackend::new();
        let outcome = backend.load("/definitely/not/here.mp3").await;
        assert_eq!(outcome, ResolutionOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_search_expression_is_no_match() {
        let backend = LocalFileBackend::new();
        assert_eq!(
            backend.load("ytsearch:airhorn").await,
            ResolutionOutcome::NoMatch
        );
    }

    #[tokio::test]
    async fn test_non_audio_file_is_common_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "not audio at all").unwrap();

        let backend = LocalFileBackend::new();
        match backend.load(&path.to_string_lossy()).await {
            ResolutionOutcome::Failed(failure) => {
                assert_eq!(failure.severity, Severity::Common);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
