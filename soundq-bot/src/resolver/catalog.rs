//! TOML catalog backend
//!
//! Stands in for a remote source. The catalog file lists tracks, playlists
//! that reference tracks by id, and ids that fail to load:
//!
//! ```toml
//! [[tracks]]
//! id = "rain"
//! title = "Rain on a Tin Roof"
//! author = "Field Recordings"
//! duration_ms = 184000
//! uri = "https://example.com/rain"
//!
//! [[playlists]]
//! id = "ambience"
//! name = "Ambience"
//! tracks = ["rain"]
//! selected = "rain"
//!
//! [[failures]]
//! id = "blocked"
//! severity = "common"
//! message = "This video is unavailable."
//! ```

use super::{LoadFailure, ResolutionOutcome, ResolverBackend, Severity};
use crate::track::{SourceRef, Track, TrackBundle};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use soundq_common::Error as CommonError;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tracks: Vec<TrackEntry>,
    #[serde(default)]
    playlists: Vec<PlaylistEntry>,
    #[serde(default)]
    failures: Vec<FailureEntry>,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    id: String,
    title: String,
    author: Option<String>,
    duration_ms: u64,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    id: String,
    name: Option<String>,
    tracks: Vec<String>,
    selected: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FailureEntry {
    id: String,
    severity: Severity,
    message: String,
}

/// In-memory catalog of tracks and playlists
#[derive(Debug, Clone, Default)]
pub struct CatalogBackend {
    search_prefix: String,
    /// Tracks in file order, searched in that order
    tracks: Vec<Track>,
    /// id or uri -> index into `tracks`
    track_keys: HashMap<String, usize>,
    playlists: HashMap<String, TrackBundle>,
    failures: HashMap<String, LoadFailure>,
}

impl CatalogBackend {
    /// Parse a catalog. Playlists must reference known track ids.
    pub fn from_toml_str(content: &str, search_prefix: impl Into<String>) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(CommonError::from)?;

        let mut backend = CatalogBackend {
            search_prefix: search_prefix.into(),
            ..Default::default()
        };
        let mut ids = HashSet::new();

        for entry in file.tracks {
            if !ids.insert(entry.id.clone()) {
                return Err(duplicate(&entry.id));
            }
            let mut track = Track::new(entry.title, entry.duration_ms, SourceRef::new(&entry.uri));
            if let Some(author) = entry.author {
                track = track.with_author(author);
            }
            let index = backend.tracks.len();
            backend.tracks.push(track);
            backend.track_keys.insert(entry.id, index);
            backend.track_keys.entry(entry.uri).or_insert(index);
        }

        for entry in file.playlists {
            if !ids.insert(entry.id.clone()) {
                return Err(duplicate(&entry.id));
            }
            let tracks = entry
                .tracks
                .iter()
                .map(|id| backend.track_by_id(id, &entry.id))
                .collect::<Result<Vec<_>>>()?;

            let mut bundle = TrackBundle::new(entry.name, tracks);
            if let Some(selected) = &entry.selected {
                let index = entry
                    .tracks
                    .iter()
                    .position(|id| id == selected)
                    .ok_or_else(|| {
                        CommonError::Config(format!(
                            "Playlist '{}' selects '{}' which it does not contain",
                            entry.id, selected
                        ))
                    })?;
                bundle = bundle.with_selected(index);
            }
            backend.playlists.insert(entry.id, bundle);
        }

        for entry in file.failures {
            if !ids.insert(entry.id.clone()) {
                return Err(duplicate(&entry.id));
            }
            backend
                .failures
                .insert(entry.id, LoadFailure::new(entry.severity, entry.message));
        }

        Ok(backend)
    }

    /// Load a catalog file from disk
    pub fn load_file(path: &Path, search_prefix: impl Into<String>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let backend = Self::from_toml_str(&content, search_prefix)?;
        info!(
            path = %path.display(),
            tracks = backend.tracks.len(),
            playlists = backend.playlists.len(),
            "Loaded catalog"
        );
        Ok(backend)
    }

    fn track_by_id(&self, id: &str, playlist: &str) -> Result<Track> {
        self.track_keys
            .get(id)
            .map(|&i| self.tracks[i].clone())
            .ok_or_else(|| {
                CommonError::Config(format!(
                    "Playlist '{}' references unknown track '{}'",
                    playlist, id
                ))
                .into()
            })
    }

    fn search(&self, term: &str) -> ResolutionOutcome {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return ResolutionOutcome::NoMatch;
        }

        let hits: Vec<Track> = self
            .tracks
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        if hits.is_empty() {
            ResolutionOutcome::NoMatch
        } else {
            ResolutionOutcome::Bundle(TrackBundle::search_results(term.trim(), hits))
        }
    }
}

fn duplicate(id: &str) -> crate::Error {
    CommonError::Config(format!("Duplicate catalog id '{}'", id)).into()
}

#[async_trait]
impl ResolverBackend for CatalogBackend {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn load(&self, query: &str) -> ResolutionOutcome {
        if let Some(term) = query.strip_prefix(self.search_prefix.as_str()) {
            return self.search(term);
        }
        if let Some(failure) = self.failures.get(query) {
            return ResolutionOutcome::Failed(failure.clone());
        }
        if let Some(bundle) = self.playlists.get(query) {
            return ResolutionOutcome::Bundle(bundle.clone());
        }
        match self.track_keys.get(query) {
            Some(&i) => ResolutionOutcome::Single(self.tracks[i].clone()),
            None => ResolutionOutcome::NoMatch,
        }
    }
}
