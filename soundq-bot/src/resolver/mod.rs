//! Track resolution
//!
//! A backend turns one query string into exactly one `ResolutionOutcome`.
//! `TrackResolver` wraps a backend and adds the search fallback: when the
//! first attempt finds nothing, the raw identifier is retried once as a
//! backend search expression. A second `NoMatch` is terminal. Failures are
//! never retried.

mod catalog;
mod chain;
mod local;

pub use catalog::CatalogBackend;
pub use chain::ChainBackend;
pub use local::LocalFileBackend;

use crate::track::{Track, TrackBundle};
use async_trait::async_trait;
use serde::Deserialize;
use soundq_common::events::OutcomeKind;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// How bad a backend load failure is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected failure with a message fit for the user (unavailable video, bad format)
    Common,
    /// Unexpected but probably not a bug
    Suspicious,
    /// Backend bug or infrastructure fault
    Fault,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Common => write!(f, "common"),
            Severity::Suspicious => write!(f, "suspicious"),
            Severity::Fault => write!(f, "fault"),
        }
    }
}

/// Backend load failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub severity: Severity,
    pub message: String,
}

impl LoadFailure {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn common(message: impl Into<String>) -> Self {
        Self::new(Severity::Common, message)
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self::new(Severity::Fault, message)
    }
}

/// Result of one resolution attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Single(Track),
    Bundle(TrackBundle),
    NoMatch,
    Failed(LoadFailure),
}

impl ResolutionOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ResolutionOutcome::Single(_) => OutcomeKind::Single,
            ResolutionOutcome::Bundle(_) => OutcomeKind::Bundle,
            ResolutionOutcome::NoMatch => OutcomeKind::NoMatch,
            ResolutionOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }
}

/// Resolution backend
#[async_trait]
pub trait ResolverBackend: Send + Sync {
    /// Backend identifier for logs (e.g. "local", "catalog")
    fn name(&self) -> &'static str;

    /// Resolve `query` to exactly one outcome
    async fn load(&self, query: &str) -> ResolutionOutcome;
}

/// What the user typed, and what the first attempt should ask the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Argument as typed, used for the search retry and user-facing text
    pub raw: String,
    /// First-attempt query: canonical local path, or `raw` for remote queries
    pub query: String,
}

impl Identifier {
    /// Identifier for a sound found in the local sounds folder
    pub fn local(raw: impl Into<String>, path: &Path) -> Self {
        Self {
            raw: raw.into(),
            query: path.to_string_lossy().into_owned(),
        }
    }

    /// Identifier passed to the backend verbatim
    pub fn query(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            query: raw.clone(),
            raw,
        }
    }
}

/// Final outcome of a resolution plus how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    /// Query of the attempt that produced `outcome`
    pub query: String,
    /// 1, or 2 when the search retry ran
    pub attempts: u8,
}

/// Backend wrapper implementing the single search retry
#[derive(Clone)]
pub struct TrackResolver {
    backend: Arc<dyn ResolverBackend>,
    search_prefix: String,
}

impl TrackResolver {
    pub fn new(backend: Arc<dyn ResolverBackend>, search_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            search_prefix: search_prefix.into(),
        }
    }

    /// Search expression used for the retry
    pub fn search_query(&self, identifier: &Identifier) -> String {
        format!("{}{}", self.search_prefix, identifier.raw)
    }

    pub async fn resolve(&self, identifier: &Identifier) -> Resolution {
        let first = self.backend.load(&identifier.query).await;
        debug!(
            backend = self.backend.name(),
            query = %identifier.query,
            attempt = 1,
            outcome = %first.kind(),
            "Resolution attempt finished"
        );

        if first != ResolutionOutcome::NoMatch {
            return Resolution {
                outcome: first,
                query: identifier.query.clone(),
                attempts: 1,
            };
        }

        let search = self.search_query(identifier);
        let second = self.backend.load(&search).await;
        debug!(
            backend = self.backend.name(),
            query = %search,
            attempt = 2,
            outcome = %second.kind(),
            "Search retry finished"
        );

        Resolution {
            outcome: second,
            query: search,
            attempts: 2,
        }
    }
}
