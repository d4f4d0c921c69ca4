//! Backend chaining

use super::{ResolutionOutcome, ResolverBackend};
use async_trait::async_trait;
use std::sync::Arc;

/// Tries each backend in order; the first outcome other than NoMatch wins
pub struct ChainBackend {
    backends: Vec<Arc<dyn ResolverBackend>>,
}

impl ChainBackend {
    pub fn new(backends: Vec<Arc<dyn ResolverBackend>>) -> Self {
        Self { backends }
    }
}

#[async_trait]
impl ResolverBackend for ChainBackend {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn load(&self, query: &str) -> ResolutionOutcome {
        for backend in &self.backends {
            match backend.load(query).await {
                ResolutionOutcome::NoMatch => continue,
                outcome => return outcome,
            }
        }
        ResolutionOutcome::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LoadFailure;
    use crate::track::{SourceRef, Track};

    struct Fixed(ResolutionOutcome);

    #[async_trait]
    impl ResolverBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn load(&self, _query: &str) -> ResolutionOutcome {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let track = Track::new("horn", 2_000, SourceRef::new("horn"));
        let chain = ChainBackend::new(vec![
            Arc::new(Fixed(ResolutionOutcome::NoMatch)),
            Arc::new(Fixed(ResolutionOutcome::Single(track.clone()))),
            Arc::new(Fixed(ResolutionOutcome::Failed(LoadFailure::fault("unreached")))),
        ]);

        assert_eq!(chain.load("q").await, ResolutionOutcome::Single(track));
    }

    #[tokio::test]
    async fn test_failure_stops_the_chain() {
        let failure = LoadFailure::common("blocked");
        let chain = ChainBackend::new(vec![
            Arc::new(Fixed(ResolutionOutcome::Failed(failure.clone()))),
            Arc::new(Fixed(ResolutionOutcome::NoMatch)),
        ]);

        assert_eq!(chain.load("q").await, ResolutionOutcome::Failed(failure));
    }

    #[tokio::test]
    async fn test_empty_chain_is_no_match() {
        let chain = ChainBackend::new(Vec::new());
        assert_eq!(chain.load("q").await, ResolutionOutcome::NoMatch);
    }
}
