use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::core::query::Query;
use crate::core::services::provider::{LookupResult, SearchProvider};
use crate::core::strategy::{SearchStrategy, StrategyKind};
use crate::error::SearchResult;

/// Accepts a result only when the reported artist and song equal the
/// query's, case included.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSearchStrategy;

impl ExactSearchStrategy {
    pub fn matches(query: &Query, candidate: &LookupResult) -> bool {
        candidate.is_found() && candidate.artist == query.artist() && candidate.song == query.song()
    }
}

#[async_trait]
impl SearchStrategy for ExactSearchStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    async fn resolve(
        &self,
        query: &Query,
        provider: Arc<dyn SearchProvider>,
    ) -> SearchResult<LookupResult> {
        let candidate = provider.search(query).await?;

        if candidate.degraded {
            return Ok(LookupResult::unavailable(provider.kind(), query));
        }
        if Self::matches(query, &candidate) {
            return Ok(candidate);
        }

        debug!(
            "Exact match rejected for {}: provider reported '{} - {}'",
            query, candidate.artist, candidate.song
        );
        Ok(LookupResult::not_found(provider.kind(), query))
    }
}
