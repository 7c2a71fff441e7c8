//! Match policies applied on top of a provider
//!
//! A strategy decides whether what a provider returned actually answers the
//! query. `exact` demands identical names, `fuzzy` tolerates small
//! differences and retries once with a simplified query.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::query::Query;
use crate::core::services::provider::{LookupResult, SearchProvider};
use crate::error::{SearchError, SearchResult};

pub mod exact;
pub mod fuzzy;

pub use exact::ExactSearchStrategy;
pub use fuzzy::{FuzzySearchStrategy, DEFAULT_FUZZY_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Exact,
    Fuzzy,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Exact, StrategyKind::Fuzzy];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Exact => "exact",
            StrategyKind::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = SearchError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| SearchError::UnsupportedStrategy(tag.to_string()))
    }
}

#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Look `query` up through `provider` and keep the result only if it
    /// matches under this strategy; otherwise return a not-found result.
    async fn resolve(
        &self,
        query: &Query,
        provider: Arc<dyn SearchProvider>,
    ) -> SearchResult<LookupResult>;
}

/// Concrete strategy selected by [`StrategyFactory`](crate::services::StrategyFactory).
pub enum Strategy {
    Exact(ExactSearchStrategy),
    Fuzzy(FuzzySearchStrategy),
}

#[async_trait]
impl SearchStrategy for Strategy {
    fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Exact(strategy) => strategy.kind(),
            Strategy::Fuzzy(strategy) => strategy.kind(),
        }
    }

    async fn resolve(
        &self,
        query: &Query,
        provider: Arc<dyn SearchProvider>,
    ) -> SearchResult<LookupResult> {
        match self {
            Strategy::Exact(strategy) => strategy.resolve(query, provider).await,
            Strategy::Fuzzy(strategy) => strategy.resolve(query, provider).await,
        }
    }
}
