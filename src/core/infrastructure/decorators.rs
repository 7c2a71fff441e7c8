//! Caching decorators over providers and strategies
//!
//! Each decorator owns its wrapped instance and its own
//! [`SingleFlightCache`]; two decorators never share a table, even when they
//! wrap the same kind of provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::core::infrastructure::cache::{CacheSettings, CacheStats, SingleFlightCache};
use crate::core::query::Query;
use crate::core::services::provider::{LookupResult, ProviderKind, SearchProvider};
use crate::core::strategy::{SearchStrategy, StrategyKind};
use crate::error::SearchResult;

/// A [`SearchProvider`] whose results are cached per normalized query.
pub struct CachedProvider<P> {
    inner: Arc<P>,
    cache: SingleFlightCache<Query, LookupResult>,
}

impl<P: SearchProvider + 'static> CachedProvider<P> {
    pub fn new(inner: P, settings: CacheSettings) -> Self {
        Self::from_arc(Arc::new(inner), settings)
    }

    pub fn from_arc(inner: Arc<P>, settings: CacheSettings) -> Self {
        Self {
            inner,
            cache: SingleFlightCache::new(settings).with_retain(LookupResult::is_cacheable),
        }
    }

    pub fn is_cached(&self, query: &Query) -> bool {
        self.cache.contains(query)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[async_trait]
impl<P: SearchProvider + 'static> SearchProvider for CachedProvider<P> {
    fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    async fn search(&self, query: &Query) -> SearchResult<LookupResult> {
        debug!("Cached {} lookup for: {}", self.kind(), query);
        let inner = Arc::clone(&self.inner);
        let owned = query.clone();

        self.cache
            .get_or_fetch(query.clone(), move || async move { inner.search(&owned).await })
            .await
    }
}

/// Cache key for strategy results. The provider kind is part of the key so
/// a strategy resolved against two providers keeps their results apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StrategyKey {
    pub strategy: StrategyKind,
    pub provider: ProviderKind,
    pub query: Query,
}

/// A [`SearchStrategy`] whose resolutions are cached per strategy, provider
/// and normalized query.
pub struct CachedStrategy<S> {
    inner: Arc<S>,
    cache: SingleFlightCache<StrategyKey, LookupResult>,
}

impl<S: SearchStrategy + 'static> CachedStrategy<S> {
    pub fn new(inner: S, settings: CacheSettings) -> Self {
        Self {
            inner: Arc::new(inner),
            cache: SingleFlightCache::new(settings).with_retain(LookupResult::is_cacheable),
        }
    }

    pub fn is_cached(&self, provider: ProviderKind, query: &Query) -> bool {
        self.cache.contains(&StrategyKey {
            strategy: self.inner.kind(),
            provider,
            query: query.clone(),
        })
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[async_trait]
impl<S: SearchStrategy + 'static> SearchStrategy for CachedStrategy<S> {
    fn kind(&self) -> StrategyKind {
        self.inner.kind()
    }

    async fn resolve(
        &self,
        query: &Query,
        provider: Arc<dyn SearchProvider>,
    ) -> SearchResult<LookupResult> {
        let key = StrategyKey {
            strategy: self.inner.kind(),
            provider: provider.kind(),
            query: query.clone(),
        };
        debug!("Cached {} resolution via {} for: {}", key.strategy, key.provider, query);

        let inner = Arc::clone(&self.inner);
        let owned = query.clone();

        self.cache
            .get_or_fetch(key, move || async move { inner.resolve(&owned, provider).await })
            .await
    }
}
