use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::core::infrastructure::decorators::{CachedProvider, CachedStrategy};
use crate::core::query::Query;
use crate::core::services::provider::{LookupResult, Provider, ProviderKind, SearchProvider};
use crate::core::strategy::{SearchStrategy, Strategy, StrategyKind};
use crate::error::{Result, SearchResult};
use crate::services::factory::{ProviderFactory, StrategyFactory};

/// Video link and lyrics for one song, looked up together.
#[derive(Debug, Clone, Serialize)]
pub struct SongLookup {
    pub video: LookupResult,
    pub lyrics: LookupResult,
}

/// Process-wide holder of one cached decorator per provider and per
/// strategy. Every caller using the same tag shares one cache table.
pub struct Services {
    providers: ProviderFactory,
    strategies: StrategyFactory,
    cached_providers: HashMap<ProviderKind, Arc<CachedProvider<Provider>>>,
    cached_strategies: HashMap<StrategyKind, Arc<CachedStrategy<Strategy>>>,
}

impl Services {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let providers = ProviderFactory::new(config.clone())?;
        let strategies = StrategyFactory::new(&config);
        let settings = config.cache_settings();

        let cached_providers = ProviderKind::ALL
            .into_iter()
            .map(|kind| {
                let cached = CachedProvider::new(providers.create_kind(kind), settings);
                (kind, Arc::new(cached))
            })
            .collect();

        let cached_strategies = StrategyKind::ALL
            .into_iter()
            .map(|kind| {
                let cached = CachedStrategy::new(strategies.create_kind(kind), settings);
                (kind, Arc::new(cached))
            })
            .collect();

        Ok(Self {
            providers,
            strategies,
            cached_providers,
            cached_strategies,
        })
    }

    pub fn cached_provider(&self, tag: &str) -> SearchResult<Arc<CachedProvider<Provider>>> {
        let kind: ProviderKind = tag.parse()?;
        Ok(self.cached_provider_for(kind))
    }

    pub fn cached_strategy(&self, tag: &str) -> SearchResult<Arc<CachedStrategy<Strategy>>> {
        let kind: StrategyKind = tag.parse()?;
        Ok(self.cached_strategies[&kind].clone())
    }

    fn cached_provider_for(&self, kind: ProviderKind) -> Arc<CachedProvider<Provider>> {
        self.cached_providers[&kind].clone()
    }

    /// Look `query` up through the provider named by `provider_tag`,
    /// optionally resolved through a strategy. Both tags are checked before
    /// any lookup starts.
    pub async fn search(
        &self,
        query: &Query,
        provider_tag: &str,
        strategy_tag: Option<&str>,
        use_cache: bool,
    ) -> SearchResult<LookupResult> {
        let provider_kind: ProviderKind = provider_tag.parse()?;
        let strategy_kind = strategy_tag
            .map(str::parse::<StrategyKind>)
            .transpose()?;

        info!(
            "Searching {} via {} (strategy: {}, cache: {})",
            query,
            provider_kind,
            strategy_kind.map_or("none", |kind| kind.as_str()),
            use_cache
        );

        let provider: Arc<dyn SearchProvider> = if use_cache {
            self.cached_provider_for(provider_kind)
        } else {
            Arc::new(self.providers.create_kind(provider_kind))
        };

        match strategy_kind {
            None => provider.search(query).await,
            Some(kind) if use_cache => self.cached_strategies[&kind].resolve(query, provider).await,
            Some(kind) => self.strategies.create_kind(kind).resolve(query, provider).await,
        }
    }

    /// Video link and lyrics for `query`, fetched concurrently through the
    /// cached providers.
    pub async fn song(&self, query: &Query) -> SearchResult<SongLookup> {
        info!("Looking up song: {}", query);
        let video = self.cached_provider_for(ProviderKind::Youtube);
        let lyrics = self.cached_provider_for(ProviderKind::Lyrics);

        let (video, lyrics) = tokio::join!(video.search(query), lyrics.search(query));

        Ok(SongLookup {
            video: video?,
            lyrics: lyrics?,
        })
    }
}
