use std::sync::Arc;

use crate::config::Config;
use crate::core::services::lyrics::{build_http_client, LyricsProvider};
use crate::core::services::provider::{Provider, ProviderKind};
use crate::core::services::video::VideoSearchProvider;
use crate::core::strategy::{ExactSearchStrategy, FuzzySearchStrategy, Strategy, StrategyKind};
use crate::error::{SearchError, SearchResult};

/// Maps a provider tag to a concrete provider built from configuration.
/// Holds no mutable state; the result depends only on the tag.
#[derive(Clone)]
pub struct ProviderFactory {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl ProviderFactory {
    pub fn new(config: Arc<Config>) -> SearchResult<Self> {
        let client = build_http_client(config.http_timeout()).map_err(SearchError::from)?;
        Ok(Self { config, client })
    }

    /// Resolve a tag such as `"youtube"` or `"lyrics"` (case-insensitive)
    pub fn create(&self, tag: &str) -> SearchResult<Provider> {
        let kind: ProviderKind = tag.parse()?;
        Ok(self.create_kind(kind))
    }

    pub fn create_kind(&self, kind: ProviderKind) -> Provider {
        match kind {
            ProviderKind::Youtube => {
                Provider::Video(VideoSearchProvider::new(&self.config.video_search_url))
            }
            ProviderKind::Lyrics => Provider::Lyrics(LyricsProvider::new(
                self.client.clone(),
                &self.config.lyrics_base_url,
                self.config.max_attempts,
            )),
        }
    }
}

/// Maps a strategy tag to a concrete strategy.
#[derive(Debug, Clone, Copy)]
pub struct StrategyFactory {
    fuzzy_threshold: f64,
}

impl StrategyFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }

    /// Resolve `"exact"` or `"fuzzy"` (case-insensitive)
    pub fn create(&self, tag: &str) -> SearchResult<Strategy> {
        let kind: StrategyKind = tag.parse()?;
        Ok(self.create_kind(kind))
    }

    pub fn create_kind(&self, kind: StrategyKind) -> Strategy {
        match kind {
            StrategyKind::Exact => Strategy::Exact(ExactSearchStrategy),
            StrategyKind::Fuzzy => Strategy::Fuzzy(FuzzySearchStrategy::new(self.fuzzy_threshold)),
        }
    }
}
