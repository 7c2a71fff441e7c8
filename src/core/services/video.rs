use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::core::query::Query;
use crate::core::services::provider::{LookupContent, LookupResult, ProviderKind, SearchProvider};
use crate::error::{SearchError, SearchResult};

pub const DEFAULT_VIDEO_SEARCH_URL: &str = "https://www.youtube.com/results";

/// Builds a video-search results link. No network I/O happens here, so a
/// lookup is always "found".
#[derive(Debug, Clone)]
pub struct VideoSearchProvider {
    base_url: String,
}

impl VideoSearchProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }

    pub fn search_url(&self, query: &Query) -> SearchResult<Url> {
        let terms = format!("{} {}", query.artist(), query.song());
        Url::parse_with_params(&self.base_url, &[("search_query", terms.as_str())]).map_err(|e| {
            SearchError::Transport {
                reason: format!("invalid video search URL '{}': {}", self.base_url, e),
            }
        })
    }
}

impl Default for VideoSearchProvider {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_SEARCH_URL)
    }
}

#[async_trait]
impl SearchProvider for VideoSearchProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Youtube
    }

    async fn search(&self, query: &Query) -> SearchResult<LookupResult> {
        let url = self.search_url(query)?;
        debug!("Built video search link for: {}", query);

        Ok(LookupResult::found(
            self.kind(),
            query,
            LookupContent::VideoSearch { url: url.into() },
        ))
    }
}
