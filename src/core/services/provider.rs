use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::query::Query;
use crate::core::services::lyrics::LyricsProvider;
use crate::core::services::video::VideoSearchProvider;
use crate::error::{SearchError, SearchResult};

/// The closed set of lookup sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Youtube,
    Lyrics,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Youtube, ProviderKind::Lyrics];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Youtube => "youtube",
            ProviderKind::Lyrics => "lyrics",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = SearchError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| SearchError::UnsupportedProvider(tag.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupContent {
    VideoSearch { url: String },
    Lyrics { text: String },
}

/// Outcome of one lookup. `content` is `None` for a not-found outcome,
/// which is a successful result rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub provider: ProviderKind,
    /// Artist as reported by the provider for this result
    pub artist: String,
    /// Song title as reported by the provider for this result
    pub song: String,
    pub content: Option<LookupContent>,
    /// Not found because the remote could not be reached, not because it has
    /// no answer. Served to current callers but never cached.
    #[serde(skip)]
    pub degraded: bool,
}

impl LookupResult {
    pub fn found(provider: ProviderKind, query: &Query, content: LookupContent) -> Self {
        Self {
            provider,
            artist: query.artist().to_string(),
            song: query.song().to_string(),
            content: Some(content),
            degraded: false,
        }
    }

    pub fn not_found(provider: ProviderKind, query: &Query) -> Self {
        Self {
            provider,
            artist: query.artist().to_string(),
            song: query.song().to_string(),
            content: None,
            degraded: false,
        }
    }

    /// Not found after the remote failed.
    pub fn unavailable(provider: ProviderKind, query: &Query) -> Self {
        Self {
            degraded: true,
            ..Self::not_found(provider, query)
        }
    }

    /// Whether a caching layer may keep this result.
    pub fn is_cacheable(&self) -> bool {
        !self.degraded
    }

    pub fn is_found(&self) -> bool {
        self.content.is_some()
    }

    /// The link or lyrics text, if found.
    pub fn text(&self) -> Option<&str> {
        match self.content.as_ref()? {
            LookupContent::VideoSearch { url } => Some(url),
            LookupContent::Lyrics { text } => Some(text),
        }
    }
}

/// One external lookup source.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn search(&self, query: &Query) -> SearchResult<LookupResult>;
}

/// Concrete provider selected by [`ProviderFactory`](crate::services::ProviderFactory).
pub enum Provider {
    Video(VideoSearchProvider),
    Lyrics(LyricsProvider),
}

#[async_trait]
impl SearchProvider for Provider {
    fn kind(&self) -> ProviderKind {
        match self {
            Provider::Video(provider) => provider.kind(),
            Provider::Lyrics(provider) => provider.kind(),
        }
    }

    async fn search(&self, query: &Query) -> SearchResult<LookupResult> {
        match self {
            Provider::Video(provider) => provider.search(query).await,
            Provider::Lyrics(provider) => provider.search(query).await,
        }
    }
}
