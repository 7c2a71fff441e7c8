use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::query::Query;
use crate::core::services::provider::{LookupContent, LookupResult, ProviderKind, SearchProvider};
use crate::error::{NetworkError, SearchResult};

pub const DEFAULT_LYRICS_BASE_URL: &str = "https://api.lyrics.ovh/v1";

/// Marker that replaces each run of newlines in formatted lyrics.
pub const LINE_BREAK: &str = "<br>";

static NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("newline pattern is valid"));

#[derive(Deserialize, Debug)]
struct LyricsResponse {
    lyrics: Option<String>,
}

/// Strip carriage returns, collapse newline runs into [`LINE_BREAK`], trim.
pub fn format_lyrics(raw: &str) -> String {
    let without_cr = raw.replace('\r', "");
    NEWLINES
        .replace_all(&without_cr, LINE_BREAK)
        .trim()
        .to_string()
}

/// Build the HTTP client used for remote lyrics lookups.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, NetworkError> {
    let version = env!("CARGO_PKG_VERSION");
    let user_agent = format!("musicfinder v{}", version);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?;

    Ok(client)
}

/// Fetches lyrics text from a remote endpoint. Remote failures of any kind
/// degrade to a not-found result.
#[derive(Clone)]
pub struct LyricsProvider {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
}

impl LyricsProvider {
    pub fn new(client: reqwest::Client, base_url: &str, max_attempts: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn lyrics_url(&self, query: &Query) -> Result<Url, NetworkError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| NetworkError::InvalidResponse {
            reason: format!("invalid lyrics base URL '{}': {}", self.base_url, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| NetworkError::InvalidResponse {
                reason: format!("lyrics base URL cannot take path segments: {}", self.base_url),
            })?
            .pop_if_empty()
            .push(query.artist())
            .push(query.song());

        Ok(url)
    }

    async fn fetch_lyrics(&self, query: &Query) -> Result<String, NetworkError> {
        let url = self.lyrics_url(query)?;

        // Basic retry with exponential backoff for transient errors
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.fetch_once(url.clone()).await {
                Ok(lyrics) => return Ok(lyrics),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let backoff = 2u64.pow(attempt - 1) * 300; // 300ms, 600ms
                    debug!("Lyrics request attempt {} failed ({}), retrying in {}ms", attempt, e, backoff);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: Url) -> Result<String, NetworkError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout
            } else {
                NetworkError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status));
        }

        let body: LyricsResponse = response
            .json()
            .await
            .map_err(|e| NetworkError::InvalidResponse {
                reason: e.to_string(),
            })?;

        body.lyrics.ok_or_else(|| NetworkError::InvalidResponse {
            reason: "response has no lyrics field".to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for LyricsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Lyrics
    }

    async fn search(&self, query: &Query) -> SearchResult<LookupResult> {
        info!("Fetching lyrics for: {}", query);

        match self.fetch_lyrics(query).await {
            Ok(raw) => {
                let text = format_lyrics(&raw);
                if text.is_empty() {
                    debug!("Remote returned empty lyrics for: {}", query);
                    return Ok(LookupResult::not_found(self.kind(), query));
                }
                Ok(LookupResult::found(self.kind(), query, LookupContent::Lyrics { text }))
            }
            Err(NetworkError::Status(reqwest::StatusCode::NOT_FOUND)) => {
                info!("No lyrics found for: {}", query);
                Ok(LookupResult::not_found(self.kind(), query))
            }
            Err(e) => {
                warn!("Lyrics lookup failed for {}: {}", query, e);
                Ok(LookupResult::unavailable(self.kind(), query))
            }
        }
    }
}
