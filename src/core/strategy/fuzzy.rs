use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::core::query::Query;
use crate::core::services::provider::{LookupResult, SearchProvider};
use crate::core::strategy::{SearchStrategy, StrategyKind};
use crate::error::SearchResult;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

const SONG_WEIGHT: f64 = 0.6;
const ARTIST_WEIGHT: f64 = 0.4;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,()\-]").expect("punctuation pattern is valid"));

/// Weighted normalized-Levenshtein similarity of the candidate's names to
/// the query's, compared case-insensitively. 1.0 is identical.
pub fn similarity(query: &Query, candidate: &LookupResult) -> f64 {
    let artist = strsim::normalized_levenshtein(
        &query.artist().to_lowercase(),
        &candidate.artist.to_lowercase(),
    );
    let song = strsim::normalized_levenshtein(
        &query.song().to_lowercase(),
        &candidate.song.to_lowercase(),
    );

    SONG_WEIGHT * song + ARTIST_WEIGHT * artist
}

/// Replace punctuation with spaces and collapse whitespace. Apostrophes
/// inside a word (`Don't`) are kept. `None` when nothing changes or nothing
/// valid is left.
pub fn simplify(query: &Query) -> Option<Query> {
    let simple = Query::new(&strip(query.artist()), &strip(query.song())).ok()?;
    (simple != *query).then_some(simple)
}

fn strip(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let apostrophes_in_words: String = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let in_word = i > 0
                && chars[i - 1].is_alphanumeric()
                && chars.get(i + 1).is_some_and(|next| next.is_alphanumeric());
            if c == '\'' && !in_word {
                ' '
            } else {
                c
            }
        })
        .collect();

    let spaced = PUNCTUATION.replace_all(&apostrophes_in_words, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accepts the provider's candidate when its similarity to the query reaches
/// the threshold.
#[derive(Debug, Clone, Copy)]
pub struct FuzzySearchStrategy {
    threshold: f64,
}

impl FuzzySearchStrategy {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn matches(&self, query: &Query, candidate: &LookupResult) -> bool {
        candidate.is_found() && similarity(query, candidate) >= self.threshold
    }
}

impl Default for FuzzySearchStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

#[async_trait]
impl SearchStrategy for FuzzySearchStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fuzzy
    }

    async fn resolve(
        &self,
        query: &Query,
        provider: Arc<dyn SearchProvider>,
    ) -> SearchResult<LookupResult> {
        let mut candidate = provider.search(query).await?;

        if !candidate.is_found() {
            if let Some(simple) = simplify(query) {
                debug!("No result for {}, retrying as {}", query, simple);
                candidate = provider.search(&simple).await?;
            }
        }

        if candidate.degraded {
            return Ok(LookupResult::unavailable(provider.kind(), query));
        }
        if self.matches(query, &candidate) {
            return Ok(candidate);
        }

        if candidate.is_found() {
            debug!(
                "Fuzzy match rejected for {}: '{} - {}' scored {:.3} (threshold {:.2})",
                query,
                candidate.artist,
                candidate.song,
                similarity(query, &candidate),
                self.threshold
            );
        }
        Ok(LookupResult::not_found(provider.kind(), query))
    }
}
