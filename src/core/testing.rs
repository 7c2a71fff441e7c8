//! Stub provider shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::query::Query;
use crate::core::services::provider::{LookupContent, LookupResult, ProviderKind, SearchProvider};
use crate::error::{SearchError, SearchResult};

type Answer = Box<dyn Fn(&Query) -> Option<(String, String)> + Send + Sync>;

/// Answers from a closure and records every query it receives.
pub(crate) struct StubProvider {
    kind: ProviderKind,
    answer: Answer,
    delay: Option<Duration>,
    degraded: bool,
    failures_left: AtomicUsize,
    calls: AtomicUsize,
    queries: Mutex<Vec<Query>>,
}

impl StubProvider {
    pub(crate) fn new<F>(kind: ProviderKind, answer: F) -> Self
    where
        F: Fn(&Query) -> Option<(String, String)> + Send + Sync + 'static,
    {
        Self {
            kind,
            answer: Box::new(answer),
            delay: None,
            degraded: false,
            failures_left: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Always reports the given artist/song, whatever was asked.
    pub(crate) fn canonical(kind: ProviderKind, artist: &str, song: &str) -> Self {
        let (artist, song) = (artist.to_string(), song.to_string());
        Self::new(kind, move |_| Some((artist.clone(), song.clone())))
    }

    /// Reports exactly what was asked.
    pub(crate) fn echo(kind: ProviderKind) -> Self {
        Self::new(kind, |q| Some((q.artist().to_string(), q.song().to_string())))
    }

    /// Never finds anything.
    pub(crate) fn missing(kind: ProviderKind) -> Self {
        Self::new(kind, |_| None)
    }

    /// Never finds anything, as if the remote were down.
    pub(crate) fn unreachable(kind: ProviderKind) -> Self {
        Self {
            degraded: true,
            ..Self::missing(kind)
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the first `count` calls with a transport error.
    pub(crate) fn failing_first(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn search(&self, query: &Query) -> SearchResult<LookupResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SearchError::Transport {
                reason: "stub failure".to_string(),
            });
        }

        Ok(match (self.answer)(query) {
            Some((artist, song)) => LookupResult {
                provider: self.kind,
                artist,
                song,
                content: Some(LookupContent::Lyrics {
                    text: format!("lyrics for {}", query),
                }),
                degraded: false,
            },
            None if self.degraded => LookupResult::unavailable(self.kind, query),
            None => LookupResult::not_found(self.kind, query),
        })
    }
}
