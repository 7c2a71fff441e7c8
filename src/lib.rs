//! Song lookup toolkit
//!
//! Validated queries go through pluggable search providers (video-search
//! links, remote lyrics) and optional match strategies (exact, fuzzy). Both
//! can be wrapped in caching decorators that share one in-flight fetch per
//! key and evict least-recently-used entries.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod utils;

pub use config::Config;
pub use crate::core::infrastructure::{CacheSettings, CacheStats, CachedProvider, CachedStrategy, SingleFlightCache};
pub use crate::core::services::{LookupContent, LookupResult, Provider, ProviderKind, SearchProvider};
pub use crate::core::strategy::{SearchStrategy, Strategy, StrategyKind};
pub use crate::core::{sanitize, Query};
pub use error::{MusicFinderError, Result, SearchError, SearchResult, ValidationError};
pub use services::{ProviderFactory, Services, SongLookup, StrategyFactory};
