//! External services integration
//!
//! This module contains the search providers:
//! - `provider`: the `SearchProvider` seam and the result types
//! - `video`: video-search link builder (no network I/O)
//! - `lyrics`: remote lyrics lookup client

pub mod lyrics;
pub mod provider;
pub mod video;

// Re-export main types
pub use lyrics::{format_lyrics, LyricsProvider};
pub use provider::{LookupContent, LookupResult, Provider, ProviderKind, SearchProvider};
pub use video::VideoSearchProvider;
