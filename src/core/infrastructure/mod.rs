//! Infrastructure and cross-cutting concerns
//!
//! This module contains infrastructure components:
//! - Single-flight LRU cache shared by concurrent callers
//! - Caching decorators for providers and strategies

pub mod cache;
pub mod decorators;

// Re-export main types
pub use cache::{CacheSettings, CacheStats, SingleFlightCache};
pub use decorators::{CachedProvider, CachedStrategy, StrategyKey};
