//! Service layer for wiring configuration into lookups
//!
//! - `ProviderFactory` / `StrategyFactory`: map tags to concrete implementations
//! - `Services`: process-wide container of shared cached decorators

pub mod container;
pub mod factory;

pub use container::{Services, SongLookup};
pub use factory::{ProviderFactory, StrategyFactory};
