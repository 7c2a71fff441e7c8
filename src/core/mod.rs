//! Core lookup functionality
//!
//! This module contains the lookup layer organized into logical parts:
//! - `query`: input sanitization and the normalized `Query` type
//! - `services`: search providers for external sources
//! - `strategy`: exact and fuzzy match policies over a provider
//! - `infrastructure`: cross-cutting concerns (single-flight cache, decorators)

pub mod infrastructure;
pub mod query;
pub mod services;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types for convenience
pub use query::{sanitize, Query};
