//! Command Line Interface module
//!
//! - `status`: liveness check
//! - `song`: video link and lyrics together
//! - `find`: sanitize and echo a query
//! - `search`: provider lookup, optionally through a strategy
//! - `config`: inspect the effective configuration

pub mod config;
pub mod find;
pub mod search;
pub mod song;
pub mod status;

use anyhow::Result;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
