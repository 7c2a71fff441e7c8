use anyhow::Result;
use clap::Args;
use tracing::info;

use musicfinder::{Query, Services};

#[derive(Args)]
pub struct SearchArgs {
    /// Artist name
    artist: String,

    /// Song title
    song: String,

    /// Provider to search (youtube, lyrics)
    #[arg(short, long)]
    provider: String,

    /// Match strategy applied to the provider's result (exact, fuzzy)
    #[arg(short, long)]
    strategy: Option<String>,

    /// Build a fresh provider instead of using the shared caches
    #[arg(long)]
    no_cache: bool,
}

pub async fn execute(args: SearchArgs, services: &Services) -> Result<()> {
    let query = Query::new(&args.artist, &args.song)?;

    let result = services
        .search(&query, &args.provider, args.strategy.as_deref(), !args.no_cache)
        .await?;

    if !result.is_found() {
        info!("No match for {} via {}", query, result.provider);
    }

    super::print_json(&result)
}
