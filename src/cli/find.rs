use anyhow::Result;
use clap::Args;
use tracing::info;

use musicfinder::Query;

#[derive(Args)]
pub struct FindArgs {
    /// Artist name
    artist: String,

    /// Song title
    song: String,
}

pub async fn execute(args: FindArgs) -> Result<()> {
    let query = Query::new(&args.artist, &args.song)?;

    info!("Searching for: {}", query);
    println!("Results for {}", query);
    Ok(())
}
