use anyhow::Result;
use clap::Args;
use serde_json::json;

use musicfinder::{Query, Services};

#[derive(Args)]
pub struct SongArgs {
    /// Artist name
    artist: String,

    /// Song title
    song: String,
}

pub async fn execute(args: SongArgs, services: &Services) -> Result<()> {
    let query = Query::new(&args.artist, &args.song)?;
    let lookup = services.song(&query).await?;

    let lyrics = lookup
        .lyrics
        .text()
        .map(str::to_string)
        .unwrap_or_else(|| json!({ "error": "Lyrics not found" }).to_string());

    super::print_json(&json!({
        "song": query.song(),
        "artist": query.artist(),
        "youtubeSearch": lookup.video.text(),
        "lyrics": lyrics,
    }))
}
