use clap::{Parser, Subcommand};

mod cli;

use musicfinder::error::{MusicFinderError, Result};
use musicfinder::utils::logging;
use musicfinder::{Config, Services};

#[derive(Parser)]
#[command(name = "musicfinder")]
#[command(about = "Look up lyrics and video-search links for songs")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the application is running
    Status,

    /// Video link and lyrics for a song
    Song(cli::song::SongArgs),

    /// Validate a query and echo it back
    Find(cli::find::FindArgs),

    /// Search one provider, optionally through a match strategy
    Search(cli::search::SearchArgs),

    /// Show configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose).map_err(MusicFinderError::Internal)?;

    let config = Config::load(cli.config.as_deref())?;

    let outcome = match cli.command {
        Commands::Status => cli::status::execute().await,
        Commands::Find(args) => cli::find::execute(args).await,
        Commands::Config(args) => cli::config::execute(args, &config).await,
        Commands::Song(args) => {
            let services = Services::new(config)?;
            cli::song::execute(args, &services).await
        }
        Commands::Search(args) => {
            let services = Services::new(config)?;
            cli::search::execute(args, &services).await
        }
    };

    outcome.map_err(MusicFinderError::Internal)
}
