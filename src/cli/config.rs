use anyhow::Result;
use clap::{Args, Subcommand};

use musicfinder::config::env::EnvParser;
use musicfinder::Config as AppConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show configuration file path
    Path,
}

pub async fn execute(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            print!("{}", config.to_toml()?);

            let overrides = EnvParser::get_all_musicfinder_vars();
            if !overrides.is_empty() {
                println!();
                println!("# Environment overrides:");
                for (key, value) in overrides {
                    println!("#   {}={}", key, value);
                }
            }
        }

        ConfigCommands::Path => {
            let config_path = AppConfig::config_path()?;
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
