//! `anilink` CLI - resolve episodes into playable media links

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anilink")]
#[command(about = "Resolve anime episodes into ranked, playable media links")]
#[command(version)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/anilink/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one episode into ranked media links
    Resolve {
        /// Show ID on the metadata API
        show_id: String,

        /// Episode label, e.g. "1" or "12.5"
        episode: String,

        /// Resolve the dubbed translation instead of subbed
        #[arg(long)]
        dub: bool,

        /// Pick one link by quality label ("best", "1080p", "HLS Master", ...)
        #[arg(short, long)]
        quality: Option<String>,

        /// Only keep direct MP4 links
        #[arg(long)]
        mp4_only: bool,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Search shows by title
    Search {
        /// Title to search for
        query: String,

        /// Count dubbed episodes instead of subbed
        #[arg(long)]
        dub: bool,

        /// Maximum number of results
        #[arg(short, long, default_value = "40")]
        limit: u32,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List a show's available episodes
    Episodes {
        /// Show ID on the metadata API
        show_id: String,

        /// List dubbed episodes instead of subbed
        #[arg(long)]
        dub: bool,
    },

    /// Show provider success rates and latency
    Rankings {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable
    let default_level = if cli.verbose { "anilink=debug" } else { "anilink=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = anilink::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve {
            show_id,
            episode,
            dub,
            quality,
            mp4_only,
            json,
        } => {
            let opts = cmd::resolve::ResolveOptions {
                mode: cmd::translation(dub),
                quality: quality.map(|q| q.parse().unwrap_or_default()),
                mp4_only,
                json,
            };
            cmd::resolve::cmd_resolve(config, &show_id, &episode, &opts).await?;
        }
        Commands::Search { query, dub, limit, json } => {
            cmd::catalog::cmd_search(&config, &query, cmd::translation(dub), limit, json).await?;
        }
        Commands::Episodes { show_id, dub } => {
            cmd::catalog::cmd_episodes(&config, &show_id, cmd::translation(dub)).await?;
        }
        Commands::Rankings { json } => {
            cmd::rankings::cmd_rankings(json)?;
        }
    }

    Ok(())
}
