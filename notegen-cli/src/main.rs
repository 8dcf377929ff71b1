//! # notegen CLI
//!
//! Command-line interface for the notegen static site generator.

mod api;
mod assets;
mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "notegen.yml", env = "NOTEGEN_CONFIG")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    Build,

    /// Serve the site from memory with JSON APIs
    Serve {
        /// Server port (defaults to server.port from the config)
        #[arg(long)]
        port: Option<u16>,

        /// Rebuild the index when content changes
        #[arg(long)]
        watch: bool,
    },

    /// Search titles, bodies and tags
    Search {
        /// Search query
        query: String,

        /// Maximum results to return
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },

    /// List notes matching category, tag and date criteria
    List {
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        tag: Option<String>,

        /// Earliest date (YYYY-MM-DD), inclusive
        #[arg(long)]
        from: Option<String>,

        /// Latest date (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: Option<String>,

        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },

    /// Fetch a single note by url
    Note {
        /// Note url, e.g. /math/limits
        url: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = NoteFormat::Json)]
        format: NoteFormat,

        /// Number of related notes to include (defaults to related_limit)
        #[arg(long)]
        related: Option<usize>,
    },

    /// Report files that could not be indexed
    Check {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub enum NoteFormat {
    Json,
    Html,
    Metadata,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build => commands::build_site(&cli.config),
        Commands::Serve { port, watch } => commands::serve(&cli.config, port, watch).await,
        Commands::Search { query, limit, json } => {
            commands::search_notes(&cli.config, &query, limit, json)
        }
        Commands::List {
            category,
            tag,
            from,
            to,
            json,
        } => {
            let params = notegen_core::FilterParams {
                category,
                tag,
                from,
                to,
            };
            commands::list_notes(&cli.config, &params, json)
        }
        Commands::Note {
            url,
            format,
            related,
        } => commands::show_note(&cli.config, &url, format, related),
        Commands::Check { json } => commands::check_content(&cli.config, json),
    }
}
