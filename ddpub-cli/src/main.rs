//! # ddpub CLI
//!
//! Validates a notes website and serves it over HTTP.

mod commands;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ddpub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the whole site in memory and report problems
    Check {
        /// Directory holding config.yml and optional config.<lang>.yml files
        #[arg(long, env = "DDPUB_CONFIG")]
        config: PathBuf,

        /// Directory holding the note files
        #[arg(long, env = "DDPUB_NOTES")]
        notes: PathBuf,
    },

    /// Validate the site, then serve it
    Serve {
        /// Directory holding config.yml and optional config.<lang>.yml files
        #[arg(long, env = "DDPUB_CONFIG")]
        config: PathBuf,

        /// Directory holding the note files
        #[arg(long, env = "DDPUB_NOTES")]
        notes: PathBuf,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            // Printing to a closed stream is not worth reporting.
            let _ = err.print();
            std::process::exit(code);
        }
    };

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
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
        Commands::Check { config, notes } => commands::check_site(&config, &notes),
        Commands::Serve {
            config,
            notes,
            host,
            port,
        } => commands::serve_site(&config, &notes, &host, port).await,
    }
}
