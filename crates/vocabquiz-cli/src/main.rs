//! vocabquiz CLI: runs the quiz server and inspects stored sessions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "vocabquiz", version, about = "Vocabulary practice quiz server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the REST API
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Address to bind, overriding the config (e.g. "0.0.0.0:3000")
        #[arg(long)]
        bind: Option<String>,
    },

    /// Create a starter vocabquiz.toml
    Init,

    /// Load and check a config file
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List a user's quiz sessions, newest first
    History {
        /// User id
        #[arg(long)]
        user: String,

        /// 1-based page number
        #[arg(long)]
        page: Option<usize>,

        /// Sessions per page
        #[arg(long)]
        limit: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show per-word results of a session
    Results {
        /// Session id
        #[arg(long)]
        session: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vocabquiz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, bind } => commands::serve::execute(config, bind).await,
        Commands::Init => commands::init::execute(),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::History {
            user,
            page,
            limit,
            config,
        } => commands::history::execute(user, page, limit, config).await,
        Commands::Results { session, config } => {
            commands::results::execute(session, config).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
