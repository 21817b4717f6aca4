//! researchdesk - research assistant over Wikipedia, arXiv and news

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ask_command, init_command, serve_command, status_command};

/// researchdesk - ask a research question, get background, papers and news
#[derive(Parser)]
#[command(name = "researchdesk")]
#[command(about = "Research assistant combining Wikipedia, arXiv and news search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the config file
    Init,
    /// Run a research query
    Ask {
        /// Research question; omit for interactive mode
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Start the HTTP server
    Serve {
        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
        /// Listen host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show configuration status
    Status {
        /// Also run a live health check query
        #[arg(short, long)]
        check: bool,
    },
}

fn init_tracing(command: &Commands) {
    let filter = match command {
        Commands::Serve { verbose: true, .. } => EnvFilter::new("debug"),
        Commands::Serve { .. } => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        }
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.command);

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("Init failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Ask { query } => {
            if let Err(e) = ask_command(query).await {
                error!("Research failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Serve {
            verbose: _,
            host,
            port,
        } => {
            if let Err(e) = serve_command(host, port).await {
                error!("Server failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Status { check } => {
            if let Err(e) = status_command(check).await {
                error!("Status failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
