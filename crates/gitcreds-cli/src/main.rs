//! gitcreds - Git credentials file generator for pipelines

mod commands;

use clap::{Parser, Subcommand};
use commands::CredentialsArgs;
use gitcreds_config::GlobalConfig;
use gitcreds_core::CREDENTIALS_FROM_SECRET_ENV;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gitcreds")]
#[command(author, version, about = "Git credentials file generator", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this global config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the Git credentials file for the current pipeline
    Credentials(CredentialsArgs),

    /// Show the global configuration
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for --stdout output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => GlobalConfig::config_path()?,
    };
    let config = GlobalConfig::load_from(&config_path)?;

    match cli.command {
        Commands::Credentials(args) => {
            // Resolved once here and passed down explicitly
            let secret_override = std::env::var(CREDENTIALS_FROM_SECRET_ENV)
                .ok()
                .filter(|s| !s.is_empty());
            if secret_override.is_some() {
                tracing::info!(
                    "Overriding credentials secret from env var {}",
                    CREDENTIALS_FROM_SECRET_ENV
                );
            }
            commands::credentials(args, &config, secret_override).await?;
        }
        Commands::Config => {
            commands::config(&config, &config_path)?;
        }
    }

    Ok(())
}
