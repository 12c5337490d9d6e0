//! imgrelay - HTTP relay for text-to-image generation APIs.
//!
//! A small proxy that routes generation prompts to third-party image APIs
//! and returns either a redirect or the raw image bytes.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgrelay::config::Config;
use imgrelay::proxy::run_server;
use imgrelay::router::Catalog;

#[derive(Parser)]
#[command(name = "imgrelay")]
#[command(about = "HTTP relay for text-to-image generation APIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration file
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },

    /// Show available models and how each is dispatched
    Models {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgrelay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            tracing::info!(config = %config, "Loading configuration");
            let mut config = Config::load(&config)?;

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            run_server(config).await
        }

        Commands::Check { config } => {
            let config = Config::from_file(&config)?;
            println!("Configuration OK");
            println!("  listen: {}", config.server.listen);
            println!("  upstream timeout: {}s", config.upstream.timeout_secs);
            Ok(())
        }

        Commands::Models { config } => {
            let config = Config::load(&config)?;
            let catalog = Catalog::new(&config.upstream)?;

            for spec in catalog.specs() {
                println!("{} ({})", spec.name, spec.dispatch.kind());
            }
            Ok(())
        }
    }
}
