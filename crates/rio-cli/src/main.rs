//! rioctl: inspect and adjust services in a rio console resource file.
//!
//! # Usage
//!
//! ```text
//! rioctl --store services.json show default/api
//! rioctl scale default/api --up 2
//! rioctl weight default/api 25
//! rioctl pause default/api
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rio_core::ConsoleConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "rioctl",
    about = "rio console: service scale, weight and rollout control",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to console.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Resource file (overrides [store].path)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List service ids in the store
    List,
    /// Show the scale, weight and available actions of a service
    Show {
        id: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Scale a service up or down by a number of replicas.
    ///
    /// Steps are buffered and written once, after the debounce window.
    Scale {
        id: String,
        #[arg(long, default_value_t = 0)]
        up: u32,
        #[arg(long, default_value_t = 0)]
        down: u32,
    },
    /// Set the traffic weight of a service
    Weight { id: String, weight: f64 },
    /// Pause a service's rollout
    Pause { id: String },
    /// Resume a service's rollout
    Resume { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(config.log_filter()))?,
        )
        .init();

    let store = cli.store.unwrap_or_else(|| config.store_path());
    let debounce = config.scale_debounce();

    match cli.command {
        Commands::List => commands::show::list(&store).await,
        Commands::Show { id, format } => commands::show::show(&store, &id, &format).await,
        Commands::Scale { id, up, down } => {
            commands::update::scale(&store, &id, up, down, debounce).await
        }
        Commands::Weight { id, weight } => commands::update::weight(&store, &id, weight).await,
        Commands::Pause { id } => commands::update::pause(&store, &id, true).await,
        Commands::Resume { id } => commands::update::pause(&store, &id, false).await,
    }
}
