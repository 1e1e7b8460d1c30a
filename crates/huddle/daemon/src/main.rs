//! Huddle Daemon - Voice channel placement service
//!
//! The huddle daemon provides:
//! - `$play` handling: seat a member in the first voice channel with room
//! - On-demand channel provisioning when every channel is full
//! - Periodic onboarding announcements in the lobby

use clap::Parser;
use huddle_daemon::{DaemonConfig, DaemonResult, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Huddle Daemon CLI
#[derive(Parser)]
#[command(name = "huddled")]
#[command(about = "Huddle Daemon - Voice channel placement service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "HUDDLE_CONFIG")]
    config: Option<String>,

    /// Voice channel category, overrides the configuration file
    #[arg(long, env = "HUDDLE_CATEGORY")]
    category: Option<String>,

    /// Provision a new channel when every channel is full
    #[arg(long)]
    create_channels: bool,

    /// Log level
    #[arg(long, env = "HUDDLE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "HUDDLE_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())?;

    // Override with CLI args
    if let Some(category) = cli.category {
        config.placement.category = category;
    }
    if cli.create_channels {
        config.placement.can_create = true;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    println!(
        "Huddle daemon {}\n  Category: {}\n  Capacity: {}\n  Channel creation: {}\n",
        env!("CARGO_PKG_VERSION"),
        config.placement.category,
        config.placement.capacity,
        if config.placement.can_create { "enabled" } else { "disabled" },
    );

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await
}
