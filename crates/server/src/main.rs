mod bootstrap;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sentinel_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "prime-sentinel",
    about = "Slack bot with quote and school code plugins",
    after_help = "Examples:\n  prime-sentinel --config prime-sentinel.toml\n  \
                  prime-sentinel --check"
)]
struct Cli {
    #[arg(long, value_name = "PATH", help = "Config file (defaults to prime-sentinel.toml)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Validate config, print the loaded plugins as JSON and exit")]
    check: bool,
}

fn init_logging(config: &AppConfig) {
    use sentinel_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };
    // Configuration errors abort before any plugin is built.
    let config = AppConfig::load(options)?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config);
    if cli.check {
        println!("{}", serde_json::to_string_pretty(&app.summary)?);
        return Ok(());
    }

    app.slack_runner.start().await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bot_name = %app.config.bot.name,
        "prime-sentinel started"
    );
    wait_for_shutdown().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "prime-sentinel stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
