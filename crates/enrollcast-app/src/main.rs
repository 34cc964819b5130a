mod cli;
mod render;
mod repl;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use enrollcast_chat::ChatOrchestrator;
use enrollcast_client::HttpForecastApi;
use enrollcast_core::{EnrollcastConfig, ForecastConfig};

use crate::cli::CliArgs;
use crate::repl::{Command, Repl};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();

    // The log level may come from the config file, so load it under a
    // warn-only subscriber before installing the real one.
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new("warn"))
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        EnrollcastConfig::load_or_default(&config_file)
    });

    // Tracing goes to stderr; stdout belongs to the chat.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Enrollcast v{}", env!("CARGO_PKG_VERSION"));
    info!(path = %config_file.display(), "Configuration loaded");

    if let Err(e) = config.forecast.validate() {
        warn!(error = %e, "Invalid forecast config, using defaults");
        config.forecast = ForecastConfig::default();
    }

    // Backend client.
    let api_url = args.resolve_api_url(&config.api.base_url);
    let timeout = config.api.timeout_secs.map(Duration::from_secs);
    let api = HttpForecastApi::new(api_url, timeout)?;
    info!(api_url = %api.base_url(), "Backend client ready");

    let orchestrator = ChatOrchestrator::new(Arc::new(api), config.forecast, config.chat);
    let mut repl = Repl::new(orchestrator, std::io::stdout());

    // One-shot mode.
    if let Some(message) = args.message {
        repl.execute(Command::Say(message)).await?;
        return Ok(());
    }

    repl.run(BufReader::new(tokio::io::stdin())).await?;
    info!(
        messages = repl.orchestrator().messages().len(),
        "Enrollcast stopped"
    );
    Ok(())
}
