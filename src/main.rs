//! Glycorisk: diabetes risk assessment service
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glycorisk::adapters::mock::{EntropySource, MockGenerator};
use glycorisk::adapters::openai::OpenAiProvider;
use glycorisk::adapters::sanitize::SanitizingMakeWriter;
use glycorisk::application::{AssistedAdapter, ModeResolver, PredictionService};
use glycorisk::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging:
    // - GLYCORISK_LOG_MODE=stdout (default) for container logs
    // - GLYCORISK_LOG_MODE=file writes to GLYCORISK_LOG_FILE
    let log_mode = std::env::var("GLYCORISK_LOG_MODE").unwrap_or_else(|_| "stdout".to_string());

    let (writer, _guard) = if log_mode == "file" {
        let log_file = std::env::var("GLYCORISK_LOG_FILE")
            .unwrap_or_else(|_| "glycorisk.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("opening log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let resolver = ModeResolver::from_config(&config);
    tracing::info!(mode = %resolver.default_mode(), "Default prediction mode");

    // Built whenever a credential exists, even if mock is the default.
    let assisted = OpenAiProvider::from_config(&config)
        .context("building inference provider client")?
        .map(|provider| AssistedAdapter::new(Arc::new(provider), config.provider_timeout));

    let service = Arc::new(PredictionService::new(
        resolver,
        MockGenerator::new(EntropySource),
        assisted,
    ));

    glycorisk::server::serve(config.socket_addr(), service)
        .await
        .context("server error")?;

    tracing::info!("Glycorisk shutdown complete.");
    Ok(())
}
