//! Jobwatch Service
//!
//! Accepts captured listing pages over HTTP (or fetches them with the poll
//! worker) and runs them through parse, change detection, dedup and
//! notification.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod pipeline;
pub mod poller;

use config::AppConfig;
use handlers::{create_router, AppState};
use jobwatch_domain::traits::NotificationTransport;
use jobwatch_extractor::{ExtractorError, ListingParser};
use jobwatch_notify::{Notifier, TelegramTransport, TransportError};
use jobwatch_store::{SqliteStore, StoreError};
use pipeline::Pipeline;
use poller::{PollError, PollWorker};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Service error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Listing parser could not be built
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Ledger could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Transport could not be built
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Poll worker could not be built
    #[error("Poller error: {0}")]
    Poller(#[from] PollError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the pipeline described by `config` around `transport`
pub fn build_pipeline(
    config: &AppConfig,
    transport: Arc<dyn NotificationTransport<Error = TransportError>>,
) -> Result<Pipeline, RouterError> {
    let parser = ListingParser::new(&config.extractor)?;
    let store = SqliteStore::new(&config.database_path)?;
    let notifier = Notifier::new(transport, config.notify.clone());

    Ok(Pipeline::new(parser, store, notifier))
}

/// Start the HTTP server
///
/// Opens the ledger, checks the Bot API, starts the optional poll worker
/// and serves until Ctrl+C.
pub async fn start_server(config: AppConfig) -> Result<(), RouterError> {
    config.validate()?;

    info!("Starting Jobwatch");
    info!("Bind address: {}", config.bind_addr());
    info!("Ledger: {}", config.database_path);
    info!("Dispatch mode: {:?}", config.notify.mode);

    let telegram = TelegramTransport::new(&config.telegram, config.notify.send_timeout())?;
    match telegram.check_connection().await {
        Ok(bot) => info!("Bot API connected as {}", bot.username.as_deref().unwrap_or(&bot.first_name)),
        Err(e) => warn!("Bot API check failed, continuing: {}", e),
    }

    let pipeline = Arc::new(build_pipeline(&config, Arc::new(telegram))?);

    if let Some(poller_config) = config.poller.clone() {
        let worker = PollWorker::new(poller_config, pipeline.clone())?;
        tokio::spawn(async move { worker.run().await });
    }

    // Create router
    let app = create_router(AppState { pipeline });

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    info!("Jobwatch stopped");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use jobwatch_notify::MockTransport;

    /// App state over an in-memory ledger and a mock transport
    pub fn test_state() -> (AppState, MockTransport) {
        let mut config = AppConfig::default_test_config();
        config.notify.inter_message_delay_ms = 0;

        let mock = MockTransport::new();
        let pipeline = build_pipeline(&config, Arc::new(mock.clone())).unwrap();
        (AppState { pipeline: Arc::new(pipeline) }, mock)
    }
}
