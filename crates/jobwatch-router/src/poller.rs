//! Background worker that fetches the listing page on a schedule

use crate::config::PollerConfig;
use crate::pipeline::{Pipeline, PipelineError, PipelineOutcome, Submission};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Poll worker error
#[derive(Debug, Error)]
pub enum PollError {
    /// Page could not be fetched
    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Fetched page failed in the pipeline
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Pause/resume control for a running worker
///
/// A pause takes effect at the next tick; a fetch already underway
/// completes normally.
#[derive(Clone)]
pub struct PollHandle {
    paused: Arc<watch::Sender<bool>>,
}

impl PollHandle {
    /// Skip ticks until resumed
    pub fn pause(&self) {
        self.paused.send_replace(true);
        tracing::info!("Poller paused");
    }

    /// Resume fetching on the next tick
    pub fn resume(&self) {
        self.paused.send_replace(false);
        tracing::info!("Poller resumed");
    }

    /// Whether ticks are currently skipped
    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }
}

/// Background worker that submits the configured page on every tick
///
/// # Examples
///
/// ```no_run
/// use jobwatch_router::config::PollerConfig;
/// use jobwatch_router::pipeline::Pipeline;
/// use jobwatch_router::poller::PollWorker;
/// use std::sync::Arc;
///
/// # async fn example(pipeline: Arc<Pipeline>) -> Result<(), Box<dyn std::error::Error>> {
/// let config = PollerConfig {
///     url: "https://www.upwork.com/nx/search/jobs/?q=rust".to_string(),
///     interval_secs: 300,
///     fetch_timeout_secs: 30,
/// };
/// let worker = PollWorker::new(config, pipeline)?;
/// let handle = worker.handle();
///
/// // Run indefinitely (until Ctrl+C)
/// worker.run().await;
/// # Ok(())
/// # }
/// ```
pub struct PollWorker {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    pipeline: Arc<Pipeline>,
    paused: Arc<watch::Sender<bool>>,
}

impl PollWorker {
    /// Create a worker for the configured page
    pub fn new(config: PollerConfig, pipeline: Arc<Pipeline>) -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            client,
            interval: config.interval(),
            url: config.url,
            pipeline,
            paused: Arc::new(watch::Sender::new(false)),
        })
    }

    /// Override the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Control handle for pause/resume
    pub fn handle(&self) -> PollHandle {
        PollHandle {
            paused: self.paused.clone(),
        }
    }

    /// Fetch the page once and run it through the pipeline
    ///
    /// Returns `None` when the worker is paused.
    pub async fn tick(&self) -> Result<Option<PipelineOutcome>, PollError> {
        if *self.paused.borrow() {
            tracing::debug!("Poller paused, skipping tick");
            return Ok(None);
        }

        let html = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let submission = Submission {
            source_url: Some(self.url.clone()),
            captured_at: Some(chrono::Utc::now().to_rfc3339()),
            ..Submission::new(html)
        };

        Ok(Some(self.pipeline.process(submission).await?))
    }

    /// Run the worker indefinitely
    ///
    /// Tick failures are logged and the loop continues; only a shutdown
    /// signal (Ctrl+C) stops it.
    pub async fn run(&self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Poll worker started (interval: {:?}, url: {})", self.interval, self.url);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.tick().await {
                        Ok(Some(outcome)) => {
                            tracing::info!(
                                "Poll completed: {} listings, {} new",
                                outcome.parsed,
                                outcome.new_jobs
                            );
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!("Poll failed: {}", e);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping poller");
                    break;
                }
            }
        }
    }

    /// Run for a specific number of ticks (useful for testing)
    pub async fn run_cycles(&self, cycles: usize) -> Result<Vec<Option<PipelineOutcome>>, PollError> {
        let mut ticker = interval(self.interval);
        let mut outcomes = Vec::with_capacity(cycles);

        tracing::info!(
            "Poll worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting poll cycle {}/{}", cycle + 1, cycles);

            match self.tick().await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("Poll {}/{} failed: {}", cycle + 1, cycles, e);
                    return Err(e);
                }
            }
        }

        Ok(outcomes)
    }
}
