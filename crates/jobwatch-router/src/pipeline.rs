//! Submission pipeline: parse, change detection, dedup, notify.
//!
//! One run at a time. The change detector's lock doubles as the run lock,
//! so a second submission waits until the first has finished sending.

use jobwatch_domain::traits::{JobLedger, NotificationTransport};
use jobwatch_domain::JobRecord;
use jobwatch_extractor::{ChangeDetector, ExtractorError, ListingParser};
use jobwatch_notify::{DispatchReport, Notifier, TransportError};
use jobwatch_store::{SqliteStore, StoreError};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Notifier over any boxed transport
pub type DynNotifier = Notifier<dyn NotificationTransport<Error = TransportError>>;

/// Pipeline error
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Document could not be parsed
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractorError),

    /// Ledger read or write failed
    #[error("Ledger failure: {0}")]
    Store(#[from] StoreError),

    /// A previous run panicked while holding the ledger
    #[error("Ledger lock poisoned")]
    LedgerPoisoned,
}

/// One captured page
#[derive(Debug, Clone)]
pub struct Submission {
    /// Correlation id for logs
    pub id: Uuid,
    /// Raw page HTML
    pub html: String,
    /// Where the page was captured
    pub source_url: Option<String>,
    /// Document title at capture time
    pub page_title: Option<String>,
    /// Capture time as reported by the sender
    pub captured_at: Option<String>,
}

impl Submission {
    /// New submission with a fresh id
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            html: html.into(),
            source_url: None,
            page_title: None,
            captured_at: None,
        }
    }
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Listings found in the document
    pub parsed: usize,
    /// Whether the page differed from the previous run
    pub changed: bool,
    /// Listings skipped because the ledger already had them
    pub already_seen: usize,
    /// Listings handed to the notifier
    pub new_jobs: usize,
    /// Delivery result, when anything was sent
    pub dispatch: Option<DispatchReport>,
}

/// Owns every stage and the state they share
pub struct Pipeline {
    parser: ListingParser,
    detector: tokio::sync::Mutex<ChangeDetector>,
    ledger: Mutex<SqliteStore>,
    notifier: DynNotifier,
}

impl Pipeline {
    /// Assemble a pipeline from its stages
    pub fn new(parser: ListingParser, ledger: SqliteStore, notifier: DynNotifier) -> Self {
        Self {
            parser,
            detector: tokio::sync::Mutex::new(ChangeDetector::new()),
            ledger: Mutex::new(ledger),
            notifier,
        }
    }

    /// Number of job identifiers in the ledger
    pub fn seen_jobs(&self) -> Result<u64, PipelineError> {
        let ledger = self.ledger.lock().map_err(|_| PipelineError::LedgerPoisoned)?;
        Ok(ledger.count_jobs()?)
    }

    /// Run one submission through every stage
    pub async fn process(&self, submission: Submission) -> Result<PipelineOutcome, PipelineError> {
        let span = info_span!("submission", id = %submission.id);
        self.run(submission).instrument(span).await
    }

    async fn run(&self, submission: Submission) -> Result<PipelineOutcome, PipelineError> {
        let mut detector = self.detector.lock().await;

        debug!(
            url = submission.source_url.as_deref().unwrap_or("-"),
            title = submission.page_title.as_deref().unwrap_or("-"),
            bytes = submission.html.len(),
            "Processing page"
        );

        let jobs = self.parser.parse(&submission.html)?;
        let mut outcome = PipelineOutcome {
            parsed: jobs.len(),
            ..Default::default()
        };

        if !detector.has_changed(&jobs)? {
            info!(listings = outcome.parsed, "Page unchanged since last run");
            return Ok(outcome);
        }
        outcome.changed = true;

        // A page that was never admitted must count as changed next time
        let fresh = match self.admit(jobs, &mut outcome) {
            Ok(fresh) => fresh,
            Err(e) => {
                detector.reset();
                return Err(e);
            }
        };
        info!(
            listings = outcome.parsed,
            new = outcome.new_jobs,
            seen = outcome.already_seen,
            "Dedup complete"
        );

        if !fresh.is_empty() {
            outcome.dispatch = Some(self.notifier.notify(&fresh).await);
        }

        Ok(outcome)
    }

    /// Drop listings already in the ledger and record the rest
    ///
    /// Identifiers are recorded on admission, before any send, so a crash
    /// mid-dispatch never notifies the same job twice.
    fn admit(
        &self,
        jobs: Vec<JobRecord>,
        outcome: &mut PipelineOutcome,
    ) -> Result<Vec<JobRecord>, PipelineError> {
        let mut ledger = self.ledger.lock().map_err(|_| PipelineError::LedgerPoisoned)?;
        let mut fresh = Vec::with_capacity(jobs.len());

        for job in jobs {
            let Some(uid) = job.uid.clone() else {
                warn!(index = job.index, "Listing has no identifier, notifying without ledger entry");
                fresh.push(job);
                continue;
            };

            if ledger.has_seen(&uid)? {
                outcome.already_seen += 1;
                continue;
            }

            match ledger.mark_seen(&uid) {
                Ok(_) => fresh.push(job),
                Err(StoreError::Duplicate(id)) => {
                    // Same identifier twice on one page
                    debug!(job = %id, "Duplicate listing skipped");
                    outcome.already_seen += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        outcome.new_jobs = fresh.len();
        Ok(fresh)
    }
}
