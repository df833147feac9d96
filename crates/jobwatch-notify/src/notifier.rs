//! Notifier
//!
//! Delivers formatted jobs through a `NotificationTransport`. Each send is
//! one attempt bounded by the send timeout. A failed item is reported and
//! the batch carries on; already-sent messages are never re-sent.

use crate::config::{DispatchMode, NotifyConfig};
use crate::error::TransportError;
use crate::format::{format_detailed, paginate, FormatOptions};
use jobwatch_domain::traits::NotificationTransport;
use jobwatch_domain::{JobRecord, MessageId, SendOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a failed send was carrying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailedItem {
    /// Detailed message for the job with this display id
    Job(String),
    /// Summary page, numbered from 1
    Page(usize),
}

/// One failed send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFailure {
    /// What was being sent
    pub item: FailedItem,
    /// Why it failed
    pub error: TransportError,
}

/// Outcome of delivering one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages attempted
    pub total: usize,
    /// Messages accepted by the channel
    pub sent: usize,
    /// Messages that failed
    pub failed: usize,
    /// Channel ids of accepted messages, in send order
    pub message_ids: Vec<MessageId>,
    /// Per-item failures, in send order
    pub failures: Vec<SendFailure>,
}

impl DispatchReport {
    /// Whether every message was delivered
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, item: FailedItem, result: Result<MessageId, TransportError>) {
        self.total += 1;
        match result {
            Ok(id) => {
                self.sent += 1;
                self.message_ids.push(id);
            }
            Err(error) => {
                self.failed += 1;
                self.failures.push(SendFailure { item, error });
            }
        }
    }
}

/// Formats jobs and pushes them to the channel
pub struct Notifier<T: ?Sized> {
    transport: Arc<T>,
    config: NotifyConfig,
    format: FormatOptions,
    send_timeout: Duration,
}

impl<T> Notifier<T>
where
    T: NotificationTransport<Error = TransportError> + ?Sized,
{
    /// Create a notifier over `transport`
    pub fn new(transport: Arc<T>, config: NotifyConfig) -> Self {
        let format = FormatOptions::from_config(&config);
        let send_timeout = config.send_timeout();
        Self {
            transport,
            config,
            format,
            send_timeout,
        }
    }

    /// Override the per-send timeout
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// Render parameters derived from the configuration
    pub fn format_options(&self) -> &FormatOptions {
        &self.format
    }

    fn send_options(&self, suppress_link_preview: bool) -> SendOptions {
        SendOptions {
            parse_mode: self.config.parse_mode,
            suppress_link_preview,
            silent: self.config.silent,
        }
    }

    async fn deliver(&self, text: &str, options: SendOptions) -> Result<MessageId, TransportError> {
        match tokio::time::timeout(self.send_timeout, self.transport.send(text, &options)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }

    /// Send a pre-rendered text as-is
    pub async fn send_text(&self, text: &str) -> Result<MessageId, TransportError> {
        self.deliver(text, self.send_options(false)).await
    }

    /// Send one job as a detailed message
    pub async fn send_job(&self, job: &JobRecord) -> Result<MessageId, TransportError> {
        let text = format_detailed(job, &self.format);
        self.deliver(&text, self.send_options(false)).await
    }

    /// Deliver a batch in the configured mode
    pub async fn notify(&self, jobs: &[JobRecord]) -> DispatchReport {
        match self.config.mode {
            DispatchMode::Grouped => self.send_grouped(jobs).await,
            DispatchMode::Individual => self.send_individually(jobs).await,
        }
    }

    /// One paginated summary, pages spaced by the inter-message delay
    pub async fn send_grouped(&self, jobs: &[JobRecord]) -> DispatchReport {
        let mut report = DispatchReport::default();
        let pages = paginate(jobs, &self.format);
        let page_count = pages.len();

        for (i, page) in pages.into_iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }

            let number = i + 1;
            let result = self.deliver(&page.text, self.send_options(true)).await;
            match &result {
                Ok(id) => debug!(page = number, of = page_count, jobs = page.jobs, message_id = id, "Summary page sent"),
                Err(e) => warn!(page = number, of = page_count, error = %e, "Summary page failed"),
            }
            report.record(FailedItem::Page(number), result);
        }

        info!(jobs = jobs.len(), pages = report.total, failed = report.failed, "Grouped notification finished");
        report
    }

    /// One detailed message per job, in input order
    ///
    /// The delay separates consecutive sends; none follows the last one.
    pub async fn send_individually(&self, jobs: &[JobRecord]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (i, job) in jobs.iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }

            let id = job.display_id();
            let result = self.send_job(job).await;
            if let Err(e) = &result {
                warn!(job = %id, error = %e, "Job notification failed");
            }
            report.record(FailedItem::Job(id), result);
        }

        info!(jobs = jobs.len(), sent = report.sent, failed = report.failed, "Individual notifications finished");
        report
    }

    async fn pause(&self) {
        let delay = self.config.inter_message_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    fn job(index: usize) -> JobRecord {
        let mut job = JobRecord::new(index);
        job.uid = Some(format!("uid-{}", index));
        job.job_title = Some(format!("Job number {}", index));
        job
    }

    fn config(mode: DispatchMode) -> NotifyConfig {
        NotifyConfig {
            mode,
            inter_message_delay_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_individual_timeout_continues() {
        let mock = MockTransport::new().delay_on(2, Duration::from_secs(1));
        let notifier = Notifier::new(Arc::new(mock.clone()), config(DispatchMode::Individual))
            .with_send_timeout(Duration::from_millis(50));

        let jobs = vec![job(0), job(1), job(2)];
        let report = notifier.notify(&jobs).await;

        assert_eq!(report.total, 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.is_success());
        assert_eq!(
            report.failures[0],
            SendFailure {
                item: FailedItem::Job("uid-1".to_string()),
                error: TransportError::Timeout,
            }
        );
        assert_eq!(mock.call_count(), 3);
        assert!(mock.texts()[1].contains("Job number 2"));
    }

    #[tokio::test]
    async fn test_grouped_single_message() {
        let mock = MockTransport::new();
        let notifier = Notifier::new(Arc::new(mock.clone()), config(DispatchMode::Grouped));

        let report = notifier.notify(&[job(0), job(1)]).await;

        assert!(report.is_success());
        assert_eq!(report.sent, 1);
        assert_eq!(report.message_ids, vec![1]);

        let delivered = mock.delivered();
        assert!(delivered[0].text.contains("New jobs available (2)"));
        assert!(delivered[0].options.suppress_link_preview);
    }

    #[tokio::test]
    async fn test_grouped_page_failure_keeps_going() {
        let jobs: Vec<_> = (0..30).map(job).collect();
        let mock = MockTransport::new().fail_on(
            2,
            TransportError::Api {
                status: 429,
                description: "Too Many Requests".to_string(),
            },
        );
        let notifier = Notifier::new(
            Arc::new(mock.clone()),
            NotifyConfig {
                char_budget: 300,
                ..config(DispatchMode::Grouped)
            },
        );

        let report = notifier.send_grouped(&jobs).await;

        assert!(report.total >= 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].item, FailedItem::Page(2));
        assert_eq!(mock.call_count(), report.total);
        assert!(mock.texts().iter().all(|t| crate::format::wire_len(t) <= 300));
    }

    #[tokio::test]
    async fn test_silent_flag_applies_to_every_send() {
        let mock = MockTransport::new();
        let notifier = Notifier::new(
            Arc::new(mock.clone()),
            NotifyConfig {
                silent: true,
                ..config(DispatchMode::Individual)
            },
        );

        notifier.send_text("hello").await.unwrap();
        notifier.notify(&[job(0)]).await;

        assert!(mock.delivered().iter().all(|m| m.options.silent));
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let mock = MockTransport::new();
        let notifier = Notifier::new(Arc::new(mock.clone()), config(DispatchMode::Grouped));

        let report = notifier.notify(&[]).await;
        assert_eq!(report, DispatchReport::default());
        assert_eq!(mock.call_count(), 0);
    }
}
