//! Deterministic in-memory transport for testing

use crate::error::TransportError;
use async_trait::async_trait;
use jobwatch_domain::traits::NotificationTransport;
use jobwatch_domain::{MessageId, SendOptions};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A payload accepted by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    /// Message text
    pub text: String,
    /// Options it was sent with
    pub options: SendOptions,
}

#[derive(Default)]
struct MockState {
    calls: usize,
    delivered: Vec<DeliveredMessage>,
    failures: HashMap<usize, TransportError>,
    delays: HashMap<usize, Duration>,
}

/// Mock transport that records every accepted message
///
/// Calls are numbered from 1. A call can be scripted to fail or to stall,
/// and clones share state so a test can keep a handle after moving one
/// into a notifier.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fail the given call with `error`
    pub fn fail_on(self, call: usize, error: TransportError) -> Self {
        self.state().failures.insert(call, error);
        self
    }

    /// Stall the given call for `delay` before answering
    pub fn delay_on(self, call: usize, delay: Duration) -> Self {
        self.state().delays.insert(call, delay);
        self
    }

    /// Number of send attempts so far
    pub fn call_count(&self) -> usize {
        self.state().calls
    }

    /// Messages accepted so far, in order
    pub fn delivered(&self) -> Vec<DeliveredMessage> {
        self.state().delivered.clone()
    }

    /// Texts of accepted messages, in order
    pub fn texts(&self) -> Vec<String> {
        self.state().delivered.iter().map(|m| m.text.clone()).collect()
    }
}

#[async_trait]
impl NotificationTransport for MockTransport {
    type Error = TransportError;

    async fn send(&self, text: &str, options: &SendOptions) -> Result<MessageId, TransportError> {
        let (failure, delay) = {
            let mut state = self.state();
            state.calls += 1;
            let call = state.calls;
            (state.failures.remove(&call), state.delays.get(&call).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let mut state = self.state();
        state.delivered.push(DeliveredMessage {
            text: text.to_string(),
            options: *options,
        });
        Ok(state.delivered.len() as MessageId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let mock = MockTransport::new();
        let options = SendOptions::default();

        assert_eq!(mock.send("one", &options).await.unwrap(), 1);
        assert_eq!(mock.send("two", &options).await.unwrap(), 2);
        assert_eq!(mock.texts(), vec!["one", "two"]);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockTransport::new().fail_on(2, TransportError::Timeout);
        let options = SendOptions::default();

        assert!(mock.send("one", &options).await.is_ok());
        assert_eq!(mock.send("two", &options).await, Err(TransportError::Timeout));
        assert!(mock.send("three", &options).await.is_ok());
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.texts(), vec!["one", "three"]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockTransport::new();
        let handle = mock.clone();
        mock.send("x", &SendOptions::default()).await.unwrap();
        assert_eq!(handle.call_count(), 1);
    }
}
