//! Event sink trait and implementations.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, Level};

use super::{RUN_COMPLETED, RUN_STARTED};

/// Receiver for workflow lifecycle events.
#[async_trait]
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Delivers one event. Must not fail or panic.
    ///
    /// # Arguments
    ///
    /// * `event` - Dotted event name, e.g. `company.started`
    /// * `data` - Optional JSON payload
    async fn emit(&self, event: &str, data: Option<Value>);
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &str, _data: Option<Value>) {}
}

/// Writes events to the tracing subscriber.
///
/// Run boundaries are logged at `info`; everything else at `debug` unless
/// `verbose` is set. The engine logs failures and cancellation itself at
/// `warn`/`error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink {
    verbose: bool,
}

impl LoggingEventSink {
    /// Creates a sink that logs per-company progress at `debug`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs per-company progress at `info` too.
    #[must_use]
    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    fn level(&self, event: &str) -> Level {
        match event {
            RUN_STARTED | RUN_COMPLETED => Level::INFO,
            _ if self.verbose => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &str, data: Option<Value>) {
        let data = data.map(|d| d.to_string()).unwrap_or_default();
        if self.level(event) == Level::INFO {
            info!(event_name = event, data = %data, "Workflow event");
        } else {
            debug!(event_name = event, data = %data, "Workflow event");
        }
    }
}

/// One event captured by [`CollectingEventSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Dotted event name.
    pub name: String,
    /// Payload, if any.
    pub data: Option<Value>,
}

/// Keeps every event in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Event names in emission order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.name.clone()).collect()
    }

    /// Events named exactly `name`.
    #[must_use]
    pub fn named(&self, name: &str) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Number of events received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &str, data: Option<Value>) {
        self.events.lock().push(RecordedEvent {
            name: event.to_string(),
            data,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{COMPANY_COMPLETED, RUN_CANCELLED, STAGE_COMPLETED, STAGE_FAILED};
    use serde_json::json;

    #[tokio::test]
    async fn test_noop_and_logging_sinks_accept_events() {
        NoOpEventSink.emit(RUN_STARTED, None).await;
        LoggingEventSink::new()
            .emit(STAGE_FAILED, Some(json!({"stage": "search"})))
            .await;
        LoggingEventSink::verbose().emit(COMPANY_COMPLETED, None).await;
    }

    #[test]
    fn test_logging_levels_leave_failures_to_engine() {
        let quiet = LoggingEventSink::new();
        assert_eq!(quiet.level(RUN_STARTED), Level::INFO);
        assert_eq!(quiet.level(RUN_COMPLETED), Level::INFO);
        assert_eq!(quiet.level(STAGE_FAILED), Level::DEBUG);
        assert_eq!(quiet.level(RUN_CANCELLED), Level::DEBUG);
        assert_eq!(quiet.level(COMPANY_COMPLETED), Level::DEBUG);

        let verbose = LoggingEventSink::verbose();
        assert_eq!(verbose.level(STAGE_FAILED), Level::INFO);
        assert_eq!(verbose.level(COMPANY_COMPLETED), Level::INFO);
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(STAGE_COMPLETED, None).await;
        sink.emit(STAGE_FAILED, Some(json!({"stage": "verify"}))).await;
        sink.emit(STAGE_COMPLETED, None).await;

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.named(STAGE_COMPLETED).len(), 2);
        assert_eq!(sink.names(), vec![STAGE_COMPLETED, STAGE_FAILED, STAGE_COMPLETED]);
        assert_eq!(sink.named(STAGE_FAILED)[0].data, Some(json!({"stage": "verify"})));
    }
}
