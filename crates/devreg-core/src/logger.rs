use std::sync::{Arc, Mutex};

/// A single structured log event emitted by the [`crate::Registry`].
///
/// Mirrors the event names in the design notes: `device cache refreshed`,
/// `device created`/`updated`/`deleted`, `device state updated`, `device
/// health updated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub name: &'static str,
    pub fields: Vec<(&'static str, String)>,
}

/// Pluggable sink for Registry log events, the direct analogue of this
/// lineage's `Arc<dyn StateStore>` / `Arc<dyn Driver>` swappable-collaborator
/// pattern applied to observability instead of persistence or provisioning.
pub trait Logger: Send + Sync {
    fn info(&self, event: LogEvent);
    fn debug(&self, event: LogEvent);
}

/// Forwards every event to `tracing` at the matching level. The default.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, event: LogEvent) {
        tracing::info!(target: "devreg_core::registry", fields = ?event.fields, "{}", event.name);
    }

    fn debug(&self, event: LogEvent) {
        tracing::debug!(target: "devreg_core::registry", fields = ?event.fields, "{}", event.name);
    }
}

/// Discards every event. For embedding contexts that configure their own
/// subscriber and don't want the Registry's events duplicated into it.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _event: LogEvent) {}
    fn debug(&self, _event: LogEvent) {}
}

/// Records every event in-process. Test support only.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn info(&self, event: LogEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn debug(&self, event: LogEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) fn event(name: &'static str, fields: Vec<(&'static str, String)>) -> LogEvent {
    LogEvent { name, fields }
}
