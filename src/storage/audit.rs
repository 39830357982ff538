//! Audit Events
//!
//! The engine reports what it does through an [`AuditLog`] handed to it at
//! construction. It never decides where the events end up: the binary plugs
//! in [`TracingAudit`], tests plug in [`RecordingAudit`].

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Warning => "WARNING",
            AuditLevel::Error => "ERROR",
            AuditLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub level: AuditLevel,
    pub message: String,
}

impl AuditEvent {
    pub fn new(level: AuditLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Sink for audit events.
pub trait AuditLog: Send + Sync {
    /// Records one event.
    fn record(&self, event: AuditEvent);
}

/// Convenience methods usable on `dyn AuditLog`.
pub(crate) trait AuditExt {
    fn info(&self, message: String);
    fn warning(&self, message: String);
    fn error(&self, message: String);
    fn critical(&self, message: String);
}

impl AuditExt for dyn AuditLog {
    fn info(&self, message: String) {
        self.record(AuditEvent::new(AuditLevel::Info, message));
    }

    fn warning(&self, message: String) {
        self.record(AuditEvent::new(AuditLevel::Warning, message));
    }

    fn error(&self, message: String) {
        self.record(AuditEvent::new(AuditLevel::Error, message));
    }

    fn critical(&self, message: String) {
        self.record(AuditEvent::new(AuditLevel::Critical, message));
    }
}

/// Forwards audit events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl AuditLog for TracingAudit {
    fn record(&self, event: AuditEvent) {
        match event.level {
            AuditLevel::Info => info!("{}", event.message),
            AuditLevel::Warning => warn!("{}", event.message),
            AuditLevel::Error => error!("{}", event.message),
            AuditLevel::Critical => error!(critical = true, "{}", event.message),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudit;

impl AuditLog for NullAudit {
    fn record(&self, _event: AuditEvent) {}
}

/// Keeps events in memory so they can be inspected later.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAudit {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a copy of every event recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the messages recorded at `level`.
    pub fn messages(&self, level: AuditLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

impl AuditLog for RecordingAudit {
    fn record(&self, event: AuditEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event);
    }
}
