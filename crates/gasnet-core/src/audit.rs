//! # Audit Capability
//!
//! Every create, delete and mutation performed through a `Network` is
//! reported as one `AuditEvent`. The core only knows the `AuditSink` trait;
//! whoever constructs the network decides where the lines end up.

use crate::{RecordId, RecordKind, WorkshopAction};
use std::fmt;

/// One auditable action, rendered as a single human-readable line.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// A pipe was created.
    PipeCreated { id: RecordId, name: String },
    /// A station was created.
    StationCreated {
        id: RecordId,
        name: String,
        working: u32,
        total: u32,
    },
    /// A record was deleted.
    Deleted { kind: RecordKind, id: RecordId },
    /// A pipe's repair flag changed.
    RepairChanged { id: RecordId, under_repair: bool },
    /// A station's working count changed.
    WorkshopChanged {
        id: RecordId,
        action: WorkshopAction,
        working: u32,
        total: u32,
    },
    /// A batch edit finished.
    BatchApplied {
        kind: RecordKind,
        applied: usize,
        rejected: usize,
        missing: usize,
    },
    /// Both stores were replaced from a snapshot.
    SnapshotRestored { pipes: usize, stations: usize },
    /// A snapshot was written out.
    SnapshotSaved { pipes: usize, stations: usize },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PipeCreated { id, name } => {
                write!(f, "pipe created: id={}, name='{}'", id, name)
            }
            Self::StationCreated {
                id,
                name,
                working,
                total,
            } => write!(
                f,
                "station created: id={}, name='{}', workshops {}/{}",
                id, name, working, total
            ),
            Self::Deleted { kind, id } => write!(f, "{} deleted: id={}", kind, id),
            Self::RepairChanged { id, under_repair } => write!(
                f,
                "pipe id={} repair status changed to: {}",
                id,
                if *under_repair { "under repair" } else { "in service" }
            ),
            Self::WorkshopChanged {
                id,
                action,
                working,
                total,
            } => {
                let verb = match action {
                    WorkshopAction::Start => "started",
                    WorkshopAction::Stop => "stopped",
                };
                write!(
                    f,
                    "station id={} workshop {}, now {}/{} working",
                    id, verb, working, total
                )
            }
            Self::BatchApplied {
                kind,
                applied,
                rejected,
                missing,
            } => write!(
                f,
                "batch edit on {}s: {} applied, {} rejected, {} missing",
                kind, applied, rejected, missing
            ),
            Self::SnapshotRestored { pipes, stations } => write!(
                f,
                "data restored: {} pipes, {} stations",
                pipes, stations
            ),
            Self::SnapshotSaved { pipes, stations } => {
                write!(f, "data saved: {} pipes, {} stations", pipes, stations)
            }
        }
    }
}

/// The "record an event" capability.
pub trait AuditSink {
    /// Record one event. Sinks must not fail the operation being audited.
    fn record(&mut self, event: &AuditEvent);
}

impl<S: AuditSink + ?Sized> AuditSink for &mut S {
    fn record(&mut self, event: &AuditEvent) {
        (**self).record(event);
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Box<S> {
    fn record(&mut self, event: &AuditEvent) {
        (**self).record(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudit;

impl AuditSink for NullAudit {
    fn record(&mut self, _event: &AuditEvent) {}
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAudit {
    events: Vec<AuditEvent>,
}

impl MemoryAudit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// The recorded events rendered as lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Remove and return the recorded events.
    pub fn drain(&mut self) -> Vec<AuditEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AuditSink for MemoryAudit {
    fn record(&mut self, event: &AuditEvent) {
        self.events.push(event.clone());
    }
}

// =============================================================================
// TESTS
// =============================================================================
