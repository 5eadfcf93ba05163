//! # Batch Editor
//!
//! Applies one mutation to a caller-supplied set of ids.
//!
//! Records are edited independently: an id missing from the store is
//! skipped, and a station that rejects a workshop transition does not stop
//! the rest of the batch. There is no rollback. Each applied mutation is
//! audited individually, followed by one summary event.

use crate::audit::{AuditEvent, AuditSink};
use crate::store::EntityStore;
use crate::{Pipe, RecordId, RecordKind, Station, WorkshopAction};
use serde::Serialize;
use std::collections::BTreeSet;

/// A mutation applicable to many pipes at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeEdit {
    /// Flip the repair flag of every selected pipe.
    ToggleRepair,
    /// Force the repair flag of every selected pipe to a value.
    SetRepair(bool),
}

/// A mutation applicable to many stations at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEdit {
    StartWorkshop,
    StopWorkshop,
}

impl StationEdit {
    #[must_use]
    pub fn action(self) -> WorkshopAction {
        match self {
            Self::StartWorkshop => WorkshopAction::Start,
            Self::StopWorkshop => WorkshopAction::Stop,
        }
    }
}

/// Outcome of a batch edit, partitioned by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Records that were mutated.
    pub applied: BTreeSet<RecordId>,
    /// Records present but refusing the mutation (state unchanged).
    pub rejected: BTreeSet<RecordId>,
    /// Ids absent from the store.
    pub missing: BTreeSet<RecordId>,
}

impl BatchReport {
    /// Number of ids the batch was asked to touch.
    #[must_use]
    pub fn requested(&self) -> usize {
        self.applied.len() + self.rejected.len() + self.missing.len()
    }

    fn summary(&self, kind: RecordKind) -> AuditEvent {
        AuditEvent::BatchApplied {
            kind,
            applied: self.applied.len(),
            rejected: self.rejected.len(),
            missing: self.missing.len(),
        }
    }
}

/// Apply `edit` to every pipe in `ids`.
pub fn edit_pipes<A>(
    store: &mut EntityStore<Pipe>,
    ids: &BTreeSet<RecordId>,
    edit: PipeEdit,
    audit: &mut A,
) -> BatchReport
where
    A: AuditSink + ?Sized,
{
    let mut report = BatchReport::default();

    for &id in ids {
        let Some(pipe) = store.get_mut(id) else {
            report.missing.insert(id);
            continue;
        };
        let under_repair = match edit {
            PipeEdit::ToggleRepair => pipe.toggle_repair(),
            PipeEdit::SetRepair(value) => {
                pipe.set_under_repair(value);
                value
            }
        };
        audit.record(&AuditEvent::RepairChanged { id, under_repair });
        report.applied.insert(id);
    }

    audit.record(&report.summary(RecordKind::Pipe));
    report
}

/// Apply `edit` to every station in `ids`.
pub fn edit_stations<A>(
    store: &mut EntityStore<Station>,
    ids: &BTreeSet<RecordId>,
    edit: StationEdit,
    audit: &mut A,
) -> BatchReport
where
    A: AuditSink + ?Sized,
{
    let mut report = BatchReport::default();
    let action = edit.action();

    for &id in ids {
        let Some(station) = store.get_mut(id) else {
            report.missing.insert(id);
            continue;
        };
        if station.apply_workshop(action) {
            audit.record(&AuditEvent::WorkshopChanged {
                id,
                action,
                working: station.working_workshops(),
                total: station.total_workshops(),
            });
            report.applied.insert(id);
        } else {
            report.rejected.insert(id);
        }
    }

    audit.record(&report.summary(RecordKind::Station));
    report
}

// =============================================================================
// TESTS
// =============================================================================
