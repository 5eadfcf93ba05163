//! # Network Module
//!
//! The session object of the core: one pipe store, one station store and the
//! audit sink every mutation reports to.
//!
//! Reads go straight to the stores (`pipes()`, `stations()`). Every write
//! goes through a `Network` method so it is audited exactly once.

use crate::audit::{AuditEvent, AuditSink, NullAudit};
use crate::batch::{self, BatchReport, PipeEdit, StationEdit};
use crate::filter::{PipeFilter, StationFilter};
use crate::formats::Snapshot;
use crate::store::EntityStore;
use crate::{GasnetError, Pipe, RecordId, RecordKind, Station, WorkshopAction};
use std::collections::BTreeSet;

/// Both record stores plus their audit sink.
#[derive(Debug, Default)]
pub struct Network<A = NullAudit> {
    pipes: EntityStore<Pipe>,
    stations: EntityStore<Station>,
    audit: A,
}

impl Network<NullAudit> {
    /// Create an empty network that discards audit events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: AuditSink> Network<A> {
    /// Create an empty network reporting to `audit`.
    #[must_use]
    pub fn with_audit(audit: A) -> Self {
        Self {
            pipes: EntityStore::new(),
            stations: EntityStore::new(),
            audit,
        }
    }

    #[must_use]
    pub fn pipes(&self) -> &EntityStore<Pipe> {
        &self.pipes
    }

    #[must_use]
    pub fn stations(&self) -> &EntityStore<Station> {
        &self.stations
    }

    #[must_use]
    pub fn audit(&self) -> &A {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut A {
        &mut self.audit
    }

    /// Whether both stores are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty() && self.stations.is_empty()
    }

    // =========================================================================
    // PIPES
    // =========================================================================

    /// Store a new pipe and return its id.
    pub fn add_pipe(&mut self, pipe: Pipe) -> Result<RecordId, GasnetError> {
        let name = pipe.name().to_string();
        let id = self.pipes.create(pipe).ok_or(GasnetError::IdsExhausted {
            kind: RecordKind::Pipe,
        })?;
        self.audit.record(&AuditEvent::PipeCreated { id, name });
        Ok(id)
    }

    /// Delete a pipe. Returns whether it existed.
    pub fn delete_pipe(&mut self, id: RecordId) -> bool {
        self.delete(RecordKind::Pipe, id)
    }

    /// Flip a pipe's repair flag; returns the new state.
    pub fn toggle_repair(&mut self, id: RecordId) -> Result<bool, GasnetError> {
        let pipe = self.pipes.get_mut(id).ok_or(GasnetError::NotFound {
            kind: RecordKind::Pipe,
            id,
        })?;
        let under_repair = pipe.toggle_repair();
        self.audit
            .record(&AuditEvent::RepairChanged { id, under_repair });
        Ok(under_repair)
    }

    /// Ids of the pipes matching `filter`.
    #[must_use]
    pub fn find_pipes(&self, filter: &PipeFilter) -> BTreeSet<RecordId> {
        filter.select(&self.pipes)
    }

    /// Apply one edit to many pipes.
    pub fn batch_edit_pipes(&mut self, ids: &BTreeSet<RecordId>, edit: PipeEdit) -> BatchReport {
        batch::edit_pipes(&mut self.pipes, ids, edit, &mut self.audit)
    }

    // =========================================================================
    // STATIONS
    // =========================================================================

    /// Store a new station and return its id.
    pub fn add_station(&mut self, station: Station) -> Result<RecordId, GasnetError> {
        let name = station.name().to_string();
        let working = station.working_workshops();
        let total = station.total_workshops();
        let id = self
            .stations
            .create(station)
            .ok_or(GasnetError::IdsExhausted {
                kind: RecordKind::Station,
            })?;
        self.audit.record(&AuditEvent::StationCreated {
            id,
            name,
            working,
            total,
        });
        Ok(id)
    }

    /// Delete a station. Returns whether it existed.
    pub fn delete_station(&mut self, id: RecordId) -> bool {
        self.delete(RecordKind::Station, id)
    }

    /// Start one more workshop; returns the new `(working, total)`.
    pub fn start_workshop(&mut self, id: RecordId) -> Result<(u32, u32), GasnetError> {
        self.change_workshops(id, WorkshopAction::Start)
    }

    /// Stop one workshop; returns the new `(working, total)`.
    pub fn stop_workshop(&mut self, id: RecordId) -> Result<(u32, u32), GasnetError> {
        self.change_workshops(id, WorkshopAction::Stop)
    }

    /// Ids of the stations matching `filter`.
    #[must_use]
    pub fn find_stations(&self, filter: &StationFilter) -> BTreeSet<RecordId> {
        filter.select(&self.stations)
    }

    /// Apply one workshop transition to many stations.
    pub fn batch_edit_stations(
        &mut self,
        ids: &BTreeSet<RecordId>,
        edit: StationEdit,
    ) -> BatchReport {
        batch::edit_stations(&mut self.stations, ids, edit, &mut self.audit)
    }

    fn change_workshops(
        &mut self,
        id: RecordId,
        action: WorkshopAction,
    ) -> Result<(u32, u32), GasnetError> {
        let station = self.stations.get_mut(id).ok_or(GasnetError::NotFound {
            kind: RecordKind::Station,
            id,
        })?;
        let working_before = station.working_workshops();
        let total = station.total_workshops();
        if !station.apply_workshop(action) {
            return Err(GasnetError::BoundaryViolation {
                id,
                working: working_before,
                total,
                action,
            });
        }
        let working = station.working_workshops();
        self.audit.record(&AuditEvent::WorkshopChanged {
            id,
            action,
            working,
            total,
        });
        Ok((working, total))
    }

    fn delete(&mut self, kind: RecordKind, id: RecordId) -> bool {
        let removed = match kind {
            RecordKind::Pipe => self.pipes.delete(id),
            RecordKind::Station => self.stations.delete(id),
        };
        if removed {
            self.audit.record(&AuditEvent::Deleted { kind, id });
        }
        removed
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Copy both stores into a detached snapshot for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pipes: self.pipes.to_map(),
            stations: self.stations.to_map(),
        }
    }

    /// Audit that `snapshot` reached its destination.
    ///
    /// Call only after the write succeeded; taking a snapshot records
    /// nothing on its own.
    pub fn mark_saved(&mut self, snapshot: &Snapshot) {
        self.audit.record(&AuditEvent::SnapshotSaved {
            pipes: snapshot.pipes.len(),
            stations: snapshot.stations.len(),
        });
    }

    /// Replace both stores with a fully parsed snapshot.
    ///
    /// Previous records are dropped; id counters restart at `max(id) + 1`.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let event = AuditEvent::SnapshotRestored {
            pipes: snapshot.pipes.len(),
            stations: snapshot.stations.len(),
        };
        self.pipes.replace_all(snapshot.pipes);
        self.stations.replace_all(snapshot.stations);
        self.audit.record(&event);
    }

    /// Build a network from a snapshot without auditing the load.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot, audit: A) -> Self {
        let mut network = Self::with_audit(audit);
        network.pipes.replace_all(snapshot.pipes);
        network.stations.replace_all(snapshot.stations);
        network
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAudit;

    fn audited() -> Network<MemoryAudit> {
        Network::with_audit(MemoryAudit::new())
    }

    #[test]
    fn every_mutation_is_audited_once() {
        let mut net = audited();
        let p = net
            .add_pipe(Pipe::new("Trunk-A", 12.5, 700, false))
            .expect("pipe");
        let s = net
            .add_station(Station::new("KS-1", 3, 1, "A").expect("station"))
            .expect("station");
        net.toggle_repair(p).expect("toggle");
        net.start_workshop(s).expect("start");
        assert!(net.delete_pipe(p));

        assert_eq!(
            net.audit().lines(),
            vec![
                "pipe created: id=1, name='Trunk-A'",
                "station created: id=1, name='KS-1', workshops 1/3",
                "pipe id=1 repair status changed to: under repair",
                "station id=1 workshop started, now 2/3 working",
                "pipe deleted: id=1",
            ]
        );
    }

    #[test]
    fn failed_operations_are_not_audited() {
        let mut net = audited();
        let s = net
            .add_station(Station::new("KS-1", 1, 1, "A").expect("station"))
            .expect("station");
        net.audit.clear();

        assert!(!net.delete_pipe(RecordId(5)));
        assert!(matches!(
            net.toggle_repair(RecordId(5)),
            Err(GasnetError::NotFound {
                kind: RecordKind::Pipe,
                ..
            })
        ));
        assert!(matches!(
            net.start_workshop(s),
            Err(GasnetError::BoundaryViolation {
                working: 1,
                total: 1,
                action: WorkshopAction::Start,
                ..
            })
        ));
        assert!(net.audit().events().is_empty());
    }

    #[test]
    fn id_spaces_are_independent() {
        let mut net = Network::new();
        let p = net.add_pipe(Pipe::new("p", 1.0, 100, false)).expect("pipe");
        let s = net
            .add_station(Station::new("s", 1, 0, "A").expect("station"))
            .expect("station");
        assert_eq!(p, RecordId(1));
        assert_eq!(s, RecordId(1));
    }

    #[test]
    fn restore_replaces_instead_of_merging() {
        let mut net = Network::new();
        net.add_pipe(Pipe::new("old", 1.0, 100, false))
            .expect("pipe");

        let mut snapshot = Snapshot::new();
        snapshot
            .pipes
            .insert(RecordId(7), Pipe::new("new", 2.0, 200, true));
        net.restore(snapshot);

        assert_eq!(net.pipes().ids(), BTreeSet::from([RecordId(7)]));
        assert_eq!(net.pipes().next_id(), Some(RecordId(8)));
        assert_eq!(net.stations().next_id(), Some(RecordId(1)));
    }

    #[test]
    fn add_at_exhausted_ids_keeps_existing_record() {
        let mut snapshot = Snapshot::new();
        snapshot
            .pipes
            .insert(RecordId(u64::MAX), Pipe::new("keep", 1.0, 100, false));
        let mut net = Network::from_snapshot(snapshot, MemoryAudit::new());

        let result = net.add_pipe(Pipe::new("new", 2.0, 200, false));

        assert!(matches!(
            result,
            Err(GasnetError::IdsExhausted {
                kind: RecordKind::Pipe
            })
        ));
        assert_eq!(net.pipes().count(), 1);
        assert_eq!(
            net.pipes().get(RecordId(u64::MAX)).map(Pipe::name),
            Some("keep")
        );
        assert!(net.audit().events().is_empty());
    }

    #[test]
    fn snapshot_is_not_audited_until_marked_saved() {
        let mut net = audited();
        net.add_pipe(Pipe::new("Trunk-A", 12.5, 700, false))
            .expect("pipe");
        net.audit.clear();

        let snapshot = net.snapshot();
        assert!(net.audit().events().is_empty());

        net.mark_saved(&snapshot);
        assert_eq!(net.audit().lines(), vec!["data saved: 1 pipes, 0 stations"]);
    }
}
