//! # Filter Predicates
//!
//! Per-kind boolean functions over a record's current state, plus the
//! `PipeFilter`/`StationFilter` criteria that AND them together.
//!
//! Predicates are plain closures handed to `EntityStore::query`; composition
//! is the intersection of the id sets each predicate selects.

use crate::store::EntityStore;
use crate::{Pipe, RecordId, Station};
use std::collections::BTreeSet;

/// Case-sensitive substring match. An empty needle matches every name.
#[must_use]
pub fn name_matches(name: &str, needle: &str) -> bool {
    needle.is_empty() || name.contains(needle)
}

/// Pipes whose name contains `needle`.
pub fn pipe_name(needle: &str) -> impl Fn(&Pipe) -> bool + '_ {
    move |pipe| name_matches(pipe.name(), needle)
}

/// Pipes whose repair flag equals `under_repair`.
pub fn pipe_repair(under_repair: bool) -> impl Fn(&Pipe) -> bool {
    move |pipe| pipe.is_under_repair() == under_repair
}

/// Stations whose name contains `needle`.
pub fn station_name(needle: &str) -> impl Fn(&Station) -> bool + '_ {
    move |station| name_matches(station.name(), needle)
}

/// Stations with at least `threshold` percent of idle workshops (inclusive).
pub fn station_unused_at_least(threshold: f64) -> impl Fn(&Station) -> bool {
    move |station| station.unused_percent() >= threshold
}

/// Intersection of two id sets, the AND of two predicates.
#[must_use]
pub fn intersect(a: &BTreeSet<RecordId>, b: &BTreeSet<RecordId>) -> BTreeSet<RecordId> {
    a.intersection(b).copied().collect()
}

// =============================================================================
// COMPOSED CRITERIA
// =============================================================================

/// Search criteria for pipes. Unset fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeFilter {
    /// Name substring.
    pub name: Option<String>,
    /// Required repair state.
    pub under_repair: Option<bool>,
}

impl PipeFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_repair(mut self, under_repair: bool) -> Self {
        self.under_repair = Some(under_repair);
        self
    }

    /// Ids of the pipes meeting every set criterion.
    #[must_use]
    pub fn select(&self, store: &EntityStore<Pipe>) -> BTreeSet<RecordId> {
        let mut selected = match &self.name {
            Some(name) => store.query(pipe_name(name)),
            None => store.ids(),
        };
        if let Some(under_repair) = self.under_repair {
            selected = intersect(&selected, &store.query(pipe_repair(under_repair)));
        }
        selected
    }
}

/// Search criteria for stations. Unset fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationFilter {
    /// Name substring.
    pub name: Option<String>,
    /// Minimum unused-capacity percentage, inclusive.
    pub min_unused_percent: Option<f64>,
}

impl StationFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_min_unused(mut self, percent: f64) -> Self {
        self.min_unused_percent = Some(percent);
        self
    }

    /// Ids of the stations meeting every set criterion.
    #[must_use]
    pub fn select(&self, store: &EntityStore<Station>) -> BTreeSet<RecordId> {
        let mut selected = match &self.name {
            Some(name) => store.query(station_name(name)),
            None => store.ids(),
        };
        if let Some(threshold) = self.min_unused_percent {
            selected = intersect(&selected, &store.query(station_unused_at_least(threshold)));
        }
        selected
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pipes() -> EntityStore<Pipe> {
        let mut store = EntityStore::new();
        store.create(Pipe::new("Trunk-A", 12.5, 700, false));
        store.create(Pipe::new("Trunk-B", 3.0, 500, true));
        store.create(Pipe::new("Branch", 1.2, 300, true));
        store
    }

    fn stations() -> EntityStore<Station> {
        let mut store = EntityStore::new();
        store.create(Station::new("North", 4, 4, "A").expect("station"));
        store.create(Station::new("South", 4, 2, "B").expect("station"));
        store.create(Station::new("East", 4, 0, "B").expect("station"));
        store
    }

    fn ids(raw: &[u64]) -> BTreeSet<RecordId> {
        raw.iter().copied().map(RecordId).collect()
    }

    #[test]
    fn empty_name_matches_everything() {
        let store = pipes();
        assert_eq!(store.query(pipe_name("")), store.ids());
    }

    #[test]
    fn name_filter_is_case_sensitive() {
        let store = pipes();
        assert_eq!(store.query(pipe_name("Trunk")), ids(&[1, 2]));
        assert!(store.query(pipe_name("trunk")).is_empty());
        assert!(store.query(pipe_name("missing")).is_empty());
    }

    #[test]
    fn repair_filter_is_exact() {
        let store = pipes();
        assert_eq!(store.query(pipe_repair(true)), ids(&[2, 3]));
        assert_eq!(store.query(pipe_repair(false)), ids(&[1]));
    }

    #[test]
    fn pipe_filter_ands_criteria() {
        let store = pipes();
        let filter = PipeFilter::new().with_name("Trunk").with_repair(true);
        assert_eq!(filter.select(&store), ids(&[2]));
        assert_eq!(PipeFilter::new().select(&store), store.ids());
    }

    #[test]
    fn unused_threshold_is_inclusive() {
        let store = stations();
        assert_eq!(store.query(station_unused_at_least(50.0)), ids(&[2, 3]));
        assert_eq!(store.query(station_unused_at_least(0.0)), store.ids());
        assert!(store.query(station_unused_at_least(100.000_001)).is_empty());
    }

    #[test]
    fn station_filter_ands_criteria() {
        let store = stations();
        let filter = StationFilter::new().with_name("o").with_min_unused(10.0);
        assert_eq!(filter.select(&store), ids(&[2]));
    }
}
