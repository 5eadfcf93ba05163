//! # Record Types
//!
//! The two record kinds of a gas transmission network.
//!
//! Records are plain data: they do not carry their id (the store key is the
//! id) and their setters do not validate. Input validation belongs to the
//! caller; the only guarded transitions are the station workshop mutators.

use crate::{GasnetError, WorkshopAction};
use serde::Serialize;
use std::fmt;

// =============================================================================
// PIPE
// =============================================================================

/// A pipe: a linear asset with a length, a diameter and a repair flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipe {
    name: String,
    length_km: f64,
    diameter_mm: u32,
    under_repair: bool,
}

impl Pipe {
    /// Create a new pipe.
    #[must_use]
    pub fn new(name: impl Into<String>, length_km: f64, diameter_mm: u32, under_repair: bool) -> Self {
        Self {
            name: name.into(),
            length_km,
            diameter_mm,
            under_repair,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in kilometres.
    #[must_use]
    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    /// Diameter in millimetres.
    #[must_use]
    pub fn diameter_mm(&self) -> u32 {
        self.diameter_mm
    }

    #[must_use]
    pub fn is_under_repair(&self) -> bool {
        self.under_repair
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_length_km(&mut self, length_km: f64) {
        self.length_km = length_km;
    }

    pub fn set_diameter_mm(&mut self, diameter_mm: u32) {
        self.diameter_mm = diameter_mm;
    }

    pub fn set_under_repair(&mut self, under_repair: bool) {
        self.under_repair = under_repair;
    }

    /// Flip the repair flag. Always succeeds; returns the new state.
    pub fn toggle_repair(&mut self) -> bool {
        self.under_repair = !self.under_repair;
        self.under_repair
    }
}

impl fmt::Display for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Name:         {}", self.name)?;
        writeln!(f, "  Length:       {} km", self.length_km)?;
        writeln!(f, "  Diameter:     {} mm", self.diameter_mm)?;
        write!(
            f,
            "  Under repair: {}",
            if self.under_repair { "yes" } else { "no" }
        )
    }
}

// =============================================================================
// STATION
// =============================================================================

/// A compressor station with a bounded count of working workshops.
///
/// The pair `(working, total)` only changes through `start_workshop`
/// (`+1` while `working < total`) and `stop_workshop` (`-1` while
/// `working > 0`), so `working <= total` holds unless the raw setters are
/// used to corrupt it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Station {
    name: String,
    total_workshops: u32,
    working_workshops: u32,
    classification: String,
}

impl Station {
    /// Create a new station.
    ///
    /// Returns `InvalidField` if `working_workshops > total_workshops`.
    pub fn new(
        name: impl Into<String>,
        total_workshops: u32,
        working_workshops: u32,
        classification: impl Into<String>,
    ) -> Result<Self, GasnetError> {
        if working_workshops > total_workshops {
            return Err(GasnetError::InvalidField(format!(
                "working workshops ({}) exceed total ({})",
                working_workshops, total_workshops
            )));
        }
        Ok(Self::from_parts(
            name,
            total_workshops,
            working_workshops,
            classification,
        ))
    }

    /// Build a station without checking the workshop bound.
    ///
    /// Used by the snapshot decoder, which accepts persisted values as-is.
    #[must_use]
    pub fn from_parts(
        name: impl Into<String>,
        total_workshops: u32,
        working_workshops: u32,
        classification: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            total_workshops,
            working_workshops,
            classification: classification.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn total_workshops(&self) -> u32 {
        self.total_workshops
    }

    #[must_use]
    pub fn working_workshops(&self) -> u32 {
        self.working_workshops
    }

    #[must_use]
    pub fn classification(&self) -> &str {
        &self.classification
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_total_workshops(&mut self, total: u32) {
        self.total_workshops = total;
    }

    pub fn set_working_workshops(&mut self, working: u32) {
        self.working_workshops = working;
    }

    pub fn set_classification(&mut self, classification: impl Into<String>) {
        self.classification = classification.into();
    }

    /// Bring one more workshop into service.
    ///
    /// Returns `false` and leaves the station unchanged when every workshop
    /// is already working.
    pub fn start_workshop(&mut self) -> bool {
        if self.working_workshops < self.total_workshops {
            self.working_workshops += 1;
            true
        } else {
            false
        }
    }

    /// Take one workshop out of service.
    ///
    /// Returns `false` and leaves the station unchanged when no workshop is
    /// working.
    pub fn stop_workshop(&mut self) -> bool {
        if self.working_workshops > 0 {
            self.working_workshops -= 1;
            true
        } else {
            false
        }
    }

    /// Apply a workshop transition by action.
    pub fn apply_workshop(&mut self, action: WorkshopAction) -> bool {
        match action {
            WorkshopAction::Start => self.start_workshop(),
            WorkshopAction::Stop => self.stop_workshop(),
        }
    }

    /// Share of idle workshops, in percent.
    ///
    /// `(total - working) / total * 100`, or 0 for a station without
    /// workshops. Corrupted state (`working > total`) yields a negative
    /// value rather than wrapping.
    #[must_use]
    pub fn unused_percent(&self) -> f64 {
        if self.total_workshops == 0 {
            return 0.0;
        }
        let total = f64::from(self.total_workshops);
        let idle = total - f64::from(self.working_workshops);
        idle * 100.0 / total
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Name:           {}", self.name)?;
        writeln!(
            f,
            "  Workshops:      {}/{} working",
            self.working_workshops, self.total_workshops
        )?;
        writeln!(f, "  Unused:         {:.1}%", self.unused_percent())?;
        write!(f, "  Classification: {}", self.classification)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn station(total: u32, working: u32) -> Station {
        Station::new("KS-1", total, working, "A").expect("valid station")
    }

    #[test]
    fn toggle_repair_flips_flag() {
        let mut pipe = Pipe::new("Trunk-A", 12.5, 700, false);
        assert!(pipe.toggle_repair());
        assert!(pipe.is_under_repair());
        assert!(!pipe.toggle_repair());
        assert!(!pipe.is_under_repair());
    }

    #[test]
    fn station_new_rejects_working_above_total() {
        let err = Station::new("KS-1", 2, 3, "A").expect_err("working above total");
        assert!(matches!(err, GasnetError::InvalidField(_)));
        assert_eq!(
            err.to_string(),
            "invalid field: working workshops (3) exceed total (2)"
        );
    }

    #[test]
    fn start_workshop_bounded_by_total() {
        let mut s = station(2, 1);
        assert!(s.start_workshop());
        assert_eq!(s.working_workshops(), 2);

        assert!(!s.start_workshop());
        assert_eq!(s.working_workshops(), 2);
    }

    #[test]
    fn stop_workshop_bounded_by_zero() {
        let mut s = station(2, 1);
        assert!(s.stop_workshop());
        assert_eq!(s.working_workshops(), 0);

        assert!(!s.stop_workshop());
        assert_eq!(s.working_workshops(), 0);
    }

    #[test]
    fn start_then_stop_restores_state() {
        let mut s = station(5, 3);
        let before = s.clone();
        assert!(s.start_workshop());
        assert!(s.stop_workshop());
        assert_eq!(s, before);
    }

    #[test]
    fn unused_percent_values() {
        assert_eq!(station(4, 1).unused_percent(), 75.0);
        assert_eq!(station(4, 4).unused_percent(), 0.0);
        assert_eq!(station(4, 0).unused_percent(), 100.0);
        assert_eq!(Station::from_parts("empty", 0, 0, "").unused_percent(), 0.0);
    }

    #[test]
    fn display_mentions_workshops() {
        let text = station(4, 1).to_string();
        assert!(text.contains("1/4 working"));
        assert!(text.contains("75.0%"));
    }
}
