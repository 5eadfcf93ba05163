//! # Primitives
//!
//! Fixed constants of the gasnet core: the snapshot layout and the input
//! bounds the session layer enforces before calling into the core.

// =============================================================================
// SNAPSHOT LAYOUT
// =============================================================================

/// Header line prefix of the pipe section: `Pipes:<count>`.
pub const PIPES_HEADER: &str = "Pipes:";

/// Header line prefix of the station section: `Stations:<count>`.
pub const STATIONS_HEADER: &str = "Stations:";

// =============================================================================
// INPUT BOUNDS
// =============================================================================

/// Shortest pipe accepted on input, in kilometres.
pub const MIN_PIPE_LENGTH_KM: f64 = 0.01;

/// Smallest pipe diameter accepted on input, in millimetres.
pub const MIN_PIPE_DIAMETER_MM: u32 = 1;

/// Smallest workshop count accepted for a new station.
pub const MIN_TOTAL_WORKSHOPS: u32 = 1;

/// Upper bound of the unused-capacity percentage.
pub const MAX_UNUSED_PERCENT: f64 = 100.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_end_with_separator() {
        assert!(PIPES_HEADER.ends_with(':'));
        assert!(STATIONS_HEADER.ends_with(':'));
    }
}
