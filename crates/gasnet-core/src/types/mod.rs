//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the gasnet core:
//! - Record identifiers (`RecordId`) and record kinds (`RecordKind`)
//! - Workshop transitions (`WorkshopAction`)
//! - Error types (`GasnetError`)
//!
//! ## Ordering Guarantees
//!
//! `RecordId` implements `Ord` so every collection keyed by it iterates in
//! ascending numeric order, independent of insertion order.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a record within its own kind's store.
///
/// Pipes and stations have independent id spaces: pipe 1 and station 1 are
/// unrelated records. Ids assigned by a store start at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The first id a fresh store hands out.
    pub const FIRST: Self = Self(1);

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` past `u64::MAX`.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The two record kinds managed by a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A linear asset.
    Pipe,
    /// A compressor station.
    Station,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipe => f.write_str("pipe"),
            Self::Station => f.write_str("station"),
        }
    }
}

/// A bounded transition on a station's working workshop count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkshopAction {
    /// `working + 1`, bounded above by `total`.
    Start,
    /// `working - 1`, bounded below by 0.
    Stop,
}

impl fmt::Display for WorkshopAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Stop => f.write_str("stop"),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the gasnet system.
///
/// `NotFound` and `BoundaryViolation` are recoverable: the operation made no
/// change and the caller decides what to tell the user. The remaining
/// variants are hard failures of a load, save or command.
#[derive(Debug, Error)]
pub enum GasnetError {
    /// The referenced id is absent from its store.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Which store was searched.
        kind: RecordKind,
        /// The missing id.
        id: RecordId,
    },

    /// A workshop start/stop would leave `[0, total]`.
    #[error("cannot {action} a workshop on station {id}: {working}/{total} working")]
    BoundaryViolation {
        /// The station concerned.
        id: RecordId,
        /// Working workshops at the time of the attempt.
        working: u32,
        /// Total workshops of the station.
        total: u32,
        /// The rejected transition.
        action: WorkshopAction,
    },

    /// The store already holds id `u64::MAX`; no new id can be assigned.
    #[error("no {kind} ids left to assign")]
    IdsExhausted {
        /// Which store ran out.
        kind: RecordKind,
    },

    /// Persisted data does not have the expected shape or field types.
    #[error("malformed data at line {line}: {reason}")]
    MalformedData {
        /// 1-based line number where the problem was detected.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A value cannot be represented in the persisted form.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// A command received an argument it cannot act on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The configuration file cannot be read or parsed.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl GasnetError {
    /// Build a `MalformedData` error.
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            line,
            reason: reason.into(),
        }
    }

    /// Whether the error leaves state untouched and can be reported as a
    /// plain message.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::BoundaryViolation { .. }
        )
    }
}

impl From<std::io::Error> for GasnetError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
