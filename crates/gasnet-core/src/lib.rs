//! # gasnet-core
//!
//! The record engine for gasnet - THE LOGIC.
//!
//! This crate manages the two record kinds of a gas transmission network,
//! pipes and compressor stations, through one generic identifier-keyed
//! store instantiated once per kind.
//!
//! ## Components
//!
//! - `records`: `Pipe` and `Station` plain data with their mutators
//! - `store`: `EntityStore<R>`, id assignment and predicate queries
//! - `filter`: per-kind predicates and AND-composed criteria
//! - `batch`: one mutation over many ids, independent per record
//! - `audit`: the `AuditSink` capability every mutation reports to
//! - `formats`: the line-oriented snapshot codec
//! - `network`: both stores plus the audit sink, the core's session object
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous; no async, no locking
//! - No logging dependency: audit events leave through `AuditSink`
//! - No file paths: the codec reads and writes through `Read`/`Write`

// =============================================================================
// MODULES
// =============================================================================

pub mod audit;
pub mod batch;
pub mod filter;
pub mod formats;
pub mod network;
pub mod primitives;
pub mod records;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{GasnetError, RecordId, RecordKind, WorkshopAction};

// =============================================================================
// RE-EXPORTS: Records and Engine
// =============================================================================

pub use audit::{AuditEvent, AuditSink, MemoryAudit, NullAudit};
pub use batch::{BatchReport, PipeEdit, StationEdit};
pub use filter::{PipeFilter, StationFilter};
pub use network::Network;
pub use records::{Pipe, Station};
pub use store::EntityStore;

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{Snapshot, decode_snapshot, encode_snapshot, read_snapshot, write_snapshot};
