//! # Formats Module
//!
//! Persistence formats for gasnet data.
//!
//! The snapshot codec is a pure transformation between a `Snapshot` and its
//! text form, plus `Read`/`Write` adapters. Choosing and opening files is
//! left to the app layer.

mod snapshot;

pub use snapshot::*;
