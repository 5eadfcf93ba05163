//! # gasnet
//!
//! Command-line front end for `gasnet-core`: argument parsing, configuration,
//! logging and the file round trip around every command.

pub mod cli;
pub mod config;
pub mod logging;
