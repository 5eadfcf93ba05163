//! # Logging
//!
//! Tracing setup for the binary and the audit sink that feeds it.
//!
//! Two layers are installed:
//! - the console layer, filtered by `RUST_LOG` (default `gasnet=info`),
//!   text or JSON depending on `GASNET_LOG_FORMAT`
//! - the audit layer, which appends every event of the `gasnet::audit`
//!   target to the audit log file, with timestamps and without colours

use gasnet_core::{AuditEvent, AuditSink};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing target carrying audit lines.
pub const AUDIT_TARGET: &str = "gasnet::audit";

/// Environment variable selecting the console format (`text` or `json`).
pub const LOG_FORMAT_ENV: &str = "GASNET_LOG_FORMAT";

/// Audit sink forwarding every core event to the `gasnet::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&mut self, event: &AuditEvent) {
        tracing::info!(target: AUDIT_TARGET, "{}", event);
    }
}

/// Open the audit log for appending, creating it if needed.
fn open_audit_log(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// `audit_log` of `None` keeps audit lines on the console only. If the file
/// cannot be opened the program continues without it and says so.
pub fn init(verbose: bool, audit_log: Option<&Path>) {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose { "gasnet=debug" } else { "gasnet=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let mut open_error = None;
    let audit_file = audit_log.and_then(|path| match open_audit_log(path) {
        Ok(file) => Some(file),
        Err(e) => {
            open_error = Some(format!("Cannot open audit log {:?}: {}", path, e));
            None
        }
    });

    let audit_layer = audit_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_filter(Targets::new().with_target(AUDIT_TARGET, Level::INFO))
    });

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(audit_layer)
                .with(tracing_subscriber::fmt::layer().json().with_filter(filter))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(audit_layer)
                .with(tracing_subscriber::fmt::layer().with_filter(filter))
                .init();
        }
    }

    if let Some(message) = open_error {
        tracing::warn!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_audit_log_appends() {
        use std::io::Write;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.log");

        let mut first = open_audit_log(&path).expect("open");
        writeln!(first, "one").expect("write");
        drop(first);

        let mut second = open_audit_log(&path).expect("reopen");
        writeln!(second, "two").expect("write");
        drop(second);

        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, "one\ntwo\n");
    }
}
