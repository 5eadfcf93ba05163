//! # gasnet - Gas Network Registry
//!
//! The binary for the gasnet pipe and compressor-station registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │              apps/gasnet (THE BINARY)            │
//! │                                                  │
//! │  ┌─────────────┐  ┌──────────┐  ┌────────────┐   │
//! │  │    CLI      │  │  Config  │  │  Logging   │   │
//! │  │   (clap)    │  │  (toml)  │  │ (tracing)  │   │
//! │  └──────┬──────┘  └────┬─────┘  └─────┬──────┘   │
//! │         └──────────────┼──────────────┘          │
//! │                        ▼                         │
//! │                ┌───────────────┐                 │
//! │                │  gasnet-core  │                 │
//! │                │  (THE LOGIC)  │                 │
//! │                └───────────────┘                 │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! gasnet pipe add --name Trunk-A --length 12.5 --diameter 700
//! gasnet station add --name KS-1 --total 3 --working 1 --class A
//! gasnet pipe batch --name Trunk --repair false --set true
//! gasnet station find --min-unused 50
//! gasnet save --output backup.txt
//! ```

use clap::Parser;
use gasnet::cli::{self, Cli, Context};
use gasnet::config::Config;
use gasnet::logging;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = Cli::parse();

    let config = match Config::discover(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init(cli.verbose, None);
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let audit_log = cli.audit_log.clone().unwrap_or_else(|| config.audit_log.clone());
    logging::init(cli.verbose, Some(&audit_log));

    let ctx = Context::resolve(&cli, &config);

    if !cli.quiet && !ctx.json {
        print_banner();
    }

    if let Err(e) = cli::execute(cli.command, &ctx) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the gasnet startup banner.
fn print_banner() {
    println!(
        r#"
  gasnet v{}
  Pipes and compressor stations
"#,
        env!("CARGO_PKG_VERSION")
    );
}
