//! # Telemetry Module
//!
//! Log setup for the `gabor` binary. `RUST_LOG` overrides the default of
//! info-level output from the engine and the driver. Everything is written
//! to stderr, stdout carries only the JSON report.

use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "gabor_core=info,gabor=info";

static SUBSCRIBER: OnceLock<()> = OnceLock::new();

fn workbench_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()))
}

/// Installs the global subscriber once; later calls are no-ops.
pub fn init() {
    SUBSCRIBER.get_or_init(|| {
        let installed = fmt()
            .with_env_filter(workbench_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact()
            .try_init();

        match installed {
            Ok(()) => tracing::debug!("[CLI] logging ready ({DEFAULT_FILTER} unless RUST_LOG is set)"),
            Err(err) => eprintln!("[CLI] logging disabled: {err}"),
        }
    });
}
