//! Delete old files from the file system.
//!
//! `cleanser` enforces time-based retention on a single host. Each configured
//! directory has a maximum age in days; entries directly inside it that are
//! older than that are deleted. Job working directories (`J######`) under a
//! fixed root are removed after 30 days.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use cleanser::retention::TracingLog;
//!
//! let report = cleanser::run("conf/config.json", Utc::now(), Arc::new(TracingLog))?;
//! println!("removed {} objects", report.total_removed());
//! # Ok::<(), cleanser::CleanserError>(())
//! ```

use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};

pub mod config;
pub mod error;
#[cfg(feature = "cli")]
pub mod observability;
pub mod retention;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

pub use config::{CleanserConfig, ConfigError, RetentionRule};
pub use error::{CleanserError, RecoverableError, RemovalError, ScanError};
pub use retention::{RetentionPolicyEngine, SweepLog, SweepReport};

/// Load the configuration at `config_path` and run one full pass at `now`.
///
/// Only configuration problems are returned as errors, and they are returned
/// before anything is scanned. Per-directory and per-object failures are
/// logged and collected in the report.
pub fn run(
    config_path: impl AsRef<Path>,
    now: DateTime<Utc>,
    log: Arc<dyn SweepLog>,
) -> Result<SweepReport, CleanserError> {
    let config = CleanserConfig::from_file(config_path)?;
    Ok(RetentionPolicyEngine::from_config(&config, log).run(now))
}
