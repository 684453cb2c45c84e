//! Retention rule configuration.
//!
//! Each rule names one monitored directory and how many days its entries are
//! kept before they become eligible for deletion.
//!
//! # Example
//!
//! ```json
//! {
//!   "directories": [
//!     { "directory": "/var/log/app/", "period": 7 },
//!     { "directory": "/tmp/exports", "period": 1 }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::retention::max_age_from_days;

/// A single (directory, max-age) retention rule.
///
/// Rules are immutable once loaded; the scanner only ever borrows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionRule {
    /// Directory whose immediate entries are subject to this rule.
    pub directory: PathBuf,

    /// Number of days an entry is kept, measured from its last modification.
    /// Must be greater than zero.
    pub period: u32,
}

impl RetentionRule {
    pub fn new(directory: impl Into<PathBuf>, period: u32) -> Self {
        Self {
            directory: directory.into(),
            period,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Maximum age as an absolute duration (`period * 86400` seconds).
    pub fn max_age(&self) -> Duration {
        max_age_from_days(self.period)
    }

    /// Check the rule invariants, returning a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.directory.as_os_str().is_empty() {
            return Err("retention rule directory must not be empty".into());
        }
        if self.period == 0 {
            return Err(format!(
                "retention period for {} must be at least 1 day",
                self.directory.display()
            ));
        }
        Ok(())
    }
}
