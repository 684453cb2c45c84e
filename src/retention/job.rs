//! Job working directories.
//!
//! Jobs leave a `J######` directory under a fixed root. These follow their own
//! retention policy, independent of the configured rules: anything older than
//! [`JOB_MAX_AGE_DAYS`] is removed.

use std::{path::Path, sync::LazyLock};

use chrono::Duration;
use regex::Regex;

use super::{
    age::max_age_from_days,
    log::{SweepEvent, SweepLog},
    scanner::{FilesystemObject, ObjectKind, list_directory},
};
use crate::error::ScanError;

/// Where job working directories live.
pub const DEFAULT_JOB_ROOT: &str = "/var/spool/cleanser/jobs";

/// Job directories are kept for this many days.
pub const JOB_MAX_AGE_DAYS: u32 = 30;

static JOB_DIRECTORY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^J[0-9]{6}$").unwrap());

/// True iff `name` is exactly `J` followed by six ASCII digits.
pub fn is_job_directory_name(name: &str) -> bool {
    JOB_DIRECTORY_REGEX.is_match(name)
}

pub fn job_max_age() -> Duration {
    max_age_from_days(JOB_MAX_AGE_DAYS)
}

/// List the job directories directly under `job_root`.
///
/// Entries are matched on their name only. A matching name that is not a
/// directory (including a symbolic link to one) is left alone.
pub fn scan_job_directories(
    job_root: &Path,
    log: &dyn SweepLog,
) -> Result<Vec<FilesystemObject>, ScanError> {
    let candidates = list_directory(job_root, log)?
        .into_iter()
        .filter(|object| object.name().is_some_and(is_job_directory_name))
        .filter(|object| {
            if object.kind() == ObjectKind::Directory {
                true
            } else {
                log.debug(&SweepEvent::NotADirectory {
                    path: object.path().to_path_buf(),
                });
                false
            }
        })
        .collect();

    Ok(candidates)
}
