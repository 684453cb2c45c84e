//! Filesystem retention: find what has outlived its period and delete it.
//!
//! A pass consists of two sweeps:
//! 1. Entries directly inside each configured directory older than that
//!    rule's period
//! 2. `J######` job directories under the job root older than 30 days
//!
//! Expiry is strict (`age > max_age`) and always evaluated against an explicit
//! reference time. Deletion is non-recursive and best-effort: a failure on one
//! object is logged and the sweep moves on.

mod age;
mod engine;
mod job;
mod log;
mod remover;
mod scanner;

pub use age::{SECONDS_PER_DAY, is_expired, max_age_from_days};
pub use engine::{Evaluation, ExpiredSet, RetentionPolicyEngine, SweepOutcome, SweepReport};
pub use job::{
    DEFAULT_JOB_ROOT, JOB_MAX_AGE_DAYS, is_job_directory_name, job_max_age, scan_job_directories,
};
pub use log::{RecordingLog, SweepEvent, SweepKind, SweepLog, TracingLog};
pub use remover::{ObjectRemover, RemovalSummary};
pub use scanner::{
    FilesystemObject, ObjectKind, RuleScan, ScannedObject, list_directory, scan,
};
