//! Logging capability injected into every sweep component.
//!
//! Components never call `tracing` directly. They report [`SweepEvent`]s to a
//! [`SweepLog`], which the binary backs with [`TracingLog`] and tests back with
//! [`RecordingLog`] so assertions can be made on exactly what was reported.

use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::scanner::ObjectKind;
use crate::config::LogLevel;

/// Which of the two sweeps an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// Configured directories, each with its own retention period.
    Rules,
    /// `J######` directories under the job root, fixed 30-day period.
    JobDirectories,
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepKind::Rules => f.write_str("rules"),
            SweepKind::JobDirectories => f.write_str("job_directories"),
        }
    }
}

/// Everything a sweep reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepEvent {
    SweepStarted {
        sweep: SweepKind,
        reference_time: DateTime<Utc>,
    },
    ScanFailed {
        directory: PathBuf,
        error: String,
    },
    /// An entry was listed but its type or mtime could not be read.
    EntrySkipped {
        path: PathBuf,
        error: String,
    },
    /// A job-pattern name that is not a directory.
    NotADirectory {
        path: PathBuf,
    },
    Expired {
        path: PathBuf,
        max_age_days: u32,
    },
    NothingToDo {
        sweep: SweepKind,
    },
    Removed {
        path: PathBuf,
        kind: ObjectKind,
    },
    WouldRemove {
        path: PathBuf,
        kind: ObjectKind,
    },
    AlreadyGone {
        path: PathBuf,
    },
    RemovalFailed {
        path: PathBuf,
        error: String,
    },
    SweepComplete {
        sweep: SweepKind,
        expired: usize,
        removed: u64,
        failed: usize,
        dry_run: bool,
    },
}

/// Sink for sweep events.
pub trait SweepLog: Send + Sync {
    fn info(&self, event: &SweepEvent);
    fn warn(&self, event: &SweepEvent);
    fn error(&self, event: &SweepEvent);

    /// Diagnostic detail; dropped unless the sink opts in.
    fn debug(&self, _event: &SweepEvent) {}
}

// `tracing` macros need the level at compile time.
macro_rules! emit {
    ($level:expr, $($args:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($args)+),
            LogLevel::Debug => tracing::debug!($($args)+),
            LogLevel::Info => tracing::info!($($args)+),
            LogLevel::Warn => tracing::warn!($($args)+),
            LogLevel::Error => tracing::error!($($args)+),
        }
    };
}

/// Forwards sweep events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl TracingLog {
    fn record(&self, level: LogLevel, event: &SweepEvent) {
        match event {
            SweepEvent::SweepStarted {
                sweep,
                reference_time,
            } => emit!(level, sweep = %sweep, reference_time = %reference_time, "Starting sweep"),
            SweepEvent::ScanFailed { directory, error } => emit!(
                level,
                directory = %directory.display(),
                error = %error,
                "Failed to scan directory, skipping"
            ),
            SweepEvent::EntrySkipped { path, error } => emit!(
                level,
                path = %path.display(),
                error = %error,
                "Failed to inspect entry, skipping"
            ),
            SweepEvent::NotADirectory { path } => emit!(
                level,
                path = %path.display(),
                "Job-named entry is not a directory, ignoring"
            ),
            SweepEvent::Expired { path, max_age_days } => emit!(
                level,
                path = %path.display(),
                max_age_days = max_age_days,
                "Object expired"
            ),
            SweepEvent::NothingToDo { sweep } => {
                emit!(level, sweep = %sweep, "Nothing to do")
            }
            SweepEvent::Removed { path, kind } => {
                emit!(level, path = %path.display(), kind = %kind, "Removed")
            }
            SweepEvent::WouldRemove { path, kind } => emit!(
                level,
                path = %path.display(),
                kind = %kind,
                "DRY RUN: Would remove"
            ),
            SweepEvent::AlreadyGone { path } => emit!(
                level,
                path = %path.display(),
                "Object not found during removal"
            ),
            SweepEvent::RemovalFailed { path, error } => emit!(
                level,
                path = %path.display(),
                error = %error,
                "Failed to remove"
            ),
            SweepEvent::SweepComplete {
                sweep,
                expired,
                removed,
                failed,
                dry_run,
            } => emit!(
                level,
                sweep = %sweep,
                expired = expired,
                removed = removed,
                failed = failed,
                dry_run = dry_run,
                "Sweep complete"
            ),
        }
    }
}

impl SweepLog for TracingLog {
    fn info(&self, event: &SweepEvent) {
        self.record(LogLevel::Info, event);
    }

    fn warn(&self, event: &SweepEvent) {
        self.record(LogLevel::Warn, event);
    }

    fn error(&self, event: &SweepEvent) {
        self.record(LogLevel::Error, event);
    }

    fn debug(&self, event: &SweepEvent) {
        self.record(LogLevel::Debug, event);
    }
}

/// Captures events in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<(LogLevel, SweepEvent)>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn entries(&self) -> Vec<(LogLevel, SweepEvent)> {
        self.entries.lock().clone()
    }

    /// Events recorded at `level`.
    pub fn at(&self, level: LogLevel) -> Vec<SweepEvent> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn push(&self, level: LogLevel, event: &SweepEvent) {
        self.entries.lock().push((level, event.clone()));
    }
}

impl SweepLog for RecordingLog {
    fn info(&self, event: &SweepEvent) {
        self.push(LogLevel::Info, event);
    }

    fn warn(&self, event: &SweepEvent) {
        self.push(LogLevel::Warn, event);
    }

    fn error(&self, event: &SweepEvent) {
        self.push(LogLevel::Error, event);
    }

    fn debug(&self, event: &SweepEvent) {
        self.push(LogLevel::Debug, event);
    }
}
