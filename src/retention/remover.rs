//! Deletes exactly what it is told to.
//!
//! No age check happens here; the caller has already decided expiry. Each path
//! is handled on its own, so one failure never stops the rest of the batch.

use std::{
    fs,
    path::{Path, PathBuf},
};

use super::{
    log::{SweepEvent, SweepLog},
    scanner::ObjectKind,
};
use crate::error::RemovalError;

/// Counts from one removal batch.
#[derive(Debug, Default)]
pub struct RemovalSummary {
    /// Objects deleted.
    pub removed: u64,
    /// Objects that had already disappeared.
    pub already_gone: u64,
    /// Objects that would have been deleted (dry run only).
    pub would_remove: u64,
    /// Deletions that failed for any reason other than the object being gone.
    pub failed: Vec<RemovalError>,
}

impl RemovalSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

enum Removal {
    Removed(ObjectKind),
    Skipped(ObjectKind),
}

/// Deletes files and empty directories.
pub struct ObjectRemover<'a> {
    log: &'a dyn SweepLog,
    dry_run: bool,
}

impl<'a> ObjectRemover<'a> {
    pub fn new(log: &'a dyn SweepLog) -> Self {
        Self {
            log,
            dry_run: false,
        }
    }

    /// Log what would be removed instead of removing it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Remove every path in `paths`.
    ///
    /// Directories are removed with `remove_dir`, so a directory that is not
    /// empty stays put and is reported as a failure.
    pub fn remove(&self, paths: &[PathBuf]) -> RemovalSummary {
        let mut summary = RemovalSummary::default();

        for path in paths {
            match self.remove_one(path) {
                Ok(Removal::Removed(kind)) => {
                    self.log.info(&SweepEvent::Removed {
                        path: path.clone(),
                        kind,
                    });
                    summary.removed += 1;
                }
                Ok(Removal::Skipped(kind)) => {
                    self.log.info(&SweepEvent::WouldRemove {
                        path: path.clone(),
                        kind,
                    });
                    summary.would_remove += 1;
                }
                Err(e) if e.is_not_found() => {
                    self.log.warn(&SweepEvent::AlreadyGone { path: path.clone() });
                    summary.already_gone += 1;
                }
                Err(e) => {
                    let source = match &e {
                        RemovalError::PermissionDenied { source, .. }
                        | RemovalError::Io { source, .. } => source.to_string(),
                        RemovalError::NotFound { .. } => e.to_string(),
                    };
                    self.log.error(&SweepEvent::RemovalFailed {
                        path: path.clone(),
                        error: source,
                    });
                    summary.failed.push(e);
                }
            }
        }

        summary
    }

    fn remove_one(&self, path: &Path) -> Result<Removal, RemovalError> {
        let metadata = fs::symlink_metadata(path).map_err(|e| RemovalError::from_io(path, e))?;
        let kind = ObjectKind::from_file_type(metadata.file_type());

        if self.dry_run {
            return Ok(Removal::Skipped(kind));
        }

        match kind {
            ObjectKind::Directory => fs::remove_dir(path),
            ObjectKind::File => fs::remove_file(path),
        }
        .map_err(|e| RemovalError::from_io(path, e))?;

        Ok(Removal::Removed(kind))
    }
}
