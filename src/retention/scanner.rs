//! One-level directory scanning for configured retention rules.

use std::{
    cell::OnceCell,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};

use super::{
    age::is_expired,
    log::{SweepEvent, SweepLog},
};
use crate::{config::RetentionRule, error::ScanError};

/// What a directory entry is, as seen without following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    File,
    Directory,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::File => f.write_str("file"),
            ObjectKind::Directory => f.write_str("directory"),
        }
    }
}

impl ObjectKind {
    /// Symbolic links count as files so that removing one never touches its target.
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            ObjectKind::Directory
        } else {
            ObjectKind::File
        }
    }
}

/// An entry found during a scan.
///
/// Only lives for one scan/evaluate cycle. The modification time is read
/// on first use and cached.
#[derive(Debug)]
pub struct FilesystemObject {
    path: PathBuf,
    kind: ObjectKind,
    modified_at: OnceCell<DateTime<Utc>>,
}

impl FilesystemObject {
    pub fn new(path: impl Into<PathBuf>, kind: ObjectKind) -> Self {
        Self {
            path: path.into(),
            kind,
            modified_at: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// The entry's own name (last path component).
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Last modification time of the entry itself (links are not followed).
    pub fn modified_at(&self) -> io::Result<DateTime<Utc>> {
        if let Some(modified_at) = self.modified_at.get() {
            return Ok(*modified_at);
        }
        let modified = fs::symlink_metadata(&self.path)?.modified()?;
        Ok(*self.modified_at.get_or_init(|| DateTime::<Utc>::from(modified)))
    }

    pub fn is_expired(&self, reference_time: DateTime<Utc>, max_age: Duration) -> io::Result<bool> {
        Ok(is_expired(reference_time, self.modified_at()?, max_age))
    }
}

/// An entry paired with the rule that governs it.
#[derive(Debug)]
pub struct ScannedObject<'a> {
    pub object: FilesystemObject,
    pub rule: &'a RetentionRule,
}

/// Result of scanning every configured rule.
#[derive(Debug, Default)]
pub struct RuleScan<'a> {
    pub objects: Vec<ScannedObject<'a>>,
    pub errors: Vec<ScanError>,
}

/// List the immediate entries of every rule's directory.
///
/// A directory that cannot be listed is logged and recorded in
/// [`RuleScan::errors`]; the remaining rules are still scanned.
pub fn scan<'a>(rules: &'a [RetentionRule], log: &dyn SweepLog) -> RuleScan<'a> {
    let mut result = RuleScan::default();

    for rule in rules {
        match list_directory(rule.directory(), log) {
            Ok(objects) => {
                result
                    .objects
                    .extend(objects.into_iter().map(|object| ScannedObject { object, rule }));
            }
            Err(e) => {
                log.error(&SweepEvent::ScanFailed {
                    directory: e.directory.clone(),
                    error: e.source.to_string(),
                });
                result.errors.push(e);
            }
        }
    }

    result
}

/// List the immediate entries of `directory`, sorted by name.
///
/// Entries whose type cannot be determined are logged at warn and skipped.
pub fn list_directory(
    directory: &Path,
    log: &dyn SweepLog,
) -> Result<Vec<FilesystemObject>, ScanError> {
    let entries = fs::read_dir(directory).map_err(|e| ScanError::new(directory, e))?;
    let mut objects = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log.warn(&SweepEvent::EntrySkipped {
                    path: directory.to_path_buf(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let path = directory.join(entry.file_name());
        match entry.file_type() {
            Ok(file_type) => {
                objects.push(FilesystemObject::new(
                    path,
                    ObjectKind::from_file_type(file_type),
                ));
            }
            Err(e) => log.warn(&SweepEvent::EntrySkipped {
                path,
                error: e.to_string(),
            }),
        }
    }

    objects.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(objects)
}
