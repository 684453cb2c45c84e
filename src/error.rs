//! Error types for retention sweeps.
//!
//! Errors are tagged by severity. A [`CleanserError::Fatal`] means the run
//! could not start (bad configuration) and is the only kind that propagates
//! out of [`crate::run`]. Everything scoped to a single directory or a single
//! object is [`CleanserError::Recoverable`]: it is logged, collected into the
//! sweep report, and sibling work carries on.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error, tagged by severity.
#[derive(Debug, Error)]
pub enum CleanserError {
    #[error(transparent)]
    Fatal(#[from] ConfigError),

    #[error(transparent)]
    Recoverable(#[from] RecoverableError),
}

impl CleanserError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CleanserError::Fatal(_))
    }
}

impl From<ScanError> for CleanserError {
    fn from(e: ScanError) -> Self {
        CleanserError::Recoverable(RecoverableError::Scan(e))
    }
}

impl From<RemovalError> for CleanserError {
    fn from(e: RemovalError) -> Self {
        CleanserError::Recoverable(RecoverableError::Removal(e))
    }
}

/// Errors scoped to one directory listing or one object.
#[derive(Debug, Error)]
pub enum RecoverableError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Removal(#[from] RemovalError),
}

/// A directory could not be listed.
#[derive(Debug, Error)]
#[error("Failed to list directory {directory}: {source}")]
pub struct ScanError {
    pub directory: PathBuf,
    #[source]
    pub source: io::Error,
}

impl ScanError {
    pub fn new(directory: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            directory: directory.into(),
            source,
        }
    }
}

/// A single object could not be removed.
#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("Object already gone: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied removing {path}: {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RemovalError {
    /// Classify an I/O failure for `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => RemovalError::NotFound { path },
            io::ErrorKind::PermissionDenied => RemovalError::PermissionDenied { path, source },
            _ => RemovalError::Io { path, source },
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            RemovalError::NotFound { path }
            | RemovalError::PermissionDenied { path, .. }
            | RemovalError::Io { path, .. } => path,
        }
    }

    /// A vanished target is the benign case: someone else already removed it.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemovalError::NotFound { .. })
    }
}
