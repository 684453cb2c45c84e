//! Filesystem fixtures shared by unit tests.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};

/// Set the modification time of a file or directory.
pub fn set_mtime(path: &Path, modified_at: DateTime<Utc>) {
    let handle = fs::File::open(path).unwrap();
    handle.set_modified(SystemTime::from(modified_at)).unwrap();
}

/// Create an empty file named `name` in `dir` with the given mtime.
pub fn aged_file(dir: &Path, name: &str, modified_at: DateTime<Utc>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"").unwrap();
    set_mtime(&path, modified_at);
    path
}

/// Create an empty directory named `name` in `dir` with the given mtime.
///
/// Populate it before calling [`set_mtime`] again if contents are needed:
/// adding entries bumps the directory's mtime.
pub fn aged_dir(dir: &Path, name: &str, modified_at: DateTime<Utc>) -> PathBuf {
    let path = dir.join(name);
    fs::create_dir(&path).unwrap();
    set_mtime(&path, modified_at);
    path
}
