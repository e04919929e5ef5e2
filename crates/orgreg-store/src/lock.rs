//! On-disk writer lock for one collection directory.
//!
//! The in-process mutex in [`crate::collection::Collection`] serializes
//! threads; this lock file keeps a second process from writing the same
//! partition at the same time. Acquisition never waits: a held lock is
//! reported as [`StorageError::LockBusy`], naming the pid recorded in the
//! lock file so a stale lock can be told apart from a live one.

use crate::error::StorageError;
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOCK_FILE_NAME: &str = ".lock";

pub fn collection_lock_path(dir: &Path) -> PathBuf {
    dir.join(LOCK_FILE_NAME)
}

pub(crate) struct CollectionLockGuard {
    lock_path: PathBuf,
    _file: File,
}

impl CollectionLockGuard {
    pub(crate) fn acquire(dir: &Path) -> Result<Self, StorageError> {
        let lock_path = collection_lock_path(dir);
        fs::create_dir_all(dir).map_err(|e| lock_io(&lock_path, e.to_string()))?;

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(mut file) => {
                let _ = writeln!(
                    file,
                    "pid={}\nutc={}",
                    std::process::id(),
                    Utc::now().to_rfc3339()
                );
                Ok(Self {
                    lock_path,
                    _file: file,
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StorageError::LockBusy {
                    holder: lock_holder(&lock_path),
                    lock_path: lock_path.display().to_string(),
                })
            }
            Err(err) => Err(lock_io(&lock_path, err.to_string())),
        }
    }
}

impl Drop for CollectionLockGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.lock_path) {
            log::warn!(
                "failed to release collection lock {}: {err}",
                self.lock_path.display()
            );
        }
    }
}

/// Describe who holds a busy lock from the `pid=` line its owner wrote.
fn lock_holder(lock_path: &Path) -> String {
    let contents = fs::read_to_string(lock_path).unwrap_or_default();
    let mut pid = None;
    let mut utc = None;
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("pid=") {
            pid = Some(value.trim());
        } else if let Some(value) = line.strip_prefix("utc=") {
            utc = Some(value.trim());
        }
    }
    match (pid, utc) {
        (Some(pid), Some(utc)) => format!("pid {pid} since {utc}"),
        (Some(pid), None) => format!("pid {pid}"),
        _ => "unknown process".to_string(),
    }
}

fn lock_io(lock_path: &Path, message: String) -> StorageError {
    StorageError::LockIo {
        lock_path: lock_path.display().to_string(),
        message,
    }
}
