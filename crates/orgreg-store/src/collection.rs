//! One entity kind's directory of record files.
//!
//! Layout: `<root>/<kind dir>/<id>.json`. Reads go straight to the files and
//! take no lock. Writes require a [`CollectionWriter`], which holds the
//! collection mutex and the on-disk lock for its whole lifetime.

use crate::codec::{decode_record, remove_record_at_path, write_record_to_path};
use crate::error::StorageError;
use crate::kind::EntityKind;
use crate::lock::CollectionLockGuard;
use crate::record::{Record, RecordId};
use std::ffi::OsStr;
use std::fs::{self, ReadDir};
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const RECORD_EXTENSION: &str = ".json";

#[derive(Debug)]
pub struct Collection {
    kind: EntityKind,
    dir: PathBuf,
    writer: Mutex<()>,
}

impl Collection {
    pub fn new(kind: EntityKind, root: impl AsRef<Path>) -> Self {
        Self {
            kind,
            dir: root.as_ref().join(kind.dir_name()),
            writer: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, id: RecordId) -> PathBuf {
        self.dir.join(format!("{id}{RECORD_EXTENSION}"))
    }

    /// Identifiers currently stored. A missing directory is an empty collection.
    pub fn ids(&self) -> Result<Vec<RecordId>, StorageError> {
        let Some(entries) = self.read_dir()? else {
            return Ok(Vec::new());
        };
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            if let Some(id) = record_id_from_file_name(&entry.file_name()) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn contains(&self, id: RecordId) -> Result<bool, StorageError> {
        let path = self.record_path(id);
        path.try_exists().map_err(|e| StorageError::io(&path, e))
    }

    /// Read one record; `None` if no file exists for `id`.
    pub fn read(&self, id: RecordId) -> Result<Option<Record>, StorageError> {
        let path = self.record_path(id);
        match fs::read(&path) {
            Ok(bytes) => decode_record(&path, &bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    /// Lazily enumerate every record, in directory order.
    pub fn records(&self) -> Result<Records<'_>, StorageError> {
        Ok(Records {
            collection: self,
            entries: self.read_dir()?,
        })
    }

    /// Take the collection's writer lock.
    pub fn lock(&self) -> Result<CollectionWriter<'_>, StorageError> {
        let mutex = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let file_lock = CollectionLockGuard::acquire(&self.dir)?;
        Ok(CollectionWriter {
            collection: self,
            _file_lock: file_lock,
            _mutex: mutex,
        })
    }

    fn read_dir(&self) -> Result<Option<ReadDir>, StorageError> {
        match fs::read_dir(&self.dir) {
            Ok(entries) => Ok(Some(entries)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&self.dir, e)),
        }
    }
}

/// Exclusive write access to one collection.
///
/// Field order matters: the lock file is removed before the mutex unlocks.
pub struct CollectionWriter<'a> {
    collection: &'a Collection,
    _file_lock: CollectionLockGuard,
    _mutex: MutexGuard<'a, ()>,
}

impl CollectionWriter<'_> {
    pub fn write(&self, id: RecordId, record: &Record) -> Result<(), StorageError> {
        let path = self.collection.record_path(id);
        write_record_to_path(&path, record)?;
        log::debug!("wrote {} record {id} to {}", self.kind(), path.display());
        Ok(())
    }

    /// Remove one record file. Returns `false` if it was already gone.
    pub fn remove(&self, id: RecordId) -> Result<bool, StorageError> {
        let removed = remove_record_at_path(self.collection.record_path(id))?;
        if removed {
            log::debug!("removed {} record {id}", self.kind());
        }
        Ok(removed)
    }
}

impl Deref for CollectionWriter<'_> {
    type Target = Collection;

    fn deref(&self) -> &Collection {
        self.collection
    }
}

/// Lazy iterator over a collection's records.
///
/// Files that disappear between listing and reading are skipped.
pub struct Records<'a> {
    collection: &'a Collection,
    entries: Option<ReadDir>,
}

impl Iterator for Records<'_> {
    type Item = Result<(RecordId, Record), StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries.as_mut()?;
        loop {
            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(StorageError::io(&self.collection.dir, e))),
            };
            let Some(id) = record_id_from_file_name(&entry.file_name()) else {
                continue;
            };
            match self.collection.read(id) {
                Ok(Some(record)) => return Some(Ok((id, record))),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Parse `<id>.json` with `id` in canonical decimal form.
///
/// Lock files, temporaries, strays and aliases such as `01.json` yield `None`.
fn record_id_from_file_name(name: &OsStr) -> Option<RecordId> {
    let name = name.to_str()?;
    let Some(stem) = name.strip_suffix(RECORD_EXTENSION) else {
        if name != ".lock" && !name.contains(".json.tmp.") {
            log::warn!("ignoring unexpected file in collection directory: {name}");
        }
        return None;
    };
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        log::warn!("ignoring record file with a non-numeric name: {name}");
        return None;
    }
    // Must round-trip through `record_path`.
    match stem.parse::<RecordId>() {
        Ok(id) if id.to_string() == stem => Some(id),
        _ => {
            log::warn!("ignoring record file with a non-canonical name: {name}");
            None
        }
    }
}
