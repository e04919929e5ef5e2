//! Identifier allocation from current occupancy.
//!
//! The next identifier is one past the largest identifier present now. There
//! is no persisted counter: deleting the highest record makes its identifier
//! available again, and gaps below the maximum are never filled.

use crate::collection::CollectionWriter;
use crate::error::StorageError;
use crate::record::RecordId;

/// `max(ids) + 1`, or 1 for an empty set. `None` once `u64::MAX` is taken.
pub fn next_id(ids: impl IntoIterator<Item = RecordId>) -> Option<RecordId> {
    match ids.into_iter().max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Allocate the next identifier for a locked collection.
///
/// The result stays valid only while `writer` is held.
pub fn allocate(writer: &CollectionWriter<'_>) -> Result<RecordId, StorageError> {
    next_id(writer.ids()?).ok_or_else(|| StorageError::IdentifiersExhausted {
        dir: writer.dir().display().to_string(),
    })
}
