//! Organization → member cascade.
//!
//! The cascade runs after the organization file is gone and is not
//! transactional: if it fails partway, the members not yet removed stay on
//! disk referencing an organization that no longer exists.

use crate::collection::CollectionWriter;
use crate::error::StorageError;
use crate::kind::{EntityKind, ORGANIZATION_REFERENCE_FIELD};
use crate::record::{RecordId, record_id_from_value};

/// Remove every member whose organization reference resolves to
/// `organization_id`. Returns the removed member identifiers.
///
/// `members` must be the member collection's writer, held for the whole scan.
pub fn cascade_delete(
    members: &CollectionWriter<'_>,
    organization_id: RecordId,
) -> Result<Vec<RecordId>, StorageError> {
    debug_assert_eq!(members.kind(), EntityKind::Member);

    let mut doomed = Vec::new();
    for entry in members.records()? {
        let (id, record) = entry?;
        let references = record
            .get(ORGANIZATION_REFERENCE_FIELD)
            .and_then(record_id_from_value);
        if references == Some(organization_id) {
            doomed.push(id);
        }
    }

    let mut removed = Vec::with_capacity(doomed.len());
    for id in doomed {
        if let Err(err) = members.remove(id) {
            log::warn!(
                "cascade for company {organization_id} stopped after {} of its users: {err}",
                removed.len()
            );
            return Err(err);
        }
        removed.push(id);
    }
    Ok(removed)
}
