//! Uniqueness of a designated field across one collection.
//!
//! There is no secondary index; every check scans the whole collection.

use crate::collection::Collection;
use crate::error::StorageError;
use crate::record::RecordId;
use serde_json::Value;

/// First record other than `except` whose `field` equals `value` exactly.
pub fn find_conflict(
    collection: &Collection,
    field: &str,
    value: &Value,
    except: Option<RecordId>,
) -> Result<Option<RecordId>, StorageError> {
    for entry in collection.records()? {
        let (id, record) = entry?;
        if Some(id) == except {
            continue;
        }
        if record.get(field) == Some(value) {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// Whether no record in `collection` already holds `value` in `field`.
pub fn check_unique(
    collection: &Collection,
    field: &str,
    value: &Value,
) -> Result<bool, StorageError> {
    Ok(find_conflict(collection, field, value, None)?.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{EntityKind, TAX_CODE_FIELD};
    use crate::record::Record;
    use serde_json::json;

    fn seeded(dir: &std::path::Path) -> Collection {
        let collection = Collection::new(EntityKind::Organization, dir);
        let writer = collection.lock().expect("lock");
        for (id, cnpj) in [(1, "11111111111111"), (2, "ABCDEFGHIJKLMN")] {
            let record = Record::from_payload(json!({ "cnpj": cnpj, "company_id": id }))
                .expect("object");
            writer.write(id, &record).expect("write");
        }
        drop(writer);
        collection
    }

    #[test]
    fn detects_exact_matches_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let collection = seeded(dir.path());

        assert!(!check_unique(&collection, TAX_CODE_FIELD, &json!("11111111111111")).unwrap());
        assert!(check_unique(&collection, TAX_CODE_FIELD, &json!("abcdefghijklmn")).unwrap());
        assert!(check_unique(&collection, TAX_CODE_FIELD, &json!("22222222222222")).unwrap());
    }

    #[test]
    fn excluded_record_does_not_conflict_with_itself() {
        let dir = tempfile::tempdir().expect("tempdir");
        let collection = seeded(dir.path());
        let value = json!("ABCDEFGHIJKLMN");

        assert_eq!(
            find_conflict(&collection, TAX_CODE_FIELD, &value, Some(2)).unwrap(),
            None
        );
        assert_eq!(
            find_conflict(&collection, TAX_CODE_FIELD, &value, Some(1)).unwrap(),
            Some(2)
        );
    }
}
