//! Shallow partial-update merge.

use crate::record::Record;

/// Overwrite fields of `stored` that also appear in `incoming`.
///
/// Fields present only in `incoming` are dropped, so a patch can never add
/// fields. Nested objects are replaced whole.
pub fn merge(mut stored: Record, incoming: &Record) -> Record {
    let fields = stored.fields_mut();
    for (name, value) in incoming.as_map() {
        if let Some(slot) = fields.get_mut(name) {
            *slot = value.clone();
        }
    }
    stored
}
