//! Record type: an ordered field map with one identifier field.

use crate::error::StoreError;
use crate::kind::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Integer storage key of a record within its collection.
pub type RecordId = u64;

/// One organization or member.
///
/// Field order is preserved exactly as received and as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Accept a request payload. Only JSON objects are records.
    pub fn from_payload(payload: Value) -> Result<Self, StoreError> {
        match payload {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(StoreError::PayloadNotObject),
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field names in stored order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identifier stored under `kind`'s identifier field.
    pub fn id(&self, kind: EntityKind) -> Option<RecordId> {
        self.get(kind.id_field()).and_then(record_id_from_value)
    }

    /// Force the identifier field. An existing field keeps its position.
    pub fn set_id(&mut self, kind: EntityKind, id: RecordId) {
        self.0.insert(kind.id_field().to_string(), Value::from(id));
    }

    pub(crate) fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

/// Interpret a stored or submitted value as an identifier.
///
/// Accepts non-negative integers and strings of ASCII digits, so `1` and
/// `"1"` name the same record.
pub fn record_id_from_value(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}
