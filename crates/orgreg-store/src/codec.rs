//! Record file codec: one pretty-printed JSON object per file.
//!
//! Files are UTF-8, indented with four spaces, non-ASCII text left unescaped.
//! Writes go through a temporary sibling and a rename so a reader sees either
//! the old record or the new one.

use crate::error::StorageError;
use crate::record::Record;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const INDENT: &[u8] = b"    ";

/// Render a record in its on-disk text form.
pub fn encode_record(record: &Record) -> Result<Vec<u8>, StorageError> {
    let mut out = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    record
        .serialize(&mut ser)
        .map_err(|e| StorageError::Serialize(e.to_string()))?;
    Ok(out)
}

/// Parse a record from on-disk bytes. `path` is used for error context.
pub fn decode_record(path: &Path, bytes: &[u8]) -> Result<Record, StorageError> {
    validate_record_bytes(path, bytes)?;
    let value: Value = serde_json::from_slice(bytes).map_err(|e| StorageError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(fields) => Ok(Record::from_fields(fields)),
        other => Err(StorageError::Corrupt(format!(
            "{}: expected a JSON object, found {}",
            path.display(),
            json_type_name(&other)
        ))),
    }
}

/// Read one record file.
pub fn read_record_from_path(path: impl AsRef<Path>) -> Result<Record, StorageError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
    decode_record(path, &bytes)
}

/// Atomically create or replace one record file.
pub fn write_record_to_path(path: impl AsRef<Path>, record: &Record) -> Result<(), StorageError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let bytes = encode_record(record)?;
    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), StorageError> {
        let file = File::create(&tmp_path).map_err(|e| StorageError::io(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&bytes)
            .map_err(|e| StorageError::io(&tmp_path, e))?;
        writer.flush().map_err(|e| StorageError::io(&tmp_path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| StorageError::io(&tmp_path, e.into_error()))?;
        file.sync_all().map_err(|e| StorageError::io(&tmp_path, e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StorageError::io(path, e)
    })?;

    sync_parent_dir(path)
}

/// Remove one record file and make the removal durable.
///
/// Returns `false` when the file did not exist.
pub fn remove_record_at_path(path: impl AsRef<Path>) -> Result<bool, StorageError> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => {
            sync_parent_dir(path)?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent).map_err(|e| StorageError::io(parent, e))?;
        dir.sync_all().map_err(|e| StorageError::io(parent, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(
        ".tmp.{}.{}",
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ));
    PathBuf::from(tmp)
}

fn validate_record_bytes(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if bytes.contains(&0) {
        return Err(StorageError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(StorageError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_payload(value).expect("fixture is an object")
    }

    #[test]
    fn encodes_with_four_space_indent_and_raw_unicode() {
        let bytes = encode_record(&record(json!({
            "cnpj": "12345678901234",
            "name": "Padaria São João",
            "area_of_activity": "Alimentação",
            "company_id": 1
        })))
        .expect("record should encode");
        let text = String::from_utf8(bytes).expect("utf-8 output");

        insta::assert_snapshot!(text, @r#"
        {
            "cnpj": "12345678901234",
            "name": "Padaria São João",
            "area_of_activity": "Alimentação",
            "company_id": 1
        }
        "#);
    }

    #[test]
    fn read_rejects_nul_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("1.json");
        fs::write(&path, b"{\"name\":\"Acme\"}\n\0garbage").expect("fixture should write");

        match read_record_from_path(&path) {
            Err(StorageError::Corrupt(message)) => assert!(message.contains("contains NUL")),
            other => panic!("expected corrupt record error, got {other:?}"),
        }
    }

    #[test]
    fn read_rejects_non_utf8_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("1.json");
        fs::write(&path, [0xff, 0xfe, 0xfd]).expect("fixture should write");

        match read_record_from_path(&path) {
            Err(StorageError::Corrupt(message)) => assert!(message.contains("non-UTF-8")),
            other => panic!("expected corrupt record error, got {other:?}"),
        }
    }

    #[test]
    fn read_rejects_non_object_and_malformed_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let array_path = dir.path().join("1.json");
        fs::write(&array_path, b"[1, 2]").expect("fixture should write");
        assert!(matches!(
            read_record_from_path(&array_path),
            Err(StorageError::Corrupt(message)) if message.contains("an array")
        ));

        let broken_path = dir.path().join("2.json");
        fs::write(&broken_path, b"{\"name\": ").expect("fixture should write");
        assert!(matches!(
            read_record_from_path(&broken_path),
            Err(StorageError::Parse { .. })
        ));
    }

    #[test]
    fn write_replaces_file_and_leaves_no_temporaries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("companies").join("1.json");

        write_record_to_path(&path, &record(json!({"name": "First"})))
            .expect("first write should succeed");
        write_record_to_path(&path, &record(json!({"name": "Second"})))
            .expect("second write should succeed");

        let stored = read_record_from_path(&path).expect("record should read back");
        assert_eq!(stored.get("name"), Some(&json!("Second")));

        let entries: Vec<_> = fs::read_dir(path.parent().expect("parent"))
            .expect("dir should list")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![OsString::from("1.json")]);
    }

    #[test]
    fn remove_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("1.json");
        write_record_to_path(&path, &record(json!({"name": "Gone"}))).expect("write");

        assert!(remove_record_at_path(&path).expect("first remove"));
        assert!(!remove_record_at_path(&path).expect("second remove"));
    }
}
