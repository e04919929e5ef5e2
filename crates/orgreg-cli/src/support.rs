use orgreg_store::{RecordStore, StoreConfig, StoreError};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Exit code for errors caused by the request.
pub const EXIT_CLIENT_ERROR: i32 = 1;
/// Exit code for storage failures.
pub const EXIT_SERVER_ERROR: i32 = 2;

pub fn open_store_or_exit(config: Option<&str>, data_dir: Option<&str>) -> RecordStore {
    let mut resolved = StoreConfig::load(config.map(Path::new)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(EXIT_CLIENT_ERROR);
    });
    if let Some(dir) = data_dir {
        resolved.data_dir = PathBuf::from(dir);
    }
    log::debug!("using data directory {}", resolved.data_dir.display());
    RecordStore::from_config(&resolved)
}

/// Parse a `--payload` argument: inline JSON, or `@path` to a JSON file.
pub fn parse_payload(arg: &str) -> Result<Value, String> {
    let (text, origin) = match arg.strip_prefix('@') {
        Some(path) => (
            fs::read_to_string(path)
                .map_err(|e| format!("failed to read payload file {path}: {e}"))?,
            path,
        ),
        None => (arg.to_string(), "--payload"),
    };
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON in {origin}: {e}"))
}

pub fn parse_payload_or_exit(arg: &str) -> Value {
    parse_payload(arg).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(EXIT_CLIENT_ERROR);
    })
}

/// Status envelope for a failed store operation.
pub fn error_payload(err: &StoreError) -> Value {
    let class = err.class();
    json!({
        "status": class.status_code(),
        "class": class.as_str(),
        "message": err.to_string(),
    })
}

pub fn exit_code(err: &StoreError) -> i32 {
    if err.class().is_client_error() {
        EXIT_CLIENT_ERROR
    } else {
        EXIT_SERVER_ERROR
    }
}

pub fn exit_with_store_error(err: StoreError, json_output: bool) -> ! {
    if json_output {
        print_json(&error_payload(&err));
    } else {
        eprintln!("error: {err}");
    }
    process::exit(exit_code(&err));
}

pub fn print_json(payload: &Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: failed to render JSON output: {e}");
            process::exit(EXIT_SERVER_ERROR);
        }
    }
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
