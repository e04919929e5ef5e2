use crate::support::{exit_with_store_error, print_json, yes_no};
use orgreg_store::{EntityKind, RecordStore, StoreError};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub data_dir: PathBuf,
    pub partitions: Vec<(EntityKind, PathBuf, bool)>,
}

pub fn init_layout(store: &RecordStore) -> Result<InitOutcome, StoreError> {
    let existed: Vec<bool> = EntityKind::ALL
        .iter()
        .map(|kind| store.collection(*kind).dir().is_dir())
        .collect();
    store.init()?;

    let partitions = EntityKind::ALL
        .iter()
        .zip(existed)
        .map(|(kind, existed)| (*kind, store.collection(*kind).dir().to_path_buf(), !existed))
        .collect();
    Ok(InitOutcome {
        data_dir: store.root().to_path_buf(),
        partitions,
    })
}

pub fn run(store: &RecordStore, json_output: bool) {
    let outcome = init_layout(store).unwrap_or_else(|e| exit_with_store_error(e, json_output));

    if json_output {
        let partitions = outcome
            .partitions
            .iter()
            .map(|(kind, dir, created)| {
                json!({
                    "kind": kind.as_str(),
                    "path": dir.display().to_string(),
                    "created": created
                })
            })
            .collect::<Vec<_>>();
        print_json(&json!({
            "action": "init",
            "dataDir": outcome.data_dir.display().to_string(),
            "partitions": partitions
        }));
        return;
    }

    println!("orgreg init");
    println!();
    println!("  data dir: {}", outcome.data_dir.display());
    for (kind, dir, created) in &outcome.partitions {
        println!("  {kind}: {} (created: {})", dir.display(), yes_no(*created));
    }
}
