use crate::cli::RecordCommands;
use crate::support::{exit_with_store_error, parse_payload_or_exit, print_json};
use orgreg_store::{DeleteOutcome, EntityKind, Record, RecordStore};
use serde_json::{Value, json};

pub fn run(store: &RecordStore, kind: EntityKind, command: RecordCommands) {
    match command {
        RecordCommands::Create { payload, json } => {
            let payload = parse_payload_or_exit(&payload);
            let record = store
                .create(kind, payload)
                .unwrap_or_else(|e| exit_with_store_error(e, json));
            render_record(store, kind, "create", "Created", &record, json);
        }

        RecordCommands::Get { id, json } => {
            let record = store
                .get(kind, id)
                .unwrap_or_else(|e| exit_with_store_error(e, json));
            render_record(store, kind, "get", "Found", &record, json);
        }

        RecordCommands::List { json } => {
            let records = store
                .list(kind)
                .unwrap_or_else(|e| exit_with_store_error(e, json));
            render_list(kind, sorted_by_id(kind, records), json);
        }

        RecordCommands::Replace { id, payload, json } => {
            let payload = parse_payload_or_exit(&payload);
            let record = store
                .replace(kind, id, payload)
                .unwrap_or_else(|e| exit_with_store_error(e, json));
            render_record(store, kind, "replace", "Replaced", &record, json);
        }

        RecordCommands::Patch { id, payload, json } => {
            let payload = parse_payload_or_exit(&payload);
            let record = store
                .patch(kind, id, payload)
                .unwrap_or_else(|e| exit_with_store_error(e, json));
            render_record(store, kind, "patch", "Updated", &record, json);
        }

        RecordCommands::Delete { id, json } => {
            let outcome = store
                .delete(kind, id)
                .unwrap_or_else(|e| exit_with_store_error(e, json));
            render_delete(&outcome, json);
        }
    }
}

/// Records ordered by identifier; records without one sort last.
pub fn sorted_by_id(kind: EntityKind, mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|record| record.id(kind).unwrap_or(u64::MAX));
    records
}

fn action(kind: EntityKind, verb: &str) -> String {
    format!("{}.{verb}", kind.as_str())
}

fn render_record(
    store: &RecordStore,
    kind: EntityKind,
    verb: &str,
    heading: &str,
    record: &Record,
    json_output: bool,
) {
    if json_output {
        print_json(&json!({
            "action": action(kind, verb),
            "record": record.as_map()
        }));
        return;
    }

    println!("orgreg {kind} {verb}");
    println!();
    match record.id(kind) {
        Some(id) => {
            println!("  {heading}: {} {id}", kind.label().to_lowercase());
            println!(
                "  Path: {}",
                store.collection(kind).record_path(id).display()
            );
        }
        None => println!("  {heading}: {}", kind.label().to_lowercase()),
    }
    print_fields(kind, record);
}

fn render_list(kind: EntityKind, records: Vec<Record>, json_output: bool) {
    if json_output {
        let items = records.into_iter().map(Value::from).collect::<Vec<_>>();
        print_json(&json!({
            "action": action(kind, "list"),
            "count": items.len(),
            "items": items
        }));
        return;
    }

    println!("orgreg {kind} list");
    println!();
    println!("  Count: {}", records.len());
    for record in &records {
        let id = record
            .id(kind)
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string());
        let name = record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("(unnamed)");
        println!("  - [{id}] {name}");
    }
}

fn render_delete(outcome: &DeleteOutcome, json_output: bool) {
    let kind = outcome.kind;
    if json_output {
        print_json(&json!({
            "action": action(kind, "delete"),
            "id": outcome.id,
            "cascaded": outcome.cascaded
        }));
        return;
    }

    println!("orgreg {kind} delete");
    println!();
    println!(
        "  Deleted: {} {}",
        kind.label().to_lowercase(),
        outcome.id
    );
    if kind == EntityKind::Organization {
        if outcome.cascaded.is_empty() {
            println!("  Cascaded users: none");
        } else {
            let ids = outcome
                .cascaded
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>();
            println!("  Cascaded users: {}", ids.join(", "));
        }
    }
}

fn print_fields(kind: EntityKind, record: &Record) {
    for (field, value) in record.as_map() {
        if field == kind.id_field() {
            continue;
        }
        let shown = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("  {field}: {shown}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64) -> Record {
        let fields = json!({"id_user": id, "name": format!("user {id}")});
        Record::from_payload(fields).expect("object payload")
    }

    #[test]
    fn sorted_by_id_orders_numerically() {
        let records = vec![member(10), member(2), member(7)];
        let ids = sorted_by_id(EntityKind::Member, records)
            .iter()
            .filter_map(|r| r.id(EntityKind::Member))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 7, 10]);
    }

    #[test]
    fn action_names_use_kind_prefix() {
        assert_eq!(action(EntityKind::Organization, "create"), "organization.create");
        assert_eq!(action(EntityKind::Member, "delete"), "member.delete");
    }
}
