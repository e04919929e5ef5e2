use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_orgreg<I, S>(data_dir: &Path, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_orgreg");
    Command::new(bin)
        .env_remove("ORGREG_DATA_DIR")
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("orgreg command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output, expected_code: i32) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
    assert_eq!(output.status.code(), Some(expected_code));
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

const ACME: &str = r#"{"cnpj":"12345678901234","name":"Acme","area_of_activity":"Tools"}"#;
const ANA: &str =
    r#"{"name":"Ana","company_id":1,"email":"ana@acme.com","password":"secret"}"#;

#[test]
fn init_reports_created_partitions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let data_dir = tmp.path().join("data");

    let output = run_orgreg(&data_dir, ["init", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["action"], "init");
    let partitions = payload["partitions"].as_array().expect("partitions array");
    assert_eq!(partitions.len(), 2);
    assert!(partitions.iter().all(|p| p["created"] == true));
    assert!(data_dir.join("companies").is_dir());
    assert!(data_dir.join("users").is_dir());

    let output = run_orgreg(&data_dir, ["init"]);
    assert_success(&output);
    let text = stdout_text(&output);
    assert!(text.contains("orgreg init"));
    assert!(text.contains("created: no"));
}

#[test]
fn organization_lifecycle_with_cascade() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let data_dir = tmp.path();

    let output = run_orgreg(data_dir, ["organization", "create", "--payload", ACME, "--json"]);
    assert_success(&output);
    let created = parse_json_stdout(&output);
    assert_eq!(created["action"], "organization.create");
    assert_eq!(created["record"]["company_id"], 1);
    assert_eq!(created["record"]["name"], "Acme");

    let output = run_orgreg(data_dir, ["organization", "create", "--payload", ACME, "--json"]);
    assert_failure(&output, 1);
    let error = parse_json_stdout(&output);
    assert_eq!(error["status"], 400);
    assert_eq!(error["class"], "conflict");

    let output = run_orgreg(data_dir, ["member", "create", "--payload", ANA, "--json"]);
    assert_success(&output);
    assert_eq!(parse_json_stdout(&output)["record"]["id_user"], 1);

    let output = run_orgreg(data_dir, ["user", "list", "--json"]);
    assert_success(&output);
    let listed = parse_json_stdout(&output);
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["items"][0]["email"], "ana@acme.com");

    let output = run_orgreg(data_dir, ["organization", "delete", "1", "--json"]);
    assert_success(&output);
    let deleted = parse_json_stdout(&output);
    assert_eq!(deleted["id"], 1);
    assert_eq!(deleted["cascaded"], serde_json::json!([1]));

    let output = run_orgreg(data_dir, ["member", "get", "1", "--json"]);
    assert_failure(&output, 1);
    let error = parse_json_stdout(&output);
    assert_eq!(error["class"], "not_found");
    assert_eq!(error["message"], "User with ID 1 not found");
}

#[test]
fn patch_and_replace_render_human_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let data_dir = tmp.path();
    assert_success(&run_orgreg(
        data_dir,
        ["company", "create", "--payload", ACME],
    ));

    let output = run_orgreg(
        data_dir,
        [
            "organization",
            "patch",
            "1",
            "--payload",
            r#"{"name":"Acme Ltda","website":"acme.example"}"#,
        ],
    );
    assert_success(&output);
    let text = stdout_text(&output);
    assert!(text.contains("orgreg organization patch"));
    assert!(text.contains("Updated: company 1"));
    assert!(text.contains("name: Acme Ltda"));
    assert!(!text.contains("website"));

    let output = run_orgreg(
        data_dir,
        ["organization", "replace", "2", "--payload", ACME],
    );
    assert_failure(&output, 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Company with ID 2 not found"));
}

#[test]
fn payload_can_be_read_from_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let payload_path = tmp.path().join("acme.json");
    fs::write(&payload_path, ACME).expect("payload should be written");
    let data_dir = tmp.path().join("data");

    let arg = format!("@{}", payload_path.display());
    let output = run_orgreg(&data_dir, ["organization", "create", "--payload", arg.as_str()]);
    assert_success(&output);
    assert!(data_dir.join("companies").join("1.json").is_file());
}

#[test]
fn member_without_organization_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");

    let output = run_orgreg(tmp.path(), ["member", "create", "--payload", ANA, "--json"]);
    assert_failure(&output, 1);
    let error = parse_json_stdout(&output);
    assert_eq!(error["class"], "not_found");
    assert!(
        error["message"]
            .as_str()
            .expect("message string")
            .starts_with("Please register your company first")
    );
}

#[test]
fn corrupt_record_exits_with_server_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let companies = tmp.path().join("companies");
    fs::create_dir_all(&companies).expect("companies dir");
    fs::write(companies.join("1.json"), "{ not json").expect("corrupt file");

    let output = run_orgreg(tmp.path(), ["organization", "get", "1", "--json"]);
    assert_failure(&output, 2);
    let error = parse_json_stdout(&output);
    assert_eq!(error["status"], 500);
    assert_eq!(error["class"], "storage");
}
