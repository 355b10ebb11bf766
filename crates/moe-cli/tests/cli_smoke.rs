use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "moe-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_moe<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_moe_logged("moe=warn", args)
}

fn run_moe_logged<I, S>(filter: &str, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_moe"))
        .args(args)
        .env("RUST_LOG", filter)
        .output()
        .expect("moe command should execute")
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

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths should be UTF-8")
}

#[test]
fn render_prints_canonical_form() {
    let output = run_moe(["render", " internal ( revision = 42 ) | scrubber > public "]);
    assert_success(&output);
    assert_eq!(stdout_text(&output), "internal(revision=42)|scrubber>public\n");
}

#[test]
fn render_json_describes_expression() {
    let output = run_moe(["render", "internal(revision=42)|scrubber>public", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["action"], "render");
    assert_eq!(payload["operator"], "translate");
    assert_eq!(payload["identifier"], "public");
    assert_eq!(payload["repository"], "internal");
    assert_eq!(payload["depth"], 2);
}

#[test]
fn render_rejects_malformed_expression() {
    let output = run_moe(["render", "internal>"]);
    assert_failure(&output);
    assert!(stderr_text(&output).starts_with("error: invalid expression"));
}

fn write_project(dir: &Path) -> PathBuf {
    let internal = dir.join("internal");
    fs::create_dir_all(internal.join("5/src")).expect("snapshot dir");
    fs::write(internal.join("5/src/Main.java"), "class Main {}\n").expect("fixture file");

    let config = dir.join("moe.toml");
    fs::write(
        &config,
        format!(
            r#"name = "smoke"

[repositories.internal]
type = "directory"
url = "{}"
project_space = "internal"

[[translators]]
from_project_space = "internal"
to_project_space = "public"
steps = [{{ name = "noop", editor = {{ type = "identity" }} }}]
"#,
            path_str(&internal)
        ),
    )
    .expect("config should write");
    config
}

#[test]
fn eval_translates_with_configured_pipeline() {
    let tmp = TempDirGuard::new("eval");
    let config = write_project(tmp.path());

    let output = run_moe([
        "eval",
        "internal(revision=5)>public",
        "--config",
        path_str(&config),
        "--json",
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["project"], "smoke");
    assert_eq!(payload["codebase"]["expression"], "internal(revision=5)>public");
    assert_eq!(payload["codebase"]["projectSpace"], "public");
    assert_eq!(payload["codebase"]["status"], "unmodified");
    assert!(
        payload["codebase"]["root"]
            .as_str()
            .expect("root should be a string")
            .ends_with("5")
    );
}

#[test]
fn eval_logs_to_stderr_only() {
    let tmp = TempDirGuard::new("eval-logs");
    let config = write_project(tmp.path());
    let args = ["eval", "internal(revision=5)>public", "--config", path_str(&config)];

    let logged = run_moe_logged("moe=info", args);
    assert_success(&logged);
    let stderr = stderr_text(&logged);
    assert!(stderr.contains("evaluating expression"), "{stderr}");
    assert!(stdout_text(&logged).starts_with("moe eval\n"));

    let quiet = run_moe_logged("moe=warn", args);
    assert_success(&quiet);
    assert!(!stderr_text(&quiet).contains("evaluating expression"));
    assert_eq!(stdout_text(&quiet), stdout_text(&logged));
}

#[test]
fn db_record_fails_while_lock_is_held() {
    let tmp = TempDirGuard::new("db-locked");
    let db = tmp.path().join("db.json");
    let lock = tmp.path().join("db.json.lock");
    fs::write(&lock, "{}").expect("lock should write");

    let output = run_moe(["db", "record", "internal:1", "public:a", "--db", path_str(&db)]);
    assert_failure(&output);
    assert!(stderr_text(&output).contains("locked by another writer"));
    assert!(!db.exists());
    assert!(lock.exists());
}

#[test]
fn eval_reports_missing_translator() {
    let tmp = TempDirGuard::new("eval-missing");
    let config = write_project(tmp.path());

    let output = run_moe(["eval", "internal>mirror", "--config", path_str(&config)]);
    assert_failure(&output);
    let stderr = stderr_text(&output);
    assert!(stderr.contains("could not find translator from project space \"internal\" to \"mirror\""));
    assert!(stderr.contains("[public]"));
}

#[test]
fn db_record_is_idempotent_and_find_is_symmetric() {
    let tmp = TempDirGuard::new("db");
    let db = tmp.path().join("moe/db.json");

    let first = run_moe([
        "db",
        "record",
        "internal:42",
        "public:7",
        "--db",
        path_str(&db),
        "--json",
    ]);
    assert_success(&first);
    assert_eq!(parse_json_stdout(&first)["recorded"], true);
    let written = fs::read_to_string(&db).expect("db should be written");

    let again = run_moe([
        "db",
        "record",
        "public:7",
        "internal:42",
        "--db",
        path_str(&db),
        "--json",
    ]);
    assert_success(&again);
    assert_eq!(parse_json_stdout(&again)["recorded"], false);
    assert_eq!(fs::read_to_string(&db).expect("db"), written);

    let found = run_moe([
        "db",
        "find",
        "public:7",
        "--other-repository",
        "internal",
        "--db",
        path_str(&db),
        "--json",
    ]);
    assert_success(&found);
    let payload = parse_json_stdout(&found);
    assert_eq!(
        payload["equivalents"],
        serde_json::json!([{"revId": "42", "repositoryName": "internal"}])
    );
}

#[test]
fn db_find_on_missing_file_is_empty() {
    let tmp = TempDirGuard::new("db-missing");
    let db = tmp.path().join("absent.json");
    let output = run_moe([
        "db",
        "find",
        "internal:1",
        "--other-repository",
        "public",
        "--db",
        path_str(&db),
    ]);
    assert_success(&output);
    assert!(stdout_text(&output).contains("No equivalents of internal{1} in public"));
    assert!(!db.exists());
}

#[test]
fn db_record_rejects_bad_revision() {
    let tmp = TempDirGuard::new("db-bad");
    let output = run_moe([
        "db",
        "record",
        "internal",
        "public:7",
        "--db",
        path_str(&tmp.path().join("db.json")),
    ]);
    assert_failure(&output);
    assert!(stderr_text(&output).contains("expected repository:revId"));
}

#[test]
fn concat_stamps_provenance() {
    let tmp = TempDirGuard::new("concat");
    let input = tmp.path().join("revisions.json");
    fs::write(
        &input,
        r#"[
  {"id": "1", "author": "a@example.com", "date": "2024-01-01T00:00:00Z", "description": "first"},
  {"id": "2", "author": "b@example.com", "date": "2024-03-01T00:00:00Z", "description": "second"}
]"#,
    )
    .expect("input should write");

    let output = run_moe([
        "concat",
        "--input",
        path_str(&input),
        "--migrated-from",
        "internal:2",
        "--json",
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["inputCount"], 2);
    assert_eq!(payload["metadata"]["id"], "1, 2");
    assert_eq!(payload["metadata"]["author"], "a@example.com, b@example.com");
    assert_eq!(payload["metadata"]["date"], "2024-03-01T00:00:00Z");
    assert_eq!(
        payload["metadata"]["description"],
        "first\n-------------\nsecond\n-------------\n\
         Created by MOE: https://github.com/google/moe\nMOE_MIGRATED_REVID=2"
    );
}

#[test]
fn concat_rejects_empty_input() {
    let tmp = TempDirGuard::new("concat-empty");
    let input = tmp.path().join("empty.json");
    fs::write(&input, "[]").expect("input should write");
    let output = run_moe(["concat", "--input", path_str(&input)]);
    assert_failure(&output);
    assert!(stderr_text(&output).starts_with("error: "));
}
