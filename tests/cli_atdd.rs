use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Workspace {
    home: TempDir,
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            home: TempDir::new().expect("home dir should be created"),
            root: TempDir::new().expect("workspace dir should be created"),
        };
        ws.cmd()
            .args(["init", "--name", "acme"])
            .assert()
            .code(0)
            .stdout(predicate::str::contains("create: hvi.toml"))
            .stdout(predicate::str::contains("12 question(s) seeded"));
        ws
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hvi").expect("binary should compile");
        cmd.env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .arg("--root")
            .arg(self.root.path());
        cmd
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Runs a command and returns the whitespace-separated token at `index`.
    fn token(&self, args: &[&str], index: usize) -> String {
        let output = self.cmd().args(args).output().expect("command should run");
        assert!(output.status.success(), "{args:?} failed: {output:?}");
        String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .nth(index)
            .expect("token printed")
            .to_string()
    }

    /// `created <noun> <id>`
    fn created_id(&self, args: &[&str]) -> String {
        self.token(args, 2)
    }

    /// `submitted <id> ...` or `draft <id>`
    fn submitted_id(&self, args: &[&str]) -> String {
        self.token(args, 1)
    }

    fn write_submission(&self, name: &str, kind: &str, id: &str, answers: Value) -> String {
        let path = self.path().join(name);
        let body = json!({"subject": {"kind": kind, "id": id}, "answers": answers});
        fs::write(&path, body.to_string()).expect("submission should be written");
        path.display().to_string()
    }
}

/// Event names from the JSON-lines activity journal, oldest first.
fn journal_events(ws: &Workspace) -> Vec<String> {
    let raw = fs::read_to_string(ws.path().join(".hvi/activity.jsonl")).unwrap_or_default();
    raw.lines()
        .map(|line| {
            let entry: Value = serde_json::from_str(line).expect("journal line is json");
            entry["event"].as_str().expect("event").to_string()
        })
        .collect()
}

/// Best possible answer to every seeded capability question.
fn strong_answers() -> Value {
    json!([
        {"question_id": "d1.q1", "value": 5}, {"question_id": "d1.q2", "value": 1},
        {"question_id": "d1.q3", "value": 5}, {"question_id": "d2.q1", "value": 5},
        {"question_id": "d2.q2", "value": 100}, {"question_id": "d2.q3", "value": 1},
        {"question_id": "d3.q1", "value": 5}, {"question_id": "d3.q2", "value": 5},
        {"question_id": "d3.q3", "value": 1}, {"question_id": "d4.q1", "value": 100},
        {"question_id": "d4.q2", "value": 5}, {"question_id": "d4.q3", "value": 1}
    ])
}

/// Worst possible answer to every seeded capability question.
fn weak_answers() -> Value {
    json!([
        {"question_id": "d1.q1", "value": 1}, {"question_id": "d1.q2", "value": 0},
        {"question_id": "d1.q3", "value": 1}, {"question_id": "d2.q1", "value": 1},
        {"question_id": "d2.q2", "value": 0}, {"question_id": "d2.q3", "value": 5},
        {"question_id": "d3.q1", "value": 1}, {"question_id": "d3.q2", "value": 1},
        {"question_id": "d3.q3", "value": 0}, {"question_id": "d4.q1", "value": 0},
        {"question_id": "d4.q2", "value": 1}, {"question_id": "d4.q3", "value": 5}
    ])
}

#[test]
fn init_dry_run_writes_nothing() {
    let home = TempDir::new().expect("home dir should be created");
    let root = TempDir::new().expect("workspace dir should be created");
    Command::cargo_bin("hvi")
        .expect("binary should compile")
        .env("HOME", home.path())
        .arg("--root")
        .arg(root.path())
        .args(["init", "--dry-run"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("dry run: no files were written"));
    assert!(!root.path().join("hvi.toml").exists());
}

#[test]
fn fresh_workspace_lints_clean() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("lint")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("lint: no findings"));
}

#[test]
fn lint_blocks_when_a_dimension_has_no_active_questions() {
    let ws = Workspace::new();
    for id in ["d1.q1", "d1.q2", "d1.q3"] {
        ws.cmd().args(["question", "deactivate", id]).assert().code(0);
    }
    ws.cmd()
        .arg("lint")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[BLOCKING] questions.missing_dimension"));
}

#[test]
fn strong_submission_scores_advanced_and_reports_cleanly() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Acme Bank", "--sector", "finance"]);
    let file = ws.write_submission("strong.json", "organization", &org, strong_answers());

    let id = ws.submitted_id(&["assess", "submit", &file]);
    ws.cmd()
        .args(["assess", "list", "--org", &org])
        .assert()
        .code(0)
        .stdout(predicate::str::contains(&id))
        .stdout(predicate::str::contains("hvi=0.00"));

    ws.cmd()
        .args(["report", &id])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Advanced"));

    let output = ws
        .cmd()
        .args(["report", &id, "--format", "json"])
        .output()
        .expect("report should run");
    let report: Value = serde_json::from_slice(&output.stdout).expect("report is json");
    assert_eq!(report["score"]["maturity_score"], 100.0);
    assert_eq!(report["score"]["risk_level"], "Low");
    assert_eq!(report["recommendations"].as_array().map(Vec::len), Some(0));

    ws.cmd()
        .args(["report", &id, "--format", "csv"])
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with(
            "assessment_id,subject,submitted_at,dimension,name,score,level,answered,total",
        ));

    ws.cmd()
        .args(["recommend", &id])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("recommend: no recommendations"));
}

#[test]
fn critical_risk_blocks_report_and_yields_recommendations() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Fragile Ltd", "--sector", "retail"]);
    let file = ws.write_submission("weak.json", "organization", &org, weak_answers());
    let id = ws.submitted_id(&["assess", "submit", &file]);

    ws.cmd()
        .args(["report", &id])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("- [blocking]"));

    let output = ws
        .cmd()
        .args(["recommend", &id, "--format", "json"])
        .output()
        .expect("recommend should run");
    let recommendations: Value =
        serde_json::from_slice(&output.stdout).expect("recommendations are json");
    let items = recommendations.as_array().expect("array");
    assert_eq!(items.len(), 4);
    assert!(items
        .iter()
        .all(|item| item["id"].as_str().unwrap_or_default().ends_with(".foundation")));
}

#[test]
fn duplicate_submission_is_rejected() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Acme"]);
    let file = ws.write_submission("a.json", "organization", &org, strong_answers());
    ws.cmd().args(["assess", "submit", &file]).assert().code(0);
    ws.cmd()
        .args(["assess", "submit", &file])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("duplicate submission"));
}

#[test]
fn submission_for_unknown_subject_fails() {
    let ws = Workspace::new();
    let file = ws.write_submission("ghost.json", "user", "ghost", strong_answers());
    ws.cmd()
        .args(["assess", "submit", &file])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("user not found: ghost"));
}

#[test]
fn draft_is_unscored_until_finalized() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Acme"]);
    let file = ws.write_submission("draft.json", "organization", &org, strong_answers());
    let id = ws.submitted_id(&["assess", "submit", &file, "--draft"]);

    ws.cmd()
        .args(["report", &id])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("finalize"));

    ws.cmd()
        .args(["assess", "finalize", &id])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("finalized"));
    ws.cmd().args(["report", &id]).assert().code(0);
}

#[test]
fn import_skips_duplicates_and_trend_tracks_history() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Acme", "--sector", "finance"]);

    let inbox = ws.path().join("inbox");
    fs::create_dir_all(&inbox).expect("inbox");
    let early = json!({
        "subject": {"kind": "organization", "id": org},
        "answers": weak_answers(),
        "submitted_at": "2026-01-15T09:00:00Z"
    });
    let later = json!({
        "subject": {"kind": "organization", "id": org},
        "answers": strong_answers(),
        "submitted_at": "2026-06-15T09:00:00Z"
    });
    fs::write(inbox.join("1-early.json"), early.to_string()).expect("write");
    fs::write(inbox.join("2-later.json"), later.to_string()).expect("write");
    fs::write(inbox.join("3-again.json"), later.to_string()).expect("write");

    ws.cmd()
        .arg("import")
        .arg(&inbox)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("import: 2 imported, 1 skipped"));
    assert_eq!(
        journal_events(&ws),
        vec!["assessment.submitted", "assessment.submitted"]
    );

    let output = ws
        .cmd()
        .args(["trend", "--org", &org, "--format", "json"])
        .output()
        .expect("trend should run");
    let trend: Value = serde_json::from_slice(&output.stdout).expect("trend is json");
    assert_eq!(trend["points"].as_array().map(Vec::len), Some(2));
    assert_eq!(trend["direction"], "improving");
    assert_eq!(trend["overall_delta"], 100.0);
}

#[test]
fn compare_without_peers_warns() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Lonely", "--sector", "mining"]);
    let file = ws.write_submission("a.json", "organization", &org, strong_answers());
    let id = ws.submitted_id(&["assess", "submit", &file]);
    ws.cmd().args(["compare", &id]).assert().code(1);
}

#[test]
fn organization_with_users_cannot_be_removed() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Acme"]);
    let user = ws.created_id(&[
        "user", "add", "--name", "Pat", "--email", "pat@example.com", "--org", &org,
    ]);

    ws.cmd()
        .args(["org", "remove", &org])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("conflict"));

    ws.cmd().args(["user", "remove", &user]).assert().code(0);
    ws.cmd().args(["org", "remove", &org]).assert().code(0);

    let events = journal_events(&ws);
    assert_eq!(events, vec!["user.removed", "organization.removed"]);
}

#[test]
fn export_writes_bundle_with_checksum() {
    let ws = Workspace::new();
    ws.created_id(&["org", "add", "Acme"]);
    let output = ws.cmd().arg("export").output().expect("export should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let path = stdout
        .trim()
        .strip_prefix("export: ")
        .expect("export path printed")
        .to_string();
    let bundle: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("bundle")).expect("bundle is json");
    assert_eq!(bundle["workspace"], "acme");
    assert_eq!(bundle["organizations"].as_array().map(Vec::len), Some(1));
    assert!(Path::new(&path).with_extension("json.sha256").exists());
    assert_eq!(journal_events(&ws), vec!["store.exported"]);
}

#[test]
fn rescore_keeps_completion_for_deactivated_questions() {
    let ws = Workspace::new();
    let org = ws.created_id(&["org", "add", "Acme", "--sector", "finance"]);
    ws.cmd().args(["question", "deactivate", "d1.q3"]).assert().code(0);
    let answers = strong_answers()
        .as_array()
        .expect("array")
        .iter()
        .filter(|answer| answer["question_id"] != "d1.q3")
        .cloned()
        .collect::<Vec<_>>();
    let file = ws.write_submission("a.json", "organization", &org, Value::Array(answers));
    let id = ws.submitted_id(&["assess", "submit", &file]);
    ws.cmd().args(["report", &id]).assert().code(0);

    ws.cmd()
        .args(["assess", "rescore"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("rescored 1 assessment(s)"));
    let output = ws
        .cmd()
        .args(["report", &id, "--format", "json"])
        .output()
        .expect("report should run");
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("report is json");
    assert_eq!(report["score"]["dimensions"][0]["completion"], 1.0);
    assert_eq!(report["findings"].as_array().map(Vec::len), Some(0));
}

#[test]
fn csv_report_quotes_custom_dimension_names() {
    let ws = Workspace::new();
    let config = fs::read_to_string(ws.path().join("hvi.toml")).expect("config");
    let config = config.replacen(
        "[workspace]",
        "[workspace]\ndimension_names = [\"Lead, Govern\", \"Tech\", \"Process\", \"People\"]",
        1,
    );
    fs::write(ws.path().join("hvi.toml"), config).expect("config written");
    let org = ws.created_id(&["org", "add", "Acme", "--sector", "finance"]);
    let file = ws.write_submission("a.json", "organization", &org, strong_answers());
    let id = ws.submitted_id(&["assess", "submit", &file]);

    ws.cmd()
        .args(["report", &id, "--format", "csv"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains(",d1,\"Lead, Govern\",100.00,"));
}
