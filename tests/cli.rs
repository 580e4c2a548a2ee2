use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A throwaway HOME so settings never touch the real config dir.
struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.home.path().join("hr-data")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hrdesk").unwrap();
        cmd.env("HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("HRDESK_LOG");
        cmd
    }

    fn init(&self) {
        self.cmd()
            .args(["init", "--data-dir"])
            .arg(self.data_dir())
            .assert()
            .success();
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

const STAFF: &str = r#"[
    {"name": "Ana", "department": "Sales", "age": 34},
    {"name": "Ben", "department": "HR", "age": 41},
    {"name": "Cy", "department": "Sales", "age": 28}
]"#;

fn position(haystack: &str, needle: &str) -> usize {
    haystack.find(needle).unwrap_or(usize::MAX)
}

#[test]
fn help_lists_commands() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("table"))
        .stdout(predicate::str::contains("fines"))
        .stdout(predicate::str::contains("remarks"));
}

#[test]
fn init_creates_data_file() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["init", "--data-dir"])
        .arg(sandbox.data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized hrdesk at"));

    assert!(sandbox.data_dir().join("hrdesk.json").exists());
    assert!(sandbox
        .home
        .path()
        .join(".config/hrdesk/settings.json")
        .exists());

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fines:            0"));
}

#[test]
fn table_filters_sorts_and_pages() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("staff.json", STAFF);

    sandbox
        .cmd()
        .arg("table")
        .arg(&file)
        .args(["--filter", "department=Sales", "--sort", "name", "--desc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ben").not())
        .stdout(predicate::function(|out: &str| {
            position(out, "Cy") < position(out, "Ana")
        }))
        .stdout(predicate::str::contains("Page 1 of 1 | 2 of 3 records"));

    sandbox
        .cmd()
        .arg("table")
        .arg(&file)
        .args(["--sort", "age", "--page-size", "1", "--page", "2", "--columns", "name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana"))
        .stdout(predicate::str::contains("Cy").not())
        .stdout(predicate::str::contains("Page 2 of 3 | 3 of 3 records"));
}

#[test]
fn table_search_reads_csv() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("staff.csv", "name,department\nAna,Sales\nBen,HR\n");

    sandbox
        .cmd()
        .arg("table")
        .arg(&file)
        .args(["--search", "hr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ben"))
        .stdout(predicate::str::contains("1 of 2 records"));
}

#[test]
fn table_rejects_unknown_format() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("staff.txt", "name\nAna\n");

    sandbox
        .cmd()
        .arg("table")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: could not show"))
        .stderr(predicate::str::contains("Unknown format"));
}

fn add_fine(sandbox: &Sandbox, employee: &str, amount: &str, date: &str) {
    sandbox
        .cmd()
        .args([
            "fines", "add", "--employee-id", employee, "--name", "Ana Diaz", "--department",
            "Sales", "--amount", amount, "--reason", "Late arrival", "--date", date,
        ])
        .assert()
        .success();
}

#[test]
fn fines_workflow_and_summary() {
    let sandbox = Sandbox::new();
    sandbox.init();

    add_fine(&sandbox, "E1", "50", "2024-01-05");
    add_fine(&sandbox, "E1", "30", "2024-01-09");

    sandbox
        .cmd()
        .args(["fines", "approve", "1", "--comment", "Third time"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approved"));

    // Still pending: payroll cannot take it.
    sandbox
        .cmd()
        .args(["fines", "deduct", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot deduct #2: status is pending"));

    sandbox
        .cmd()
        .args(["fines", "approve", "99"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No fine #99."));

    sandbox
        .cmd()
        .args(["fines", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("E1"))
        .stdout(predicate::str::contains("$50.00"));

    sandbox
        .cmd()
        .args(["fines", "list", "--status", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$30.00"))
        .stdout(predicate::str::contains("$50.00").not());

    sandbox
        .cmd()
        .args(["fines", "history", "E1"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            position(out, "2024-01-09") < position(out, "2024-01-05")
        }));
}

#[test]
fn remarks_acknowledge_once() {
    let sandbox = Sandbox::new();
    sandbox.init();

    sandbox
        .cmd()
        .args([
            "remarks", "add", "--employee-id", "E2", "--name", "Ben Ko", "--type", "positive",
            "--content", "Great demo", "--date", "2024-03-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("remark #1"));

    sandbox
        .cmd()
        .args(["remarks", "ack", "1", "--comment", "Thank you"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["remarks", "ack", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot acknowledge #1"));

    sandbox
        .cmd()
        .args(["remarks", "list", "--unacknowledged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No remarks found."));

    sandbox
        .cmd()
        .args(["remarks", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("positive: 1"));
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn demo_is_idempotent() {
    let sandbox = Sandbox::new();
    sandbox.init();

    sandbox
        .cmd()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data loaded!"));
    assert!(sandbox.data_dir().join("employees.json").exists());
    assert!(sandbox.data_dir().join("attendance.json").exists());
    let fines = read_json(&sandbox.data_dir().join("hrdesk.json"))["fines"]
        .as_array()
        .map(|a| a.len());

    sandbox
        .cmd()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("already loaded"));
    let again = read_json(&sandbox.data_dir().join("hrdesk.json"))["fines"]
        .as_array()
        .map(|a| a.len());
    assert_eq!(fines, again);

    sandbox
        .cmd()
        .arg("table")
        .arg(sandbox.data_dir().join("employees.json"))
        .args(["--filter", "department=Engineering", "--columns", "id,name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 of 12 records"));
}
