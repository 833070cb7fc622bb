// Drives the compiled binary in its headless modes; no TTY needed.

use assert_cmd::Command;
use chrono::Local;

use lockin::preset::Preset;
use lockin::session::NewSession;
use lockin::store::{SessionStore, SqliteStore};

fn lockin(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("lockin").unwrap();
    cmd.env("HOME", home).env("RUST_LOG", "warn");
    cmd
}

fn seed(db: &std::path::Path) {
    let store = SqliteStore::open(db).unwrap();
    store
        .write_session(&NewSession {
            date: Local::now().date_naive(),
            kind: Preset::LockIn,
            duration: 1500,
            completed: true,
            overtime: 660,
            is_partial_completion: false,
        })
        .unwrap();
}

#[test]
fn stats_prints_period_summary() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("lockin.db");
    seed(&db);

    let output = lockin(dir.path())
        .args(["--db", db.to_str().unwrap(), "--config"])
        .arg(dir.path().join("config.json"))
        .args(["--stats", "last-week"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Last Week ("));
    assert!(stdout.contains("Total: 36m"));
    assert!(stdout.contains("Overtime: 11m (31%)"));
    assert!(stdout.contains("Active days: 1"));
}

#[test]
fn export_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("lockin.db");
    let csv = dir.path().join("sessions.csv");
    seed(&db);

    lockin(dir.path())
        .args(["--db", db.to_str().unwrap(), "--export", csv.to_str().unwrap()])
        .assert()
        .success();

    let text = std::fs::read_to_string(&csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,date,type,duration,completed,overtime,isPartialCompletion,timestamp")
    );
    assert!(lines.next().unwrap().contains(",Lock In,1500,true,660,false,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn unknown_period_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    lockin(dir.path())
        .args(["--stats", "fortnight"])
        .assert()
        .failure();
}

#[test]
fn tui_requires_a_tty() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("lockin.db");
    lockin(dir.path())
        .args(["--db", db.to_str().unwrap()])
        .write_stdin("")
        .assert()
        .failure();
}
