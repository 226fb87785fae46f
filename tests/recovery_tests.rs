use predicates::str::contains;
use std::fs;

mod common;
use common::bti;

fn spill_path(db_path: &str) -> String {
    format!("{}.pending.json", db_path)
}

#[test]
fn test_unreachable_store_is_a_connectivity_error() {
    // a database path inside a directory that does not exist cannot be opened
    let db_path = "/nonexistent-booktimer-dir/store.sqlite";

    bti()
        .args([
            "--db", db_path, "start", "My Book", "--stage", "1st Edit",
        ])
        .assert()
        .failure()
        .stderr(contains("unreachable"));
}

#[test]
fn test_recover_with_empty_buffer_is_a_noop() {
    let db_path = common::setup_test_db("recover_empty");
    common::init_db(&db_path);

    bti()
        .args(["--db", &db_path, "recover"])
        .assert()
        .success()
        .stdout(contains("Nothing to recover"));
}

#[test]
fn test_corrupt_spill_file_is_set_aside_not_deleted() {
    let db_path = common::setup_test_db("corrupt_spill");
    common::init_db(&db_path);

    let sidecar = spill_path(&db_path);
    let kept = format!("{}.corrupt", sidecar);
    fs::remove_file(&kept).ok();
    fs::write(&sidecar, "{ not valid json !!").unwrap();

    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stderr(contains("cannot read recovery file"));

    // The unreadable file must survive the end-of-command spill under a
    // `.corrupt` name, not be deleted along with the empty buffer.
    assert!(!std::path::Path::new(&sidecar).exists());
    assert_eq!(fs::read_to_string(&kept).unwrap(), "{ not valid json !!");

    fs::remove_file(&kept).ok();
}

#[test]
fn test_buffered_entries_stay_with_their_database() {
    let db_a = common::setup_test_db("spill_home");
    let db_b = common::setup_test_db("spill_other");
    common::init_db(&db_a);
    common::init_db(&db_b);

    let sidecar = spill_path(&db_a);
    fs::write(
        &sidecar,
        r#"[{
            "key": {"task": "My Book", "stage": "1st Edit", "user": "anna"},
            "elapsed_seconds": 90,
            "session_start": "2026-08-29T10:00:00Z",
            "source": "timer",
            "meta": "",
            "created_at": "2026-08-29T10:01:30Z"
        }]"#,
    )
    .unwrap();

    // A run against another database must not pick up this spill.
    bti()
        .args(["--db", &db_b, "recover"])
        .assert()
        .success()
        .stdout(contains("Nothing to recover"));
    assert!(std::path::Path::new(&sidecar).exists());

    bti()
        .args(["--db", &db_a, "recover"])
        .assert()
        .success()
        .stdout(contains("Recovered 1 of 1"));
    assert!(!std::path::Path::new(&sidecar).exists());

    bti()
        .args(["--db", &db_a, "entries"])
        .assert()
        .success()
        .stdout(contains("My Book"));
    bti()
        .args(["--db", &db_b, "entries"])
        .assert()
        .success()
        .stdout(contains("No time entries match"));
}

#[test]
fn test_status_with_no_timers() {
    let db_path = common::setup_test_db("status_empty");
    common::init_db(&db_path);

    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("No active timers"));
}
