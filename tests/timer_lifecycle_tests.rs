use predicates::str::contains;

mod common;
use common::{bti, init_db, setup_test_db, start_timer};

#[test]
fn test_start_then_status_shows_running_timer() {
    let db_path = setup_test_db("start_status");
    init_db(&db_path);

    start_timer(&db_path, "My Book", "1st Edit", "jane");

    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("My Book"))
        .stdout(contains("1st Edit"))
        .stdout(contains("jane"))
        .stdout(contains("running"));
}

#[test]
fn test_stop_writes_exactly_one_ledger_entry() {
    let db_path = setup_test_db("stop_once");
    init_db(&db_path);

    start_timer(&db_path, "My Book", "1st Edit", "jane");

    bti()
        .args([
            "--db", &db_path, "stop", "My Book", "--stage", "1st Edit", "--user", "jane",
        ])
        .assert()
        .success()
        .stdout(contains("Timer stopped"));

    // timer is gone from the active set
    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("No active timers"));

    // a zero-duration stop is still recorded
    bti()
        .args(["--db", &db_path, "entries"])
        .assert()
        .success()
        .stdout(contains("My Book"))
        .stdout(contains("1 entr"));
}

#[test]
fn test_stop_is_idempotent() {
    let db_path = setup_test_db("stop_twice");
    init_db(&db_path);

    start_timer(&db_path, "My Book", "proofing", "jane");

    bti()
        .args([
            "--db", &db_path, "stop", "My Book", "--stage", "proofing", "--user", "jane",
        ])
        .assert()
        .success();

    // second stop: silent no-op, no duplicate entry
    bti()
        .args([
            "--db", &db_path, "stop", "My Book", "--stage", "proofing", "--user", "jane",
        ])
        .assert()
        .success()
        .stdout(contains("No timer running"));

    bti()
        .args(["--db", &db_path, "entries"])
        .assert()
        .success()
        .stdout(contains("1 entr"));
}

#[test]
fn test_pause_and_resume_cycle() {
    let db_path = setup_test_db("pause_resume");
    init_db(&db_path);

    start_timer(&db_path, "My Book", "design", "lars");

    bti()
        .args([
            "--db", &db_path, "pause", "My Book", "--stage", "design", "--user", "lars",
        ])
        .assert()
        .success()
        .stdout(contains("Timer paused"));

    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("paused"));

    // pausing again is a no-op
    bti()
        .args([
            "--db", &db_path, "pause", "My Book", "--stage", "design", "--user", "lars",
        ])
        .assert()
        .success()
        .stdout(contains("already paused"));

    bti()
        .args([
            "--db", &db_path, "resume", "My Book", "--stage", "design", "--user", "lars",
        ])
        .assert()
        .success()
        .stdout(contains("Timer resumed"));

    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("running"));
}

#[test]
fn test_pause_without_timer_fails() {
    let db_path = setup_test_db("pause_absent");
    init_db(&db_path);

    bti()
        .args([
            "--db", &db_path, "pause", "Ghost Book", "--stage", "design",
        ])
        .assert()
        .failure()
        .stderr(contains("No timer running"));
}

#[test]
fn test_start_twice_restarts_the_timer() {
    let db_path = setup_test_db("start_twice");
    init_db(&db_path);

    start_timer(&db_path, "My Book", "1st Edit", "jane");

    bti()
        .args([
            "--db", &db_path, "start", "My Book", "--stage", "1st Edit", "--user", "jane",
        ])
        .assert()
        .success()
        .stdout(contains("restarted"));
}

#[test]
fn test_delimited_key_form_is_right_anchored() {
    let db_path = setup_test_db("key_form");
    init_db(&db_path);

    // task names may contain the separator: vol_2 / design / jane
    bti()
        .args(["--db", &db_path, "start", "--key", "vol_2_design_jane"])
        .assert()
        .success();

    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("vol_2"))
        .stdout(contains("design"))
        .stdout(contains("jane"));

    bti()
        .args(["--db", &db_path, "stop", "--key", "vol_2_design_jane"])
        .assert()
        .success()
        .stdout(contains("Timer stopped"));
}

#[test]
fn test_timer_survives_across_invocations() {
    // each CLI call is a separate process; the store carries the timer over
    let db_path = setup_test_db("rehydrate");
    init_db(&db_path);

    start_timer(&db_path, "My Book", "proofing", "unassigned");

    bti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("My Book"))
        .stdout(contains("running"));
}

#[test]
fn test_missing_stage_is_reported() {
    let db_path = setup_test_db("missing_stage");
    init_db(&db_path);

    bti()
        .args(["--db", &db_path, "start", "My Book"])
        .assert()
        .failure()
        .stderr(contains("missing --stage"));
}

#[test]
fn test_transitions_land_in_the_operation_log() {
    let db_path = setup_test_db("oplog");
    init_db(&db_path);

    start_timer(&db_path, "My Book", "1st Edit", "jane");
    bti()
        .args([
            "--db", &db_path, "stop", "My Book", "--stage", "1st Edit", "--user", "jane",
        ])
        .assert()
        .success();

    bti()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("start"))
        .stdout(contains("stop"));
}
