#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn bti() -> Command {
    cargo_bin_cmd!("booktimer")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_booktimer.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    fs::remove_file(format!("{}.pending.json", db_path)).ok();
    db_path
}

/// Initialize the schema in a fresh test DB
pub fn init_db(db_path: &str) {
    bti()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Start a timer for the default test key
pub fn start_timer(db_path: &str, task: &str, stage: &str, user: &str) {
    bti()
        .args([
            "--db", db_path, "start", task, "--stage", stage, "--user", user,
        ])
        .assert()
        .success();
}
