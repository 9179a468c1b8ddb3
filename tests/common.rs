#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn crm() -> Command {
    let mut cmd = cargo_bin_cmd!("sheetcrm");
    cmd.env_remove("SHEETCRM_LOG");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_sheetcrm.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Provision a fresh store without touching the user's config file.
pub fn init_db(db_path: &str) {
    crm()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

pub fn upsert(db_path: &str, table: &str, name: &str, phone: &str, fields: &[&str]) -> Command {
    let mut cmd = crm();
    cmd.args([
        "--db", db_path, "upsert", "--table", table, "--name", name, "--phone", phone,
    ]);
    for f in fields {
        cmd.args(["--field", *f]);
    }
    cmd
}

/// Initialize a store and add a small dataset useful for many tests
pub fn init_db_with_data(db_path: &str) {
    init_db(db_path);
    upsert(db_path, "CRM", "John Doe", "+91 98765 43210", &["Lead Status=new lead"])
        .assert()
        .success();
    upsert(db_path, "CRM", "Jane Roe", "9123456780", &["Lead Status=Follow Up"])
        .assert()
        .success();
}
