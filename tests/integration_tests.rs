use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_driver_help() {
    let mut cmd = Command::cargo_bin("cachesim_rust").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total data capacity"))
        .stdout(predicate::str::contains("victim buffer"));
}

#[test]
fn test_driver_reads_trace_from_stdin() {
    let mut cmd = Command::cargo_bin("cachesim_rust").unwrap();
    cmd.args(["-c", "4", "-b", "1", "-s", "0", "-v", "0", "-k", "0"]);
    cmd.write_stdin("r 0\nr 2\nr 0\nr 2\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Accesses: 4"))
        .stdout(predicate::str::contains("Read misses: 2"))
        .stdout(predicate::str::contains("Writebacks: 0"));
}

#[test]
fn test_driver_reads_trace_from_file() {
    let dir = tempdir().unwrap();
    let trace_path = dir.path().join("small.trace");
    fs::write(&trace_path, "w 0\nw 0\nr 2\nr 0\n").unwrap();

    let mut cmd = Command::cargo_bin("cachesim_rust").unwrap();
    cmd.args(["-c", "4", "-b", "1", "-s", "0", "-v", "0", "-k", "0"]);
    cmd.arg("-i").arg(&trace_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Writes: 2"))
        .stdout(predicate::str::contains("Write misses: 1"))
        .stdout(predicate::str::contains("Read misses: 1"));
}

#[test]
fn test_driver_skips_malformed_lines() {
    let mut cmd = Command::cargo_bin("cachesim_rust").unwrap();
    cmd.args(["-c", "4", "-b", "1", "-s", "0", "-v", "0", "-k", "0"]);
    cmd.write_stdin("r 0\nx 10\nr zz\nr 2\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Accesses: 2"))
        .stderr(predicate::str::contains("Skipped 2 malformed trace lines"));
}

#[test]
fn test_driver_log_level_flag() {
    let mut cmd = Command::cargo_bin("cachesim_rust").unwrap();
    cmd.args(["--log-level", "debug"]);
    cmd.write_stdin("r 0\n");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Creating cache"));
}

#[test]
fn test_driver_json_output() {
    let mut cmd = Command::cargo_bin("cachesim_rust").unwrap();
    cmd.args(["-c", "5", "-b", "0", "-s", "0", "-v", "0", "-k", "1", "--json"]);
    cmd.write_stdin("r 0\nr 4\nr 8\n");
    let output = cmd.assert().success().get_output().stdout.clone();

    let stats: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(stats["accesses"], 3);
    assert_eq!(stats["misses"], 3);
    assert_eq!(stats["prefetched_blocks"], 1);
}

#[test]
fn test_driver_defaults_match_reference_geometry() {
    // C=15, B=5, S=3, V=4, K=2
    let mut cmd = Command::cargo_bin("cachesim_rust").unwrap();
    cmd.arg("--json");
    cmd.write_stdin("r 0\n");
    let output = cmd.assert().success().get_output().stdout.clone();

    let stats: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(stats["bytes_transferred"], 32, "One combined miss of one 32-byte block");
    assert_eq!(stats["hit_time"], 2.6);
}

#[test]
fn test_sweep_writes_report_file() {
    let dir = tempdir().unwrap();
    let trace_path = dir.path().join("sweep.trace");
    fs::write(&trace_path, "r 0\nr 20\nr 40\nw 0\nr 60\n").unwrap();

    let mut cmd = Command::cargo_bin("cachesim_sweep").unwrap();
    cmd.arg("-i").arg(&trace_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Best AAT:"));

    let report_path = dir.path().join("sweep.trace.out");
    let report = fs::read_to_string(report_path).unwrap();
    assert!(report.contains("Best AAT:"));
}
