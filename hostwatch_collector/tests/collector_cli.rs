//! Binary-level checks for the collector entry point.

use assert_cmd::Command;

// A cycle that cannot reach the database must exit non-zero and must still
// have set up file logging from LOG_FILE.
#[test]
fn unreachable_db_fails_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("collector.log");

    let mut cmd = Command::cargo_bin("hostwatch_collector").unwrap();
    cmd.env("DB_HOST", "127.0.0.1")
        .env("DB_PORT", "1") // nothing listens here
        .env("LOG_FILE", log.to_str().unwrap())
        .env("LOG_LEVEL", "info");

    cmd.assert().failure();
    assert!(log.exists(), "log file should be created at startup");
}
