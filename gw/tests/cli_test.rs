//! Binary-level tests for athea-gw

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_help() {
    Command::cargo_bin("athea-gw")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn test_check_config_reports_missing_credential() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("gw.yml");
    std::fs::write(&config, "llm:\n  api-key-env: ATHEA_CLI_TEST_MISSING_KEY\n").unwrap();

    Command::cargo_bin("athea-gw")
        .unwrap()
        .env_remove("ATHEA_CLI_TEST_MISSING_KEY")
        .arg("--config")
        .arg(&config)
        .arg("check-config")
        .assert()
        .failure()
        .stdout(predicate::str::contains("ATHEA_CLI_TEST_MISSING_KEY"));
}

#[test]
fn test_check_config_ok() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("gw.yml");
    std::fs::write(&config, "llm:\n  api-key-env: ATHEA_CLI_TEST_KEY\nserver:\n  bind: 127.0.0.1:4321\n").unwrap();

    Command::cargo_bin("athea-gw")
        .unwrap()
        .env("ATHEA_CLI_TEST_KEY", "k")
        .arg("--config")
        .arg(&config)
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:4321"))
        .stdout(predicate::str::contains("Configuration OK"));
}
