//! End-to-end tests for the `microtest` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the microtest binary, with colours off.
#[allow(deprecated)]
fn microtest_cmd() -> Command {
    let mut cmd = Command::cargo_bin("microtest").unwrap();
    cmd.arg("--no-color");
    cmd
}

// =============================================================================
// Exit status
// =============================================================================

mod exit_status {
    use super::*;

    #[test]
    fn passing_suite_exits_zero() {
        microtest_cmd()
            .assert()
            .success()
            .stdout(predicate::str::contains("test result: ok."))
            .stdout(predicate::str::contains("Test failed").not());
    }

    #[test]
    fn failing_fixture_exits_one() {
        microtest_cmd()
            .arg("--include-failing")
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                "Test failed: 'fails_int': Values not equal. Expected [1], Actual [2]\r\n",
            ))
            .stdout(predicate::str::contains("'fails_int': comparing 1 and 2\r\n"))
            .stdout(predicate::str::contains(
                "Test failed: 'fails_explicitly': Test failed\r\n",
            ))
            .stdout(predicate::str::contains("test result: FAILED."));
    }

    #[test]
    fn zero_capacity_is_a_config_error() {
        microtest_cmd()
            .args(["--message-capacity", "0"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("message capacity must be at least 1 byte"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        microtest_cmd()
            .args(["--format", "xml"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Filters and options
// =============================================================================

mod options {
    use super::*;

    #[test]
    fn test_filter_selects_single_failure() {
        microtest_cmd()
            .args(["--include-failing", "--test", "fails_string"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("'fails_string':"))
            .stdout(predicate::str::contains("'fails_int'").not())
            .stdout(predicate::str::contains("2 run; 0 passed; 2 failed; 1 fixtures"));
    }

    #[test]
    fn fixture_filter_skips_failing_fixture() {
        microtest_cmd()
            .args(["--include-failing", "--fixture", "strings"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 fixtures"));
    }

    #[test]
    fn message_capacity_truncates() {
        microtest_cmd()
            .args([
                "--include-failing",
                "--test",
                "fails_int",
                "--message-capacity",
                "10",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Test failed: 'fails_int': Values not\r\n"));
    }

    #[test]
    fn json_format_emits_objects() {
        let output = microtest_cmd()
            .args(["--format", "json", "--fixture", "integers"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let events: Vec<serde_json::Value> = stdout
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|event| event["fixture"] == "integers"));
        assert!(events.iter().all(|event| event["result"] == "success"));

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("test result: ok."));
    }

    #[test]
    fn report_file_is_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");

        microtest_cmd()
            .arg("--include-failing")
            .arg("--report")
            .arg(&path)
            .assert()
            .code(1);

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let fixtures = summary["fixtures"].as_array().unwrap();
        assert_eq!(fixtures.len(), 6);
        assert_eq!(fixtures[5]["name"], "failing");
        assert_eq!(fixtures[5]["verdict"], "failed");
        assert_eq!(summary["totals"]["failed"], 8);
    }

    #[test]
    fn missing_report_dir_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("summary.json");

        microtest_cmd()
            .arg("--report")
            .arg(&path)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("report directory not found"));
    }
}
