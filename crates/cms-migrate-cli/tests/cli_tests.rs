//! CLI integration tests for cms-migrate.
//!
//! These tests verify command-line argument parsing, defaults, exit codes,
//! and the dry-run-by-default contract. They run in a scratch directory so
//! no config file is picked up and the source stays inert.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the cms-migrate binary in a scratch directory.
fn cmd(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cms-migrate").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn test_migrate_subcommand_help() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["migrate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--logs"))
        .stdout(predicate::str::contains("--offset"))
        .stdout(predicate::str::contains("--batch"))
        .stdout(predicate::str::contains("--log-file"));
}

#[test]
fn test_migrate_defaults_documented() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["migrate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: true]"))
        .stdout(predicate::str::contains("[default: 200]"))
        .stdout(predicate::str::contains("[default: 0]"));
}

#[test]
fn test_cleanup_subcommand_help() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["cleanup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--log-file"));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cms-migrate"));
}

// =============================================================================
// Argument validation
// =============================================================================

#[test]
fn test_zero_batch_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["migrate", "article", "--batch", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("batch"));
}

#[test]
fn test_unknown_entity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["migrate", "widgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// =============================================================================
// Execution against the inert source
// =============================================================================

#[test]
fn test_migrate_defaults_to_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["migrate", "article"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run completed!"));
}

#[test]
fn test_migrate_live_mode_with_inert_source() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["migrate", "user", "--dry-run=false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration completed!"))
        .stdout(predicate::str::contains("Found: 0"));
}

#[test]
fn test_migrate_output_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["--output-json", "migrate", "category"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"found\""))
        .stdout(predicate::str::contains("\"next_offset\""));
}

#[test]
fn test_migrate_writes_log_file() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["migrate", "article", "--log-file", "run.log"])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("run.log")).unwrap();
    assert!(content.contains("Starting migration of articles..."));
    assert!(content.contains("Dry-Run Result"));
}

// =============================================================================
// Cleanup confirmation
// =============================================================================

#[test]
fn test_cleanup_without_confirmation_deletes_nothing() {
    // EOF on stdin means every prompt is refused.
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .arg("cleanup")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Are you sure"));
}

#[test]
fn test_cleanup_reports_elapsed_time_in_log_file() {
    let dir = tempfile::tempdir().unwrap();
    cmd(&dir)
        .args(["cleanup", "--log-file", "cleanup.log"])
        .write_stdin("n\nn\nn\nn\nn\nn\n")
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("cleanup.log")).unwrap();
    assert!(content.contains("Warning: You have called cleanup command in dry run mode."));
    assert!(content.contains("meta delete ignored"));
    assert!(content.contains("Total time taken by this cleanup script"));
}
