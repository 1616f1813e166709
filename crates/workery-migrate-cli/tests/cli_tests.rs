//! CLI integration tests for workery-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for configuration errors.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the workery-migrate binary with a clean environment.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("workery-migrate").unwrap();
    cmd.env_clear();
    cmd
}

/// Every variable the legacy and document store connections need.
fn with_required_env(cmd: &mut Command) -> &mut Command {
    cmd.env("WORKERY_MIGRATE_POSTGRES_HOST", "localhost")
        .env("WORKERY_MIGRATE_POSTGRES_PORT", "5432")
        .env("WORKERY_MIGRATE_POSTGRES_DATABASE_NAME", "workery")
        .env("WORKERY_MIGRATE_POSTGRES_USER", "workery")
        .env("WORKERY_MIGRATE_POSTGRES_PASSWORD", "secret")
        .env("WORKERY_MIGRATE_POSTGRES_PUBLIC_SCHEMA_NAME", "public")
        .env("WORKERY_MIGRATE_POSTGRES_LONDON_SCHEMA_NAME", "london")
        .env("WORKERY_MIGRATE_MONGODB_URI", "mongodb://localhost:27017")
        .env("WORKERY_MIGRATE_MONGODB_DATABASE_NAME", "workery")
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_snake_case_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import_tenant"))
        .stdout(predicate::str::contains("import_associate_insurance_requirement"))
        .stdout(predicate::str::contains("import_attachment_download_to_tmp_dir"))
        .stdout(predicate::str::contains("hotfix05"))
        .stdout(predicate::str::contains("change_password"));
}

#[test]
fn test_help_shows_global_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("--verbosity"));
}

#[test]
fn test_change_password_help() {
    cmd()
        .args(["change_password", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--email"))
        .stdout(predicate::str::contains("--password"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("workery-migrate"));
}

// =============================================================================
// Argument Errors
// =============================================================================

#[test]
fn test_unknown_subcommand() {
    cmd().arg("import_everything").assert().failure();
}

#[test]
fn test_kebab_case_is_rejected() {
    cmd().arg("import-tenant").assert().failure();
}

#[test]
fn test_change_password_without_email() {
    cmd()
        .args(["change_password", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

// =============================================================================
// Configuration Errors
// =============================================================================

#[test]
fn test_missing_env_exits_with_config_code() {
    cmd()
        .arg("import_tenant")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("WORKERY_MIGRATE_POSTGRES"));
}

#[test]
fn test_missing_mongodb_uri_is_named() {
    with_required_env(&mut cmd())
        .env_remove("WORKERY_MIGRATE_MONGODB_URI")
        .arg("hotfix02")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("WORKERY_MIGRATE_MONGODB_URI"));
}

#[test]
fn test_invalid_port_exits_with_config_code() {
    with_required_env(&mut cmd())
        .env("WORKERY_MIGRATE_POSTGRES_PORT", "not-a-port")
        .arg("import_customer")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("POSTGRES_PORT"));
}

#[test]
fn test_password_not_echoed_on_error() {
    with_required_env(&mut cmd())
        .env("WORKERY_MIGRATE_POSTGRES_PORT", "99999")
        .arg("import_tenant")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("secret").not());
}
