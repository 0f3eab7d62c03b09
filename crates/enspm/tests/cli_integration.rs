//! CLI integration tests for the enspm command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Config and session commands work against a temporary config directory
//!
//! Note: These tests do not require a running server. Commands that would
//! talk to one point at a closed loopback port.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the enspm binary, isolated in its own config dir.
fn enspm(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("enspm").unwrap();
    cmd.env("ENSPM_CONFIG_DIR", config_dir.path())
        .env_remove("ENSPM_SERVER_URL")
        .env_remove("ENSPM_PASSWORD");
    cmd
}

fn config_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = config_dir();
    enspm(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ENSPM Hub"));
}

#[test]
fn test_version_displays() {
    let dir = config_dir();
    enspm(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("enspm"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = config_dir();
    enspm(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("users"))
        .stdout(predicate::str::contains("orgs"))
        .stdout(predicate::str::contains("opportunities"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_auth_help_lists_actions() {
    let dir = config_dir();
    enspm(&dir)
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("recover"));
}

#[test]
fn test_global_flags_accepted() {
    let dir = config_dir();
    enspm(&dir)
        .args(["--verbose", "--json", "--server", "http://localhost:9999", "--help"])
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────────────────
// Invalid Input Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_fails() {
    let dir = config_dir();
    enspm(&dir)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_unknown_board_fails() {
    let dir = config_dir();
    enspm(&dir)
        .args(["opportunities", "list", "--kind", "apprenticeship"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_page_size_is_capped() {
    let dir = config_dir();
    enspm(&dir)
        .args(["users", "list", "--page-size", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page-size"));
}

#[test]
fn test_mine_conflicts_with_pending() {
    let dir = config_dir();
    enspm(&dir)
        .args(["opportunities", "list", "--mine", "--pending"])
        .assert()
        .failure();
}

#[test]
fn test_org_pending_conflicts_with_filters() {
    let dir = config_dir();
    enspm(&dir)
        .args(["orgs", "list", "--pending", "--search", "sonara"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_org_list_help_shows_paging() {
    let dir = config_dir();
    enspm(&dir)
        .args(["orgs", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--page-size"))
        .stdout(predicate::str::contains("--type"));
}

#[test]
fn test_toggle_requires_state() {
    let dir = config_dir();
    enspm(&dir)
        .args(["users", "toggle", "u1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--active"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Subcommand Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_path_uses_override_dir() {
    let dir = config_dir();
    enspm(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("client.toml"))
        .stdout(predicate::str::contains(
            dir.path().to_string_lossy().to_string(),
        ));
}

#[test]
fn test_config_show_defaults() {
    let dir = config_dir();
    enspm(&dir)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8000"))
        .stdout(predicate::str::contains("\"server_source\": \"default\""))
        .stdout(predicate::str::contains("enspm-auth-storage.json"));
}

#[test]
fn test_set_server_persists() {
    let dir = config_dir();
    enspm(&dir)
        .args(["config", "set-server", "https://hub.enspm.cm/"])
        .assert()
        .success();

    let contents = std::fs::read_to_string(dir.path().join("client.toml")).unwrap();
    assert!(contents.contains("https://hub.enspm.cm"));

    enspm(&dir)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"server\": \"https://hub.enspm.cm\""))
        .stdout(predicate::str::contains("config file"));
}

#[test]
fn test_set_server_rejects_bad_scheme() {
    let dir = config_dir();
    enspm(&dir)
        .args(["config", "set-server", "ftp://hub.enspm.cm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://"));
    assert!(!dir.path().join("client.toml").exists());
}

#[test]
fn test_server_env_overrides_config() {
    let dir = config_dir();
    enspm(&dir)
        .env("ENSPM_SERVER_URL", "https://staging.enspm.cm")
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://staging.enspm.cm"))
        .stdout(predicate::str::contains("flag or ENSPM_SERVER_URL"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Session and Status Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_auth_status_signed_out() {
    let dir = config_dir();
    enspm(&dir)
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"signed_in\": false"));
}

#[test]
fn test_auth_status_reads_session_file() {
    let dir = config_dir();
    std::fs::write(
        dir.path().join("enspm-auth-storage.json"),
        r#"{"state":{"accessToken":"A1","refreshToken":"R1","user":null},"version":0}"#,
    )
    .unwrap();

    enspm(&dir)
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"signed_in\": true"));
}

#[test]
fn test_logout_when_signed_out() {
    let dir = config_dir();
    enspm(&dir)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_status_unreachable_server() {
    let dir = config_dir();
    enspm(&dir)
        .args(["--json", "--server", "http://127.0.0.1:9", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reachable\": false"));
}
