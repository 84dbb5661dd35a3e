//! Test support utilities for kvenv integration tests.
//!
//! Provides an isolated environment with a fake `az` on `PATH` and a mock
//! Key Vault.

#![allow(dead_code)]

pub mod vault;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use vault::MockVault;

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stand-in for the Azure CLI. Logs each invocation and keeps the login
/// state as a marker file.
const FAKE_AZ: &str = r#"#!/bin/sh
echo "$*" >> "$KVENV_TEST_AZ_LOG"
case "$1" in
  login)
    touch "$KVENV_TEST_AZ_STATE/logged_in"
    ;;
  account)
    case "$2" in
      list)
        if [ -f "$KVENV_TEST_AZ_STATE/logged_in" ]; then
          echo "[]"
        else
          echo 'Please run "az login" to access your accounts.'
        fi
        ;;
      get-access-token)
        echo '{"accessToken":"test-token","expires_on":4102444800,"tokenType":"Bearer"}'
        ;;
      set)
        if [ "$4" = "missing-sub" ]; then
          echo "ERROR: The subscription 'missing-sub' doesn't exist in cloud 'AzureCloud'." >&2
          exit 1
        fi
        ;;
    esac
    ;;
esac
"#;

/// Test environment with isolated temp directories.
///
/// No process-global state is mutated; the binary runs with its own
/// `HOME`, `PATH` and working directory.
pub struct Test {
    /// Working directory for the binary
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
    /// Holds the fake `az` and its state
    pub bin: TempDir,
}

impl Test {
    /// Environment with an active az session.
    pub fn new() -> Self {
        let t = Self::logged_out();
        fs::write(t.bin.path().join("logged_in"), "").expect("failed to write login marker");
        t
    }

    /// Environment where `az account list` asks for a login.
    pub fn logged_out() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        let bin = TempDir::new().expect("failed to create temp bin");

        let az = bin.path().join("az");
        fs::write(&az, FAKE_AZ).expect("failed to write fake az");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&az, fs::Permissions::from_mode(0o755))
                .expect("failed to make fake az executable");
        }

        Self { dir, home, bin }
    }

    /// A kvenv command wired to the fake az.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("kvenv").expect("failed to find kvenv binary");
        let path = std::env::var("PATH").unwrap_or_default();
        cmd.env("PATH", format!("{}:{}", self.bin.path().display(), path));
        cmd.env("HOME", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env("KVENV_TEST_AZ_LOG", self.az_log_path());
        cmd.env("KVENV_TEST_AZ_STATE", self.bin.path());
        cmd.env_remove("KVENV_VAULT_NAME");
        cmd.env_remove("KVENV_APP_NAME");
        cmd.env_remove("KVENV_VAULT_URL");
        cmd.env_remove("KVENV_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run against `vault` with extra flags.
    pub fn run(&self, vault: &MockVault, args: &[&str]) -> std::process::Output {
        self.cmd()
            .args(["--vaultName", "test-kv", "--vaultUrl", &vault.uri()])
            .args(args)
            .output()
            .expect("failed to run kvenv")
    }

    fn az_log_path(&self) -> PathBuf {
        self.bin.path().join("az.log")
    }

    /// Every az invocation so far, one per entry.
    pub fn az_calls(&self) -> Vec<String> {
        fs::read_to_string(self.az_log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn read(&self, rel: &str) -> String {
        read(&self.path(rel))
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e))
}
