//! `az` subprocess implementation of [`SessionManager`].

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::trace;

use super::{CommandOutput, SessionManager};
use crate::core::constants::AZ;
use crate::error::{Error, Result};

/// Azure CLI found on `PATH`.
#[derive(Debug, Clone)]
pub struct AzCli {
    program: PathBuf,
}

impl AzCli {
    /// Locate `az` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Login` if the CLI is not installed.
    pub fn locate() -> Result<Self> {
        let program = which::which(AZ).map_err(|_| {
            Error::Login(
                "az CLI not found. Install it from https://aka.ms/install-azure-cli".to_string(),
            )
        })?;
        Ok(Self { program })
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run with captured output.
    pub fn capture(&self, args: &[&str]) -> std::io::Result<CommandOutput> {
        trace!(program = %self.program.display(), ?args, "running az");
        let out = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(CommandOutput {
            success: out.status.success(),
            output: combined,
        })
    }
}

impl SessionManager for AzCli {
    fn list_accounts(&self) -> std::io::Result<CommandOutput> {
        self.capture(&["account", "list"])
    }

    fn login(&self, args: &[String]) -> std::io::Result<CommandOutput> {
        trace!(program = %self.program.display(), ?args, "running interactive az");
        // The user may have to answer prompts, so stdio stays attached.
        let status = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(CommandOutput {
            success: status.success(),
            output: String::new(),
        })
    }

    fn set_subscription(&self, subscription: &str) -> std::io::Result<CommandOutput> {
        self.capture(&["account", "set", "--subscription", subscription])
    }
}
