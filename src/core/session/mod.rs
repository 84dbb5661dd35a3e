//! Azure CLI session management.
//!
//! Login and subscription selection go through the `az` CLI. The
//! subprocess calls sit behind the [`SessionManager`] trait so the
//! sequencing in [`ensure_login`] and [`select_subscription`] can run
//! against a fake.

mod az;

pub use az::AzCli;

use tracing::{debug, info};

use crate::core::constants::LOGIN_REQUIRED;
use crate::error::{Error, Result};

/// Result of one CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited zero.
    pub success: bool,
    /// Combined stdout and stderr. Empty when stdio was inherited.
    pub output: String,
}

impl CommandOutput {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// The cloud CLI operations kvenv depends on.
///
/// An `Err` means the process could not be run at all; a process that ran
/// and failed is an `Ok` with `success == false`.
pub trait SessionManager {
    /// `az account list`
    fn list_accounts(&self) -> std::io::Result<CommandOutput>;

    /// `az login <args>`, interactive.
    fn login(&self, args: &[String]) -> std::io::Result<CommandOutput>;

    /// `az account set --subscription <id>`
    fn set_subscription(&self, subscription: &str) -> std::io::Result<CommandOutput>;
}

/// Make sure there is a usable CLI session, logging in if there is none.
///
/// `login_params` is split on whitespace and passed through to `az login`.
/// After an interactive login the account listing is checked once more.
pub fn ensure_login(session: &dyn SessionManager, login_params: Option<&str>) -> Result<()> {
    let logged_in = match session.list_accounts() {
        Ok(out) => out.success && !out.output.contains(LOGIN_REQUIRED),
        Err(e) => {
            debug!(error = %e, "account list could not run");
            false
        }
    };

    if logged_in {
        debug!("existing az session found");
        return Ok(());
    }

    info!("not logged in, running 'az login'");
    let args = login_args(login_params);
    let status = session
        .login(&args)
        .map_err(|e| Error::Login(format!("failed to execute 'az login': {}", e)))?;
    if !status.success {
        return Err(Error::Login("'az login' exited with a failure status".into()));
    }
    info!("login successful");

    let check = session
        .list_accounts()
        .map_err(|e| Error::Login(format!("failed to list accounts after login: {}", e)))?;
    if !check.success {
        return Err(Error::Login(format!(
            "failed to list accounts after login: {}",
            check.output.trim()
        )));
    }

    Ok(())
}

/// Switch the active subscription.
pub fn select_subscription(session: &dyn SessionManager, subscription: &str) -> Result<()> {
    info!(subscription, "setting subscription");
    let out = session
        .set_subscription(subscription)
        .map_err(|e| Error::SubscriptionSet(e.to_string()))?;
    if !out.success {
        return Err(Error::SubscriptionSet(out.output.trim().to_string()));
    }
    debug!(subscription, "subscription set");
    Ok(())
}

fn login_args(login_params: Option<&str>) -> Vec<String> {
    let mut args = vec!["login".to_string()];
    if let Some(params) = login_params {
        args.extend(params.split_whitespace().map(str::to_string));
    }
    args
}
