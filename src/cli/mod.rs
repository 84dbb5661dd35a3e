//! Command-line interface.

pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::constants::DEFAULT_TENANT;
use crate::core::credential::{AzureCliCredential, CredentialStrategy, DeviceCodeCredential};
use crate::core::pipeline::{self, Options, Outcome};
use crate::core::session::AzCli;
use crate::core::vault::KeyVaultClient;
use crate::error::Result;

/// kvenv - export Azure Key Vault secrets to a .env file.
#[derive(Parser, Debug)]
#[command(
    name = "kvenv",
    about = "Export Azure Key Vault secrets to a .env file",
    version
)]
pub struct Cli {
    /// Name of the Azure Key Vault
    #[arg(long = "vaultName", env = "KVENV_VAULT_NAME", value_name = "NAME")]
    pub vault_name: Option<String>,

    /// Only export secrets named <appName>-*, without the prefix
    #[arg(long = "appName", env = "KVENV_APP_NAME", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Directory to write the .env file to
    #[arg(long = "outputPath", value_name = "DIR", default_value = ".")]
    pub output_path: PathBuf,

    /// Subscription to switch to before reading the vault
    #[arg(long, value_name = "ID")]
    pub subscription: Option<String>,

    /// Extra arguments for `az login`
    #[arg(long = "loginParams", value_name = "ARGS", allow_hyphen_values = true)]
    pub login_params: Option<String>,

    /// Write to /tmp/environment and source it from ~/.bashrc and ~/.zshrc
    #[arg(
        long = "setToEnvironment",
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value_t = false
    )]
    pub set_to_environment: bool,

    /// How to obtain the access token
    #[arg(long, value_enum, default_value_t = CredentialKind::Cli)]
    pub credential: CredentialKind,

    /// Tenant for the device-code flow
    #[arg(long, value_name = "TENANT", default_value = DEFAULT_TENANT)]
    pub tenant: String,

    /// Vault URL, for clouds other than the public one
    #[arg(long = "vaultUrl", env = "KVENV_VAULT_URL", value_name = "URL")]
    pub vault_url: Option<String>,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Credential strategies selectable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKind {
    /// Reuse the az CLI session
    Cli,
    /// Sign in with a code on another device
    DeviceCode,
}

impl Cli {
    /// Resolve flags into run options.
    ///
    /// # Errors
    ///
    /// Returns `Error::Usage` if no vault name was given.
    pub fn options(&self) -> Result<Options> {
        let mut opts = Options::new(self.vault_name.clone().unwrap_or_default())?;

        if let Some(url) = self.vault_url.as_deref().filter(|u| !u.is_empty()) {
            opts.vault_url = url.trim_end_matches('/').to_string();
        }
        opts.app_name = self.app_name.clone().filter(|a| !a.is_empty());
        opts.output_dir = self.output_path.clone();
        opts.subscription = self.subscription.clone().filter(|s| !s.is_empty());
        opts.login_params = self.login_params.clone().filter(|p| !p.trim().is_empty());
        opts.set_to_environment = self.set_to_environment;
        opts.home = dirs::home_dir();

        Ok(opts)
    }

    fn credential_strategy(&self, az: &AzCli) -> Box<dyn CredentialStrategy> {
        match self.credential {
            CredentialKind::Cli => Box::new(AzureCliCredential::new(az.clone())),
            CredentialKind::DeviceCode => {
                Box::new(DeviceCodeCredential::new(&self.tenant).on_prompt(output::hint))
            }
        }
    }
}

/// Run kvenv with the parsed flags and report the result.
pub fn execute(cli: &Cli) -> Result<Outcome> {
    let opts = cli.options()?;
    let az = AzCli::locate()?;
    let credentials = cli.credential_strategy(&az);

    let outcome = pipeline::run(&opts, &az, credentials.as_ref(), KeyVaultClient::new)?;
    report(&outcome);
    Ok(outcome)
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Skipped { path } => {
            output::warn(&format!(
                "{} already exists, nothing to do",
                output::path(&path.display().to_string())
            ));
        }
        Outcome::Written { path, count } => {
            output::success(&format!(
                "wrote {} to {}",
                secrets(*count),
                output::path(&path.display().to_string())
            ));
        }
        Outcome::Exported {
            path,
            count,
            rc_files,
        } => {
            output::success(&format!(
                "wrote {} to {}",
                secrets(*count),
                output::path(&path.display().to_string())
            ));
            for rc in rc_files {
                output::kv("sourced from:", rc.display());
            }
            output::hint("open a new shell to load them");
        }
    }
}

fn secrets(count: usize) -> String {
    match count {
        1 => "1 secret".to_string(),
        n => format!("{} secrets", n),
    }
}
