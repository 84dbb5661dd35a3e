//! The export run, start to finish.
//!
//! Order matters: the session is ensured before anything else, an
//! existing output file ends the run before any credential or vault call,
//! and authentication is checked before the output is touched.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::constants::{self, AUTH_TIMEOUT, ENV_FILE, EXPORT_FILE, SOURCE_LINE};
use crate::core::credential::{self, Credential, CredentialStrategy};
use crate::core::session::{self, SessionManager};
use crate::core::vault::SecretStore;
use crate::core::{env, shell};
use crate::error::{Error, Result};

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Options {
    pub vault_name: String,
    pub vault_url: String,
    /// Keep only `<app>-` secrets and strip the prefix.
    pub app_name: Option<String>,
    /// Directory that holds the `.env` file.
    pub output_dir: PathBuf,
    pub subscription: Option<String>,
    /// Extra `az login` arguments, whitespace-separated.
    pub login_params: Option<String>,
    /// Write to [`Options::export_path`] and hook it into the shell rc files.
    pub set_to_environment: bool,
    pub export_path: PathBuf,
    /// Where the rc files live. `None` skips them.
    pub home: Option<PathBuf>,
}

impl Options {
    /// Defaults for `vault_name`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Usage` if `vault_name` is empty.
    pub fn new(vault_name: impl Into<String>) -> Result<Self> {
        let vault_name = vault_name.into();
        if vault_name.trim().is_empty() {
            return Err(Error::Usage("--vaultName is required".to_string()));
        }

        Ok(Self {
            vault_url: constants::vault_url(&vault_name),
            vault_name,
            app_name: None,
            output_dir: PathBuf::from("."),
            subscription: None,
            login_params: None,
            set_to_environment: false,
            export_path: PathBuf::from(EXPORT_FILE),
            home: None,
        })
    }

    /// `<output_dir>/.env`
    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join(ENV_FILE)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The output file already existed; nothing was done.
    Skipped { path: PathBuf },
    /// Secrets were written to the output file.
    Written { path: PathBuf, count: usize },
    /// Secrets were written to the export file and sourced from `rc_files`.
    Exported {
        path: PathBuf,
        count: usize,
        rc_files: Vec<PathBuf>,
    },
}

/// Run the export.
///
/// `connect` builds the secret store from the vault URL and the acquired
/// credential.
///
/// # Errors
///
/// Any failure ends the run; see [`Error`] for the kinds.
pub fn run<S, F>(
    opts: &Options,
    session: &dyn SessionManager,
    credentials: &dyn CredentialStrategy,
    connect: F,
) -> Result<Outcome>
where
    S: SecretStore,
    F: FnOnce(&str, Credential) -> Result<S>,
{
    session::ensure_login(session, opts.login_params.as_deref())?;

    if let Some(subscription) = opts.subscription.as_deref().filter(|s| !s.is_empty()) {
        session::select_subscription(session, subscription)?;
    }

    let output_file = opts.output_file();
    if output_file.exists() {
        info!(
            path = %output_file.display(),
            "output file already exists, nothing to do"
        );
        return Ok(Outcome::Skipped { path: output_file });
    }

    if !opts.output_dir.exists() {
        info!(path = %opts.output_dir.display(), "creating output directory");
        std::fs::create_dir_all(&opts.output_dir)?;
    }

    info!(strategy = credentials.name(), vault = %opts.vault_name, "acquiring credential");
    let credential = credentials.acquire()?;
    let store = connect(&opts.vault_url, credential)?;
    credential::validate(&store, AUTH_TIMEOUT)?;
    info!("authentication successful");

    let app = opts.app_name.as_deref();

    if opts.set_to_environment {
        let count = env::export(&store, app, &opts.export_path)?;
        let rc_files = source_from_rc_files(opts.home.as_deref());
        return Ok(Outcome::Exported {
            path: opts.export_path.clone(),
            count,
            rc_files,
        });
    }

    let count = env::export(&store, app, &output_file)?;
    Ok(Outcome::Written {
        path: output_file,
        count,
    })
}

/// Append the source line to each rc file that exists.
///
/// Failures are reported and skipped; the secrets are already written.
fn source_from_rc_files(home: Option<&Path>) -> Vec<PathBuf> {
    let Some(home) = home else {
        warn!("home directory unknown, not updating shell rc files");
        return Vec::new();
    };

    let mut updated = Vec::new();
    for rc in shell::rc_files(home) {
        match shell::append_line_if_exists(&rc, SOURCE_LINE) {
            Ok(true) => updated.push(rc),
            Ok(false) => {}
            Err(e) => warn!(path = %rc.display(), error = %e, "failed to update rc file"),
        }
    }
    updated
}
