//! Bearer-token credentials for Key Vault.
//!
//! ## Strategies
//!
//! - **cli**: reuses the `az` session (`az account get-access-token`).
//! - **device-code**: OAuth device authorization grant; the user finishes
//!   sign-in in a browser on any device.
//!
//! Whichever strategy is used, the credential is checked once against the
//! vault with [`validate`] before anything is exported.

mod cli;
mod device_code;

pub use cli::AzureCliCredential;
pub use device_code::DeviceCodeCredential;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::vault::SecretStore;
use crate::error::{Error, Result};

/// An access token, held for the life of the process and never written out.
#[derive(Clone)]
pub struct Credential {
    token: Zeroizing<String>,
    expires_on: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_on: Option<DateTime<Utc>>) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
            expires_on,
        }
    }

    /// The raw bearer token.
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    pub fn expires_on(&self) -> Option<DateTime<Utc>> {
        self.expires_on
    }

    /// Whether the token is known to have expired.
    pub fn is_expired(&self) -> bool {
        self.expires_on.is_some_and(|at| at <= Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// A way of obtaining a [`Credential`].
pub trait CredentialStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Obtain a token.
    ///
    /// # Errors
    ///
    /// Returns `Error::Authentication` if no token could be obtained.
    fn acquire(&self) -> Result<Credential>;
}

/// Check that the store accepts the credential by listing one page.
///
/// The call is bounded by `timeout`; any failure, including the timeout,
/// is an authentication failure.
pub fn validate(store: &dyn SecretStore, timeout: Duration) -> Result<()> {
    info!("checking access to the vault");
    store.probe(timeout).map_err(|e| match e {
        Error::List(msg) | Error::Authentication(msg) => Error::Authentication(msg),
        other => Error::Authentication(other.to_string()),
    })?;
    debug!("vault access confirmed");
    Ok(())
}
