//! Error types.
//!
//! Every failure is terminal for a run. Library code returns these up to
//! `main`, which reports the message and exits non-zero.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("login failed: {0}")]
    Login(String),

    #[error("failed to set subscription: {0}")]
    SubscriptionSet(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("failed to list secrets: {0}")]
    List(String),

    #[error("failed to get secret {name}: {reason}")]
    GetSecret { name: String, reason: String },

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Suggested next step for the user, if there is an obvious one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::Login(_) => Some("run: az login"),
            Error::Authentication(_) => {
                Some("check that your account can list secrets in this vault")
            }
            Error::SubscriptionSet(_) => Some("run: az account list --output table"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
