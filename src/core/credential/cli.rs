//! Credential delegated to the Azure CLI.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::{Credential, CredentialStrategy};
use crate::core::constants::VAULT_RESOURCE;
use crate::core::session::AzCli;
use crate::error::{Error, Result};

/// Token from `az account get-access-token`, reusing the ensured login.
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    az: AzCli,
    resource: String,
}

impl AzureCliCredential {
    pub fn new(az: AzCli) -> Self {
        Self {
            az,
            resource: VAULT_RESOURCE.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessToken {
    access_token: String,
    /// Local time, e.g. `2024-05-01 12:34:56.000000`.
    expires_on: Option<String>,
    /// Epoch seconds; only in newer CLI versions.
    #[serde(rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

impl CredentialStrategy for AzureCliCredential {
    fn name(&self) -> &'static str {
        "azure-cli"
    }

    fn acquire(&self) -> Result<Credential> {
        info!("authenticating with Azure CLI credentials");
        let out = self
            .az
            .capture(&[
                "account",
                "get-access-token",
                "--resource",
                &self.resource,
                "--output",
                "json",
            ])
            .map_err(|e| Error::Authentication(format!("failed to run az: {}", e)))?;

        if !out.success {
            return Err(Error::Authentication(format!(
                "az account get-access-token failed: {}",
                out.output.trim()
            )));
        }

        parse_access_token(&out.output)
    }
}

fn parse_access_token(json: &str) -> Result<Credential> {
    let token: AccessToken = serde_json::from_str(json).map_err(|e| {
        Error::Authentication(format!("unexpected az get-access-token output: {}", e))
    })?;

    let expires_on = match (token.expires_on_epoch, token.expires_on.as_deref()) {
        (Some(epoch), _) => DateTime::from_timestamp(epoch, 0),
        (None, Some(local)) => parse_local_timestamp(local),
        (None, None) => None,
    };
    debug!(?expires_on, "obtained token from az");

    Ok(Credential::new(token.access_token, expires_on))
}

fn parse_local_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}
