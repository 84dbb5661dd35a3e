//! OAuth 2.0 device authorization grant against Entra ID.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use super::{Credential, CredentialStrategy};
use crate::core::constants::{AUTHORITY_HOST, AZ_CLI_CLIENT_ID, VAULT_SCOPE};
use crate::core::http;
use crate::error::{Error, Result};

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Extra wait the server asks for on `slow_down`.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Interactive device-code credential.
///
/// Shows the user a code and a URL, then polls until sign-in completes or
/// the code expires.
pub struct DeviceCodeCredential {
    authority: String,
    tenant: String,
    client_id: String,
    scope: String,
    prompt: Box<dyn Fn(&str)>,
}

impl DeviceCodeCredential {
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            authority: AUTHORITY_HOST.to_string(),
            tenant: tenant.into(),
            client_id: AZ_CLI_CLIENT_ID.to_string(),
            scope: VAULT_SCOPE.to_string(),
            prompt: Box::new(|msg| eprintln!("{}", msg)),
        }
    }

    /// Talk to a different authority host.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into().trim_end_matches('/').to_string();
        self
    }

    /// How the sign-in instructions reach the user.
    pub fn on_prompt(mut self, prompt: impl Fn(&str) + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    fn endpoint(&self, leaf: &str) -> String {
        format!("{}/{}/oauth2/v2.0/{}", self.authority, self.tenant, leaf)
    }

    async fn run(&self, client: &reqwest::Client) -> std::result::Result<Credential, String> {
        let resp = client
            .post(self.endpoint("devicecode"))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| format!("device code request failed: {}", e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(oauth_failure(status, &body));
        }
        let code: DeviceCode = serde_json::from_str(&body)
            .map_err(|e| format!("unexpected device code response: {}", e))?;

        let message = code.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, open {} and enter the code {}",
                code.verification_uri, code.user_code
            )
        });
        (self.prompt)(&message);

        let deadline = Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = Duration::from_secs(code.interval.unwrap_or(5));

        loop {
            sleep(interval).await;
            if Instant::now() >= deadline {
                return Err("device code expired before sign-in completed".to_string());
            }

            trace!("polling token endpoint");
            let resp = client
                .post(self.endpoint("token"))
                .form(&[
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("client_id", self.client_id.as_str()),
                    ("device_code", code.device_code.as_str()),
                ])
                .send()
                .await
                .map_err(|e| format!("token request failed: {}", e))?;

            let status = resp.status();
            let body = resp.text().await.map_err(|e| e.to_string())?;

            if status.is_success() {
                let token: Token = serde_json::from_str(&body)
                    .map_err(|e| format!("unexpected token response: {}", e))?;
                let expires_on = token
                    .expires_in
                    .and_then(|secs| chrono::Duration::try_seconds(secs as i64))
                    .map(|ttl| Utc::now() + ttl);
                return Ok(Credential::new(token.access_token, expires_on));
            }

            match serde_json::from_str::<OAuthError>(&body) {
                Ok(err) if err.error == "authorization_pending" => continue,
                Ok(err) if err.error == "slow_down" => {
                    interval += SLOW_DOWN_STEP;
                    debug!(?interval, "token endpoint asked to slow down");
                }
                _ => return Err(oauth_failure(status, &body)),
            }
        }
    }
}

impl CredentialStrategy for DeviceCodeCredential {
    fn name(&self) -> &'static str {
        "device-code"
    }

    fn acquire(&self) -> Result<Credential> {
        debug!(tenant = %self.tenant, "starting device code flow");
        let rt = http::runtime()?;
        let client = http::client()?;
        rt.block_on(self.run(&client)).map_err(Error::Authentication)
    }
}

#[derive(Deserialize)]
struct DeviceCode {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: Option<u64>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct Token {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct OAuthError {
    error: String,
    error_description: Option<String>,
}

fn oauth_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<OAuthError>(body) {
        Ok(OAuthError {
            error,
            error_description: Some(desc),
        }) => format!("{} ({}): {}", status, error, desc.lines().next().unwrap_or("")),
        Ok(OAuthError { error, .. }) => format!("{} ({})", status, error),
        Err(_) => http::describe_failure(status, body),
    }
}
