//! Azure Key Vault REST client.

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::runtime::Runtime;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use super::{SecretPage, SecretStore};
use crate::core::constants::{API_VERSION, PAGE_SIZE};
use crate::core::credential::Credential;
use crate::core::http;
use crate::error::{Error, Result};

/// Blocking Key Vault client authenticated with a bearer token.
pub struct KeyVaultClient {
    base: Url,
    credential: Credential,
    http: reqwest::Client,
    rt: Runtime,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    value: Vec<SecretItem>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct SecretItem {
    id: String,
}

#[derive(Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

impl KeyVaultClient {
    /// Connect to the vault at `vault_url`, e.g. `https://my-kv.vault.azure.net`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Usage` for a malformed URL, `Error::Http` if the
    /// HTTP client cannot be built and `Error::Io` if the runtime cannot be
    /// created.
    pub fn new(vault_url: &str, credential: Credential) -> Result<Self> {
        let base = Url::parse(vault_url)
            .map_err(|e| Error::Usage(format!("invalid vault URL {}: {}", vault_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Usage(format!("invalid vault URL {}", vault_url)));
        }
        if credential.is_expired() {
            warn!("access token has already expired");
        }

        Ok(Self {
            base,
            credential,
            http: http::client()?,
            rt: http::runtime()?,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        url
    }

    fn first_page_url(&self) -> Url {
        let mut url = self.url(&["secrets"]);
        url.query_pairs_mut()
            .append_pair("maxresults", &PAGE_SIZE.to_string());
        url
    }

    /// `nextLink` normally carries the api-version already. The token is only
    /// ever sent to the vault's own origin.
    fn next_page_url(&self, next_link: &str) -> std::result::Result<Url, String> {
        let mut url = Url::parse(next_link).map_err(|e| format!("bad nextLink: {}", e))?;
        if url.origin() != self.base.origin() {
            return Err(format!(
                "nextLink points outside the vault: {}://{}",
                url.scheme(),
                url.host_str().unwrap_or("")
            ));
        }
        if !url.query_pairs().any(|(k, _)| k == "api-version") {
            url.query_pairs_mut().append_pair("api-version", API_VERSION);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> std::result::Result<T, String> {
        trace!(path = url.path(), "GET");
        let resp = self
            .http
            .get(url)
            .bearer_auth(self.credential.token())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(http::describe_failure(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| format!("unexpected response: {}", e))
    }

    async fn fetch_page(&self, next_link: Option<&str>) -> std::result::Result<SecretPage, String> {
        let url = match next_link {
            Some(link) => self.next_page_url(link)?,
            None => self.first_page_url(),
        };

        let list: ListResponse = self.get_json(url).await?;
        let names = list
            .value
            .iter()
            .filter_map(|item| {
                let name = secret_name(&item.id);
                if name.is_none() {
                    warn!(id = %item.id, "skipping secret with unrecognised id");
                }
                name.map(str::to_string)
            })
            .collect::<Vec<_>>();

        debug!(count = names.len(), more = list.next_link.is_some(), "listed secrets");
        Ok(SecretPage {
            names,
            next_link: list.next_link,
        })
    }
}

impl SecretStore for KeyVaultClient {
    fn list_page(&self, next_link: Option<&str>) -> Result<SecretPage> {
        self.rt
            .block_on(self.fetch_page(next_link))
            .map_err(Error::List)
    }

    fn get_secret(&self, name: &str) -> Result<Zeroizing<String>> {
        let url = self.url(&["secrets", name]);
        let bundle: SecretBundle = self
            .rt
            .block_on(self.get_json(url))
            .map_err(|reason| Error::GetSecret {
                name: name.to_string(),
                reason,
            })?;

        bundle
            .value
            .map(Zeroizing::new)
            .ok_or_else(|| Error::GetSecret {
                name: name.to_string(),
                reason: "response had no value".to_string(),
            })
    }

    fn probe(&self, timeout: Duration) -> Result<()> {
        self.rt.block_on(async {
            match tokio::time::timeout(timeout, self.fetch_page(None)).await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(e)) => Err(Error::Authentication(e)),
                Err(_) => Err(Error::Authentication(format!(
                    "no response from the vault within {}s",
                    timeout.as_secs()
                ))),
            }
        })
    }
}

/// Secret name from a secret id such as
/// `https://my-kv.vault.azure.net/secrets/<name>[/<version>]`.
fn secret_name(id: &str) -> Option<&str> {
    let (_, rest) = id.split_once("/secrets/")?;
    rest.split('/').next().filter(|name| !name.is_empty())
}
