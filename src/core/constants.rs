//! Constants used throughout kvenv.
//!
//! Centralizes magic strings and configuration values.

use std::time::Duration;

/// Environment variables file name (.env).
pub const ENV_FILE: &str = ".env";

/// Where secrets go when exporting to the shell environment.
pub const EXPORT_FILE: &str = "/tmp/environment";

/// Line appended to shell rc files in export mode.
pub const SOURCE_LINE: &str = "source ${BASH_SOURCE[0]%/*}/tmp/environment";

/// Shell rc files (relative to HOME) that receive [`SOURCE_LINE`].
pub const RC_FILES: &[&str] = &[".bashrc", ".zshrc"];

/// Azure CLI executable name.
pub const AZ: &str = "az";

/// Printed by `az account list` when there is no session.
pub const LOGIN_REQUIRED: &str = "Please run \"az login\" to access your accounts.";

/// DNS suffix of public-cloud Key Vault endpoints.
pub const VAULT_DNS_SUFFIX: &str = "vault.azure.net";

/// Token audience for Key Vault.
pub const VAULT_RESOURCE: &str = "https://vault.azure.net";

/// OAuth scope for Key Vault.
pub const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// Key Vault REST API version.
pub const API_VERSION: &str = "7.4";

/// Secrets requested per list page.
pub const PAGE_SIZE: u32 = 25;

/// Upper bound on the authentication check.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Entra ID authority host.
pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default tenant for the device-code flow.
pub const DEFAULT_TENANT: &str = "organizations";

/// Public client id of the Azure CLI, used for the device-code flow.
pub const AZ_CLI_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

/// Vault URL for a vault name in the public cloud.
pub fn vault_url(vault_name: &str) -> String {
    format!("https://{}.{}", vault_name, VAULT_DNS_SUFFIX)
}
