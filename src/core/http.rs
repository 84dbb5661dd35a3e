//! Blocking wrapper around the async HTTP client.
//!
//! kvenv is a sequential tool. Each REST client owns a current-thread
//! runtime and blocks on it for every request.

use serde::Deserialize;
use tokio::runtime::Runtime;

/// Build the runtime a blocking client drives its requests on.
pub fn runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Shared reqwest client configuration.
pub fn client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("kvenv/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// Human-readable description of a failed Azure REST response.
///
/// Uses the `{"error": {"code", "message"}}` envelope when present, and
/// falls back to the status line.
pub fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => match (error.code, error.message) {
            (Some(code), Some(message)) => format!("{} ({}): {}", status, code, message),
            (Some(code), None) => format!("{} ({})", status, code),
            (None, Some(message)) => format!("{}: {}", status, message),
            (None, None) => status.to_string(),
        },
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{}: {}", status, body.trim()),
    }
}
