//! Mock Key Vault built on wiremock.
//!
//! The server lives on its own multi-threaded runtime so blocking clients
//! (and the kvenv binary) can talk to it from the test thread.

use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Token the fake az hands out and the mock vault expects.
pub const TOKEN: &str = "test-token";

pub struct MockVault {
    // Dropped before the runtime it runs on.
    server: MockServer,
    rt: Runtime,
}

impl MockVault {
    /// A vault with no routes mounted.
    pub fn empty() -> Self {
        let rt = Runtime::new().expect("failed to build test runtime");
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    /// A vault holding `secrets` in a single page.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        Self::with_pages(vec![secrets.to_vec()])
    }

    /// A vault whose listing is split into `pages`, linked by `nextLink`.
    pub fn with_pages(pages: Vec<Vec<(&str, &str)>>) -> Self {
        let vault = Self::empty();
        let uri = vault.uri();

        for (i, page) in pages.iter().enumerate() {
            let items: Vec<_> = page
                .iter()
                .map(|(name, _)| json!({ "id": format!("{}/secrets/{}", uri, name) }))
                .collect();
            let next_link = (i + 1 < pages.len()).then(|| {
                format!(
                    "{}/secrets?api-version=7.4&$skiptoken=p{}&maxresults=25",
                    uri,
                    i + 1
                )
            });
            let body = json!({ "value": items, "nextLink": next_link });

            let mock = Mock::given(method("GET"))
                .and(path("/secrets"))
                .and(query_param("api-version", "7.4"))
                .and(header("authorization", format!("Bearer {}", TOKEN).as_str()));
            let mock = if i == 0 {
                mock.and(query_param_is_missing("$skiptoken"))
            } else {
                mock.and(query_param("$skiptoken", format!("p{}", i).as_str()))
            };
            vault.mount(mock.respond_with(ResponseTemplate::new(200).set_body_json(body)));

            for (name, value) in page {
                vault.mount(
                    Mock::given(method("GET"))
                        .and(path(format!("/secrets/{}", name)))
                        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
                        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                            "id": format!("{}/secrets/{}/0123abcd", uri, name),
                            "value": value,
                        }))),
                );
            }
        }

        vault
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// Every request the vault has seen.
    pub fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    /// Paths of the requests seen, in order.
    pub fn request_paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}
