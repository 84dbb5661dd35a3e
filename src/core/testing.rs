//! In-memory stand-ins for the CLI, the credential source and the vault.

use std::cell::{Cell, RefCell};

use zeroize::Zeroizing;

use crate::core::constants::LOGIN_REQUIRED;
use crate::core::credential::{Credential, CredentialStrategy};
use crate::core::session::{CommandOutput, SessionManager};
use crate::core::vault::{SecretPage, SecretStore};
use crate::error::{Error, Result};

#[derive(Default)]
struct SessionState {
    logged_in: bool,
    list_errors_before_login: bool,
    login_fails: bool,
    stays_logged_out: bool,
    subscription_error: Option<String>,
    calls: Vec<String>,
}

/// Records `az` calls instead of running them.
pub struct FakeSession {
    state: RefCell<SessionState>,
}

impl FakeSession {
    pub fn logged_in() -> Self {
        Self {
            state: RefCell::new(SessionState {
                logged_in: true,
                ..Default::default()
            }),
        }
    }

    pub fn logged_out() -> Self {
        Self {
            state: RefCell::new(SessionState::default()),
        }
    }

    pub fn fail_list_before_login(&self) {
        self.state.borrow_mut().list_errors_before_login = true;
    }

    pub fn fail_login(&self) {
        self.state.borrow_mut().login_fails = true;
    }

    pub fn stay_logged_out(&self) {
        self.state.borrow_mut().stays_logged_out = true;
    }

    pub fn reject_subscriptions(&self, message: &str) {
        self.state.borrow_mut().subscription_error = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }
}

impl SessionManager for FakeSession {
    fn list_accounts(&self) -> std::io::Result<CommandOutput> {
        let mut state = self.state.borrow_mut();
        state.calls.push("account list".into());

        if state.logged_in {
            return Ok(CommandOutput::ok("[]"));
        }
        if state.list_errors_before_login {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "az"));
        }
        if state.stays_logged_out {
            return Ok(CommandOutput::failed(LOGIN_REQUIRED));
        }
        Ok(CommandOutput::ok(LOGIN_REQUIRED))
    }

    fn login(&self, args: &[String]) -> std::io::Result<CommandOutput> {
        let mut state = self.state.borrow_mut();
        state.calls.push(args.join(" "));

        if state.login_fails {
            return Ok(CommandOutput::failed(""));
        }
        if !state.stays_logged_out {
            state.logged_in = true;
        }
        Ok(CommandOutput::ok(""))
    }

    fn set_subscription(&self, subscription: &str) -> std::io::Result<CommandOutput> {
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push(format!("account set --subscription {}", subscription));

        match &state.subscription_error {
            Some(message) => Ok(CommandOutput::failed(message.clone())),
            None => Ok(CommandOutput::ok("")),
        }
    }
}

/// Hands out a fixed token and counts how often it was asked.
pub struct FakeCredentials {
    acquired: Cell<usize>,
    fails: bool,
}

impl FakeCredentials {
    pub fn new() -> Self {
        Self {
            acquired: Cell::new(0),
            fails: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            acquired: Cell::new(0),
            fails: true,
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.get()
    }
}

impl CredentialStrategy for FakeCredentials {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn acquire(&self) -> Result<Credential> {
        self.acquired.set(self.acquired.get() + 1);
        if self.fails {
            return Err(Error::Authentication("simulated credential failure".into()));
        }
        Ok(Credential::new("fake-token", None))
    }
}

/// Vault contents split into pages. Page `n > 0` is reached through the
/// link `page-n`.
pub struct FakeStore {
    pages: Vec<Vec<(String, String)>>,
    failing_page: Cell<Option<usize>>,
    failing_get: RefCell<Option<String>>,
    calls: RefCell<Vec<String>>,
}

impl FakeStore {
    pub fn single(secrets: &[(&str, &str)]) -> Self {
        Self::paged(vec![secrets.to_vec()])
    }

    pub fn paged(pages: Vec<Vec<(&str, &str)>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| {
                    page.into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect()
                })
                .collect(),
            failing_page: Cell::new(None),
            failing_get: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn fail_page(&self, index: usize) {
        self.failing_page.set(Some(index));
    }

    pub fn fail_get(&self, name: &str) {
        *self.failing_get.borrow_mut() = Some(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl SecretStore for FakeStore {
    fn list_page(&self, next_link: Option<&str>) -> Result<SecretPage> {
        let index = match next_link {
            None => {
                self.calls.borrow_mut().push("list".into());
                0
            }
            Some(link) => {
                self.calls.borrow_mut().push(format!("list {}", link));
                link.strip_prefix("page-")
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| Error::List(format!("bad link {}", link)))?
            }
        };

        if self.failing_page.get() == Some(index) {
            return Err(Error::List("simulated list failure".into()));
        }

        let names = self
            .pages
            .get(index)
            .map(|page| page.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default();
        let next_link = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(SecretPage { names, next_link })
    }

    fn get_secret(&self, name: &str) -> Result<Zeroizing<String>> {
        self.calls.borrow_mut().push(format!("get {}", name));

        if self.failing_get.borrow().as_deref() == Some(name) {
            return Err(Error::GetSecret {
                name: name.to_string(),
                reason: "simulated get failure".into(),
            });
        }

        self.pages
            .iter()
            .flatten()
            .find(|(n, _)| n == name)
            .map(|(_, value)| Zeroizing::new(value.clone()))
            .ok_or_else(|| Error::GetSecret {
                name: name.to_string(),
                reason: "not found".into(),
            })
    }
}
