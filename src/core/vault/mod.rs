//! Secret store access.
//!
//! [`SecretStore`] is the narrow view of the vault that kvenv needs: list
//! secret names a page at a time and read a secret's current value.
//! [`KeyVaultClient`] implements it over the Key Vault REST API.

mod keyvault;

pub use keyvault::KeyVaultClient;

use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::Result;

/// One page of secret names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretPage {
    pub names: Vec<String>,
    /// Where the next page is; `None` on the last page.
    pub next_link: Option<String>,
}

/// Read-only access to a vault.
pub trait SecretStore {
    /// Fetch a page of names. `None` asks for the first page.
    ///
    /// # Errors
    ///
    /// Returns `Error::List` if the page cannot be retrieved.
    fn list_page(&self, next_link: Option<&str>) -> Result<SecretPage>;

    /// Current value of a secret.
    ///
    /// # Errors
    ///
    /// Returns `Error::GetSecret` if the value cannot be retrieved.
    fn get_secret(&self, name: &str) -> Result<Zeroizing<String>>;

    /// Fetch the first page and discard it, giving up after `timeout`.
    ///
    /// Stores without their own deadline handling ignore `timeout`.
    fn probe(&self, _timeout: Duration) -> Result<()> {
        self.list_page(None).map(|_| ())
    }
}

impl<T: SecretStore + ?Sized> SecretStore for &T {
    fn list_page(&self, next_link: Option<&str>) -> Result<SecretPage> {
        (**self).list_page(next_link)
    }

    fn get_secret(&self, name: &str) -> Result<Zeroizing<String>> {
        (**self).get_secret(name)
    }

    fn probe(&self, timeout: Duration) -> Result<()> {
        (**self).probe(timeout)
    }
}

/// Lazy iterator over all pages of secret names.
///
/// Each call to [`Pages::new`] starts again from the first page. Iteration
/// stops after the last page or after the first error.
pub struct Pages<'a> {
    store: &'a dyn SecretStore,
    next_link: Option<String>,
    done: bool,
}

impl<'a> Pages<'a> {
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self {
            store,
            next_link: None,
            done: false,
        }
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.store.list_page(self.next_link.as_deref()) {
            Ok(page) => {
                self.next_link = page.next_link.filter(|link| !link.is_empty());
                self.done = self.next_link.is_none();
                Some(Ok(page.names))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
