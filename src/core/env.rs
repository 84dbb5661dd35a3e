//! Writing vault secrets as a .env file.
//!
//! Secret names become keys by dropping the application prefix and turning
//! every `-` into `_`. Values are written verbatim, one `KEY=VALUE` per
//! line, in the order the vault lists them.

use std::fmt;
use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::Path;

use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::core::vault::{Pages, SecretStore};
use crate::error::Result;

/// One `KEY=VALUE` line of the output file.
pub struct EnvLine {
    pub key: String,
    pub value: Zeroizing<String>,
}

impl fmt::Display for EnvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value.as_str())
    }
}

/// Environment variable name for a secret, or `None` if the secret does not
/// belong to `app`.
///
/// With an application name, only secrets named `<app>-...` are kept and
/// the prefix is removed. An empty application name keeps everything.
///
/// ```
/// use kvenv::core::env::env_key;
///
/// assert_eq!(env_key("myapp-db-host", Some("myapp")).as_deref(), Some("db_host"));
/// assert_eq!(env_key("other-KEY", Some("myapp")), None);
/// assert_eq!(env_key("A-B", None).as_deref(), Some("A_B"));
/// ```
pub fn env_key(name: &str, app: Option<&str>) -> Option<String> {
    let name = match app.filter(|app| !app.is_empty()) {
        Some(app) => name.strip_prefix(app)?.strip_prefix('-')?,
        None => name,
    };
    Some(name.replace('-', "_"))
}

/// Write every (matching) secret in `store` to a new file at `path`.
///
/// The file is created or truncated first, and each line is flushed as it
/// is written. The first listing or retrieval error aborts the export and
/// leaves the lines written so far in place.
///
/// Returns the number of lines written.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be created or written,
/// `Error::List` if a page cannot be listed and `Error::GetSecret` if a
/// value cannot be read.
pub fn export(store: &dyn SecretStore, app: Option<&str>, path: &Path) -> Result<usize> {
    let mut out = LineWriter::new(create(path)?);
    let mut count = 0;

    for page in Pages::new(store) {
        for name in page? {
            let Some(key) = env_key(&name, app) else {
                trace!(secret = %name, "skipping secret outside application prefix");
                continue;
            };

            let line = EnvLine {
                key,
                value: store.get_secret(&name)?,
            };
            writeln!(out, "{}", line)?;
            count += 1;
        }
    }

    out.flush()?;
    debug!(count, path = %path.display(), "wrote env file");
    Ok(count)
}

/// Create (or truncate) the output file, readable only by the owner on Unix.
fn create(path: &Path) -> std::io::Result<File> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;

        std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .mode(0o600)
            .open(path)
    }

    #[cfg(not(unix))]
    {
        File::create(path)
    }
}
