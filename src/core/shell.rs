//! Shell rc file updates.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::constants::RC_FILES;
use crate::error::Result;

/// Append `line` to `path` if the file exists.
///
/// A missing file is not an error. Returns whether the line was written.
///
/// # Errors
///
/// Returns `Error::Io` if an existing file cannot be opened or written.
pub fn append_line_if_exists(path: &Path, line: &str) -> Result<bool> {
    if !path.exists() {
        debug!(path = %path.display(), "rc file not present");
        return Ok(false);
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    writeln!(file, "{}", line)?;
    file.flush()?;

    debug!(path = %path.display(), "appended line");
    Ok(true)
}

/// The rc files kvenv updates, under `home`.
pub fn rc_files(home: &Path) -> Vec<PathBuf> {
    RC_FILES.iter().map(|name| home.join(name)).collect()
}
