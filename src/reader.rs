//! UTF-8 file reading with notebook cleaning.

use crate::error::{Error, Result};
use crate::notebook::{clean_notebook, is_notebook};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{trace, warn};

/// Reads a file as UTF-8 text, cleaning notebooks on the way.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid UTF-8, or is a
/// notebook that fails to parse.
pub fn try_read_content(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::InvalidData {
            Error::invalid_utf8(path)
        } else {
            Error::io(path, e)
        }
    })?;

    if is_notebook(path) {
        trace!("Cleaning notebook: {}", path.display());
        return clean_notebook(&raw, path);
    }

    Ok(raw)
}

/// Reads a file's content, never failing.
///
/// Any read, decode or cleaning failure is reported as a warning naming the
/// path and yields an empty string, which counts as zero lines.
#[must_use]
pub fn read_content(path: &Path) -> String {
    match try_read_content(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            String::new()
        }
    }
}
