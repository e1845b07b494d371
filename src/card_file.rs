use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::model::CardInput;

/// Errors that can occur when loading a card file
#[derive(Debug, Error)]
pub enum CardFileError {
    #[error("{path}: failed to read card file: {source}")]
    Io { path: String, source: io::Error },

    #[error("{path}: failed to parse card file: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Read card fields from a JSON file.
///
/// Missing fields are left empty so the validator reports them.
pub fn read_card(path: impl AsRef<Path>) -> Result<CardInput, CardFileError> {
    let path = path.as_ref();
    let display = || path.display().to_string();

    let content = fs::read_to_string(path).map_err(|source| CardFileError::Io {
        path: display(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CardFileError::Parse {
        path: display(),
        source,
    })
}
