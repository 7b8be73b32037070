//! Error types used by this crate.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::data::AppId;

/// Error returned when a scan cannot be performed at all.
///
/// Failures local to a single manifest or library folder never surface as a [`ScanError`],
/// they are logged and skipped instead.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The install root is missing, is not a directory, or cannot be listed
    #[error("Invalid install root {path:?}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
}

/// Error returned when accessing a single field of a parsed KeyValues document.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The key exists, but holds a nested block where a string was expected (or vice versa)
    #[error("Field '{0}' has the wrong shape")]
    WrongShape(String),

    /// The value could not be parsed into the expected type
    #[error("Field '{key}' has an invalid value: {value:?}")]
    Invalid { key: String, value: String },
}

/// Error returned when a single manifest (or other KeyValues file) could not be parsed.
#[derive(Error, Debug)]
pub enum ManifestParseError {
    /// Error originating from [`io::Error`]
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Error originating from [`nom::Err`]
    #[error(transparent)]
    Nom(#[from] nom::Err<nom::error::Error<String>>),

    /// A required field is absent
    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    /// A field is present but its value cannot be used
    #[error("Malformed field '{field}': {reason}")]
    MalformedField { field: &'static str, reason: String },
}

impl From<nom::Err<nom::error::Error<&str>>> for ManifestParseError {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::Nom(err.map_input(Into::into))
    }
}

impl ManifestParseError {
    pub(crate) fn malformed(field: &'static str, err: FieldError) -> Self {
        Self::MalformedField {
            field,
            reason: err.to_string(),
        }
    }
}

/// Error for a library folder which has to be skipped during a scan.
#[derive(Error, Debug)]
pub enum LibraryFolderError {
    #[error("Library folder does not exist: {path:?}")]
    Missing { path: PathBuf },

    #[error("Library folder {path:?} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error returned by the settings store.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Error originating from [`io::Error`]
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The settings file exists but is not valid
    #[error("Settings file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Reason a launch could not be started.
#[derive(Error, Debug)]
pub enum LaunchCause {
    #[error("no installed title with this id")]
    UnknownTitle,

    #[error("could not start the Steam client: {0}")]
    Spawn(#[from] io::Error),
}

/// Error returned by the launcher invoker.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to launch {id}: {cause}")]
    LaunchFailed {
        id: AppId,
        #[source]
        cause: LaunchCause,
    },
}
