//! Error types for satkit
//!
//! This module defines all error types used throughout the workspace.
//! Non-fatal conditions are not errors; see [`Advisory`].

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Result type alias for satkit operations
pub type Result<T> = std::result::Result<T, SatkitError>;

/// Main error type for satkit operations
#[derive(Error, Debug)]
pub enum SatkitError {
    /// Date window resolution error
    #[error("Date window error: {0}")]
    Window(#[from] WindowError),

    /// Sample index error
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Instrument lifecycle error
    #[error("Instrument error: {0}")]
    Instrument(#[from] InstrumentError),

    /// Settings store error
    #[error("Parameters error: {0}")]
    Params(#[from] ParamsError),

    /// Dataset container error
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Remote archive error
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// Errors while resolving a date window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// Neither an explicit window nor a reference date was supplied
    #[error("No date window given and no reference date available to derive one")]
    MissingReferenceDate,

    /// Window stop precedes its start
    #[error("Window stop {stop} precedes start {start}")]
    Inverted { start: NaiveDate, stop: NaiveDate },

    /// Calendar offset left the representable date range
    #[error("Calendar offset out of range from {0}")]
    OutOfRange(NaiveDate),
}

/// Errors while building or corrupting a sample index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Filename does not start with a YYYY-MM-DD date
    #[error("Cannot read a YYYY-MM-DD date from filename: {0}")]
    FilenameDate(String),

    /// Textual sample count is not an integer
    #[error("Invalid sample count: {0}")]
    InvalidSampleCount(String),

    /// Frequency alias could not be parsed
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// First sample offset falls outside the day
    #[error("Start offset must be within [0, 86400) seconds: {0}")]
    InvalidStartOffset(String),

    /// Corruption needs at least `needed` samples
    #[error("Index too short to corrupt: need {needed} samples, have {available}")]
    TooShortToCorrupt { needed: usize, available: usize },
}

/// Errors raised by instrument lifecycle hooks or the host driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstrumentError {
    /// Tag is not supported by the module
    #[error("Unknown tag: {0:?}")]
    UnknownTag(String),

    /// Instrument id is not supported by the module
    #[error("Unknown inst_id: {0:?}")]
    UnknownInstId(String),

    /// Credentials are required for this tag
    #[error("Tests are not passing user and password to test instruments")]
    MissingCredentials,

    /// Loaded index contains duplicates
    #[error("Loaded data is not unique.")]
    IndexNotUnique,

    /// Loaded index is not sorted
    #[error("Loaded data is not monotonic.")]
    IndexNotMonotonic,

    /// Operation not provided by this module
    #[error("{operation} is not supported by {module}")]
    Unsupported { module: String, operation: String },

    /// A required directory was not supplied
    #[error("A directory must be passed to the loading routine for {0}")]
    MissingDataPath(String),

    /// Hook keyword could not be interpreted
    #[error("Invalid value {value:?} for keyword {key}")]
    InvalidKwarg { key: String, value: String },

    /// Qualification check failed
    #[error("Qualification failed for {module}: {reason}")]
    Qualification { module: String, reason: String },
}

/// Errors from the persisted settings store
#[derive(Error, Debug)]
pub enum ParamsError {
    /// No settings file under the root
    #[error("satkit is unable to locate a user settings file under {0}")]
    SettingsNotFound(String),

    /// One or more paths are not directories
    #[error("Paths {0:?} don't lead to a valid directory")]
    InvalidDirectory(Vec<String>),

    /// Parameter cannot be changed through the store
    #[error("The satkit instrument registry manages {0}; it cannot be set via parameters")]
    ReadOnly(String),

    /// Value has the wrong shape for the parameter
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Unknown parameter
    #[error("Unknown parameter: {0}")]
    UnknownKey(String),

    /// IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Dataset container errors
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Variable length does not match the time index
    #[error("Variable {name} has {actual} samples along time, index has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Dimension names do not match array rank
    #[error("Variable {name} has {dims} dimension names for a rank {rank} array")]
    RankMismatch { name: String, dims: usize, rank: usize },

    /// Missing variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors while talking to a remote archive
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Tag has no remote template
    #[error("Tag name unknown: {0:?}")]
    UnknownTag(String),

    /// Transfer failed with a server reply
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Local filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filename template is malformed
    #[error("Invalid filename template {template}: {reason}")]
    Template { template: String, reason: String },
}

/// A failed archive transfer, carrying the server reply code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code} {message}")]
pub struct TransferError {
    /// Three-digit reply code, e.g. `550`.
    pub code: String,
    /// Server message.
    pub message: String,
}

impl TransferError {
    /// Create a transfer error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Reply codes in the 550 class mean the file is absent.
    pub fn is_not_found(&self) -> bool {
        self.code.starts_with("550")
    }
}

/// A non-fatal condition reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Deprecated argument form was accepted and coerced
    Deprecated(String),
    /// Download is not supported for this configuration
    DownloadUnsupported(String),
    /// A remote file was not available for a date
    FileUnavailable(NaiveDate),
    /// Loaded index is not unique or not sorted, kept because the time check is lenient
    IrregularIndex(String),
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::Deprecated(msg) => write!(f, "deprecated: {}", msg),
            Advisory::DownloadUnsupported(msg) => write!(f, "download unsupported: {}", msg),
            Advisory::FileUnavailable(date) => {
                write!(f, "file not available for {}", date.format("%m/%d/%y"))
            }
            Advisory::IrregularIndex(msg) => write!(f, "irregular index: {}", msg),
        }
    }
}

impl Advisory {
    /// Log the advisory at warn level and return it.
    pub fn emit(self) -> Self {
        log::warn!("{}", self);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SatkitError::Instrument(InstrumentError::IndexNotUnique);
        let msg = format!("{}", err);
        assert!(msg.contains("Loaded data is not unique."));
    }

    #[test]
    fn test_error_conversion() {
        let window_err = WindowError::MissingReferenceDate;
        let err: SatkitError = window_err.into();
        assert!(matches!(err, SatkitError::Window(_)));
    }

    #[test]
    fn test_transfer_not_found() {
        assert!(TransferError::new("550", "No such file").is_not_found());
        assert!(TransferError::new("550-1", "Denied").is_not_found());
        assert!(!TransferError::new("530", "Not logged in").is_not_found());
        assert!(!TransferError::new("421", "Timeout").is_not_found());
    }

    #[test]
    fn test_invalid_directory_message() {
        let err = ParamsError::InvalidDirectory(vec!["/fake/directory/path".to_string()]);
        assert!(err.to_string().contains("don't lead to a valid"));
    }

    #[test]
    fn test_advisory_display() {
        let date = NaiveDate::from_ymd_opt(2009, 1, 2).unwrap();
        let advisory = Advisory::FileUnavailable(date);
        assert_eq!(advisory.to_string(), "file not available for 01/02/09");
    }
}
