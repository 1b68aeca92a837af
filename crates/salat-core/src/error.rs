//! Core error types for salat-core.
//!
//! Every fallible operation in the library returns [`CoreError`] (through the
//! [`Result`] alias) or one of the narrower error enums below.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for salat-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Prayer times could not be evaluated for the requested day
    #[error("Cannot evaluate prayer times: {0}")]
    Calculation(#[from] CalculationError),

    /// Reminder presentation errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required field absent
    #[error("Missing required field '{0}'")]
    Missing(String),

    /// Numeric value outside its allowed range
    #[error("Value {value} for '{field}' is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Failures to produce a day's canonical instants.
///
/// Callers must treat any of these as "cannot evaluate this day"; no default
/// time window is ever substituted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    /// The astronomical service itself reported a failure
    #[error("astronomy service '{service}' failed for {date}: {message}")]
    ServiceFailed {
        service: String,
        date: chrono::NaiveDate,
        message: String,
    },

    /// The service returned instants that are not in canonical order
    #[error("astronomy service returned out-of-order instants for {date}: {detail}")]
    UnorderedOutput {
        date: chrono::NaiveDate,
        detail: String,
    },

    /// A local wall-clock time does not exist (or is ambiguous) in the zone
    #[error("local time {time} on {date} cannot be resolved in {timezone}")]
    UnresolvableLocalTime {
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
        timezone: String,
    },
}

/// Reminder presentation errors, raised by a notification sink.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// Permission to present notifications is not granted
    #[error("notification permission not granted")]
    PermissionDenied,

    /// The platform rejected the notification
    #[error("failed to present notification '{id}': {message}")]
    PresentationFailed { id: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
