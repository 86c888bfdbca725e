//! Error types for influxdb-sync.

use thiserror::Error;

/// Error type for influxdb-sync operations.
///
/// Server-originated variants carry the raw `error` message string from the
/// InfluxDB response body whenever the server supplied one.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid client configuration: malformed connection URI, unsupported
    /// scheme, missing database name, or an unknown precision/epoch unit.
    /// Raised before any network I/O.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A measurement that cannot be encoded (empty name or no fields).
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// Write input that cannot be expanded into measurements.
    #[error("Invalid write input: {0}")]
    InvalidInput(String),

    /// HTTP transport failure, including request timeouts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to decode a response body as JSON.
    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    /// The server rejected a write.
    #[error("Write failed: {message}")]
    WriteFailed {
        /// Error message returned by InfluxDB.
        message: String,
    },

    /// The server rejected a query, e.g. one with invalid syntax.
    #[error("Query failed: {message}")]
    QueryFailed {
        /// Error message returned by InfluxDB.
        message: String,
    },

    /// Write targeted a database that does not exist.
    #[error("Database not found: {message}")]
    DatabaseNotFound {
        /// Error message returned by InfluxDB.
        message: String,
    },

    /// The supplied credentials were rejected.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message returned by InfluxDB.
        message: String,
    },

    /// The credentials are valid but do not permit this action.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message returned by InfluxDB.
        message: String,
    },
}

/// Result type alias for influxdb-sync operations.
pub type Result<T> = std::result::Result<T, Error>;
