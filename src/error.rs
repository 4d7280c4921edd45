//! Error types for the import pipeline.
//!
//! Every variant except the store rejection is raised before or while a
//! row is normalized; all of them abort the run.

use thiserror::Error;

/// Failure reported by a [`crate::store::PointStore`] when a batch is not
/// accepted.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("InfluxDB error: {0}")]
    Influx(#[from] influxdb::Error),

    #[error("write rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot parse timestamp '{value}' with format '{format}': {reason}")]
    Timestamp {
        value: String,
        format: String,
        reason: String,
    },

    #[error("Timestamp '{value}' is before the Unix epoch or out of range")]
    TimestampOutOfRange { value: String },

    #[error("Column '{column}' not found in input")]
    MissingColumn { column: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database setup failed: {0}")]
    DatabaseSetup(#[from] StoreError),

    #[error("Problem inserting {attempted} points: {source}")]
    WriteRejected {
        attempted: usize,
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    pub fn config(message: impl Into<String>) -> Self {
        ImportError::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
