//! Error types for result export, loading and validation

use calibrateme_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while exporting, loading or validating results
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Missing input file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Malformed field `{field}` on line {line}: {value:?}")]
    MalformedField {
        field: String,
        line: usize,
        value: String,
    },

    #[error("Malformed CSV: {0}")]
    MalformedCsv(String),

    #[error("No summary row for {profile} / {scheduler}")]
    MissingRow { profile: String, scheduler: String },

    #[error("Duplicate summary rows for {profile} / {scheduler}")]
    DuplicateRow { profile: String, scheduler: String },

    #[error("Missing key in results document: {0}")]
    MissingKey(String),

    #[error("{field} = {value} out of range for {profile} / {scheduler}")]
    OutOfRange {
        field: String,
        profile: String,
        scheduler: String,
        value: f64,
    },

    #[error("Trajectory {series} for {key} has {actual} sessions, expected {expected}")]
    TrajectoryLength {
        key: String,
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Cannot aggregate {0}: no replications")]
    EmptyAggregate(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
