//! Error types for figure rendering

use calibrateme_metrics::MetricsError;
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors raised while rendering figures or the HTML report
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Plot backend error: {0}")]
    BackendError(String),

    #[error("Invalid plot configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for VizError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        VizError::BackendError(e.to_string())
    }
}
