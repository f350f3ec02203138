//! Error types for the simulation engine

use thiserror::Error;

/// Errors raised while configuring or running simulations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown learner profile: {0}")]
    UnknownProfile(String),

    #[error("Unknown scheduler type: {0}")]
    UnknownScheduler(String),

    #[error("Invalid simulation configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
