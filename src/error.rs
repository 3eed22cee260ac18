use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading data, running queries, or writing
/// outputs. No variant is retryable: a failed run is simply rerun.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("failed to load sales data from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("required column '{0}' is missing from the source file")]
    MissingColumn(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to write output to {path}: {reason}")]
    Output { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

impl AnalyticsError {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AnalyticsError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn output(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AnalyticsError::Output {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
