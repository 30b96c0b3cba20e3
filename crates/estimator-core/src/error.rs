//! Error types for the estimator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The extraction backend answered, but not with a usable JSON object
    #[error("Extraction failed: {message}")]
    Extraction { message: String, raw: String },

    #[error("AI backend unavailable: {0}")]
    BackendUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
