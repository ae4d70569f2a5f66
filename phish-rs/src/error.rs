//! Error types for phish-rs

use thiserror::Error;

/// Result type alias for phish-rs operations
pub type Result<T> = std::result::Result<T, PhishError>;

/// Phishing classifier error types
#[derive(Error, Debug)]
pub enum PhishError {
    /// No trained classifier is loaded
    #[error("Model not loaded. Please train the model first.")]
    ModelUnavailable,

    /// The classifier's labels are not exactly {phishing, legitimate}
    #[error("Label schema mismatch: {0}")]
    LabelSchemaMismatch(String),

    /// The classifier returned a probability outside [0, 1]
    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    /// Request rejected before reaching the classifier
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dataset could not be read or is unusable
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Model fitting failed
    #[error("Training error: {0}")]
    Training(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PhishError {
    /// Whether the caller may retry once an operator has acted (e.g. trained a model)
    pub fn is_retryable(&self) -> bool {
        matches!(self, PhishError::ModelUnavailable)
    }
}
