use thiserror::Error;

/// Custom error types for the slot-finder application
#[derive(Error, Debug)]
pub enum AppError {
    /// Error when an environment variable holds a value that cannot be used
    #[error("Invalid value for {name}: {reason}")]
    InvalidEnvVar { name: String, reason: String },

    /// Error when the pincode list is empty
    #[error("No pincodes to query")]
    NoPincodes,

    /// Error when a pincode is neither a number nor a numeric string
    #[error("Invalid pincode: {0}")]
    InvalidPincode(String),

    /// Wrapper for reqwest errors
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Wrapper for JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
