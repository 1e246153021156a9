//! Error types for store actions

use femsq_client::ApiError;
use thiserror::Error;

/// Result type for store actions
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store action error
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Request to the FEMSQ API failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Argument rejected before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    /// Underlying API error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            StoreError::Api(err) => Some(err),
            StoreError::InvalidInput(_) => None,
        }
    }
}
