use thiserror::Error;

use crate::api::ApiError;
use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Remote(#[from] ApiError),

    #[error("Data has not been loaded yet")]
    NotLoaded,
}

impl StoreError {
    /// True when the failure was detected locally and nothing was sent.
    pub fn is_local(&self) -> bool {
        !matches!(self, StoreError::Remote(_))
    }

    /// One-line message for the user. All failures are reported the same
    /// way regardless of where they came from.
    pub fn user_message(&self) -> String {
        format!("Action failed: {}", self)
    }
}
