use thiserror::Error;

use crate::supabase::ApiError;

/// Uniform error value surfaced by the session store and the data adapters.
///
/// Input problems are caught locally as `Validation` before any request is
/// made; everything the backend or the transport reports arrives as `Api`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::InvalidResponse(err.to_string()))
    }
}
