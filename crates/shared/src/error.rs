//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// This is the coarse taxonomy the API layer maps domain errors onto.
/// The ledger core carries its own precise error enum; conversion to
/// `AppError` happens at the service boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (malformed input or invariant violated).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The entity's status forbids the requested operation.
    #[error("Illegal state transition: {0}")]
    IllegalStateTransition(String),

    /// Business rule violation (cross-entity constraint).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Conflict (e.g., duplicate entry number).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence or transaction failure.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::IllegalStateTransition(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::Infrastructure(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::IllegalStateTransition(_) => "ILLEGAL_STATE_TRANSITION",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Infrastructure(_) => "INFRASTRUCTURE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
