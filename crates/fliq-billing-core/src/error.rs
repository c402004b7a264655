//! Error types for the billing core.

use crate::ids::IdError;

/// Result type for billing-core operations.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors raised by the core billing types.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// A plan violates a catalog invariant.
    #[error("invalid plan {plan_id}: {reason}")]
    InvalidPlan {
        /// The offending plan identifier.
        plan_id: String,
        /// Which invariant was violated.
        reason: String,
    },

    /// An amount is out of range for the operation.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The backend sent a package category this client does not know.
    #[error("unknown package category: {category}")]
    UnknownCategory {
        /// The raw category string from the backend.
        category: String,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}
