//! Client error types.

use fliq_billing_core::{retryable, ClassifiedError, ErrorCategory, Severity};

use crate::stripe::PaymentIntentStatus;

/// Errors that can occur when using the Fliq billing client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed before a usable response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Backend error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The operation requires an authenticated user.
    #[error("authentication required: {0}")]
    Authentication(String),

    /// The client is missing configuration it needs to operate.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Stripe rejected or failed the payment operation.
    #[error("Stripe error: {message}")]
    Stripe {
        /// Stripe error code (e.g. `card_declined`).
        code: Option<String>,
        /// Stripe-supplied message.
        message: String,
    },

    /// Card confirmation finished in a non-success state.
    #[error("payment not completed successfully (status: {status})")]
    PaymentIncomplete {
        /// The terminal payment-intent status Stripe reported.
        status: PaymentIntentStatus,
    },

    /// A response failed schema validation.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        /// The endpoint whose response was malformed.
        endpoint: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid input supplied by the caller.
    #[error("validation error: {0}")]
    Validation(String),

    /// A purchase attempt is already in flight.
    #[error("a purchase is already in progress")]
    PurchaseInFlight,
}

impl ClientError {
    /// Whether this failure is eligible for a retry.
    ///
    /// Follows the platform policy: retry only when no response arrived or
    /// the server failed (5xx). Everything else is the caller's to fix.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => retryable(err.status().map(|s| s.as_u16())),
            Self::Api { status, .. } => retryable(Some(*status)),
            _ => false,
        }
    }

    /// Normalize this error into a [`ClassifiedError`] with a user message.
    #[must_use]
    pub fn classify(&self) -> ClassifiedError {
        match self {
            Self::Http(err) => ClassifiedError::new(
                ErrorCategory::Network,
                err.status().map(|s| s.as_u16().to_string()),
                self.to_string(),
            ),
            Self::Api { status, .. } => ClassifiedError::new(
                ErrorCategory::Api,
                Some(status.to_string()),
                self.to_string(),
            ),
            Self::Authentication(_) => {
                ClassifiedError::new(ErrorCategory::Authentication, None, self.to_string())
            }
            Self::Configuration(_) => {
                ClassifiedError::new(ErrorCategory::Configuration, None, self.to_string())
            }
            Self::Stripe { code, .. } => {
                ClassifiedError::new(ErrorCategory::Stripe, code.clone(), self.to_string())
            }
            Self::PaymentIncomplete { status } => ClassifiedError::with_severity(
                ErrorCategory::Stripe,
                Severity::Medium,
                Some(status.as_str().to_string()),
                self.to_string(),
            ),
            Self::Decode { .. } | Self::Validation(_) => {
                ClassifiedError::new(ErrorCategory::Validation, None, self.to_string())
            }
            Self::PurchaseInFlight => ClassifiedError::with_severity(
                ErrorCategory::Validation,
                Severity::Low,
                None,
                self.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> ClientError {
        ClientError::Api {
            code: "request_failed".into(),
            message: "boom".into(),
            status,
        }
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(api_error(500).is_retryable());
        assert!(api_error(503).is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!api_error(400).is_retryable());
        assert!(!api_error(401).is_retryable());
        assert!(!api_error(404).is_retryable());
        assert!(!api_error(429).is_retryable());
    }

    #[test]
    fn payment_and_validation_failures_are_never_retryable() {
        let stripe = ClientError::Stripe {
            code: Some("card_declined".into()),
            message: "Your card was declined.".into(),
        };
        assert!(!stripe.is_retryable());
        assert!(!ClientError::Validation("bad input".into()).is_retryable());
        assert!(!ClientError::PurchaseInFlight.is_retryable());
        assert!(!ClientError::PaymentIncomplete {
            status: PaymentIntentStatus::RequiresAction,
        }
        .is_retryable());
    }

    #[test]
    fn classify_maps_variants_to_categories() {
        assert_eq!(api_error(500).classify().category, ErrorCategory::Api);
        assert_eq!(
            ClientError::Authentication("no session".into())
                .classify()
                .category,
            ErrorCategory::Authentication
        );
        assert_eq!(
            ClientError::Configuration("missing key".into())
                .classify()
                .category,
            ErrorCategory::Configuration
        );
        assert_eq!(
            ClientError::Validation("bad".into()).classify().category,
            ErrorCategory::Validation
        );
    }

    #[test]
    fn classify_carries_stripe_code_into_user_message() {
        let err = ClientError::Stripe {
            code: Some("card_declined".into()),
            message: "Your card was declined.".into(),
        };
        let classified = err.classify();
        assert_eq!(classified.category, ErrorCategory::Stripe);
        assert_eq!(classified.severity, Severity::High);
        assert!(classified.user_message.contains("declined"));
    }

    #[test]
    fn classify_raises_severity_for_server_statuses() {
        assert_eq!(api_error(503).classify().severity, Severity::High);
        assert_eq!(api_error(404).classify().severity, Severity::Medium);
    }

    #[test]
    fn configuration_errors_classify_critical() {
        let classified = ClientError::Configuration("missing publishable key".into()).classify();
        assert_eq!(classified.severity, Severity::Critical);
    }
}
