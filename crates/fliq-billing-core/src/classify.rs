//! Error classification.
//!
//! Every failure surfaced to a caller passes through this module so a stable,
//! user-facing message is always available. Classification is a total mapping:
//! it never fails and always lands on a category, a severity, and a message.
//!
//! Two views exist because two layers need them:
//!
//! - [`ErrorCategory`] classifies by *source* (network, auth, Stripe, ...) and
//!   drives logging severity and user messaging.
//! - [`StatusClass`] classifies raw HTTP statuses and drives the
//!   retry-eligibility policy ([`retryable`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source-level error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Transport failure: DNS, connect, timeout, reset.
    Network,
    /// Missing, expired, or rejected credentials.
    Authentication,
    /// The client cannot operate: missing keys, bad runtime config.
    Configuration,
    /// The backend accepted the connection but returned an error.
    Api,
    /// Stripe rejected or failed the payment operation.
    Stripe,
    /// Malformed input or a response that failed schema validation.
    Validation,
    /// Anything that matched no other rule.
    Unknown,
}

impl ErrorCategory {
    /// Wire-format string for this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Authentication => "authentication",
            Self::Configuration => "configuration",
            Self::Api => "api",
            Self::Stripe => "stripe",
            Self::Validation => "validation",
            Self::Unknown => "unknown",
        }
    }

    /// Default severity for this category.
    ///
    /// `status` raises network/API failures to [`Severity::High`] when the
    /// server itself is failing (5xx).
    #[must_use]
    pub fn base_severity(&self, status: Option<u16>) -> Severity {
        let server_side = status.is_some_and(|s| (500..600).contains(&s));
        match self {
            Self::Network | Self::Api => {
                if server_side {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            Self::Authentication | Self::Stripe => Severity::High,
            Self::Configuration => Severity::Critical,
            Self::Validation | Self::Unknown => Severity::Medium,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently an error needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic or expected; no action needed.
    Low,
    /// Degraded but recoverable by the user.
    Medium,
    /// The operation failed and needs user or operator attention.
    High,
    /// The client cannot function; reported to the error service.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A normalized error record derived from any failure.
///
/// Not persisted; built on the fly at logging and reporting boundaries.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedError {
    /// Source category.
    pub category: ErrorCategory,
    /// Severity of this occurrence.
    pub severity: Severity,
    /// Machine-readable code, when one exists (Stripe code, HTTP status, ...).
    pub code: Option<String>,
    /// The underlying error message, for logs.
    pub message: String,
    /// Stable, human-readable message safe to show to the user.
    pub user_message: String,
    /// When the error was classified.
    pub timestamp: DateTime<Utc>,
    /// Free-form context attached at the throw site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ClassifiedError {
    /// Build a classified error with the category's default severity.
    #[must_use]
    pub fn new(category: ErrorCategory, code: Option<String>, message: impl Into<String>) -> Self {
        let status = code.as_deref().and_then(|c| c.parse::<u16>().ok());
        let severity = category.base_severity(status);
        Self::with_severity(category, severity, code, message)
    }

    /// Build a classified error with an explicit severity.
    #[must_use]
    pub fn with_severity(
        category: ErrorCategory,
        severity: Severity,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        let user_message = user_message(category, code.as_deref()).to_string();
        Self {
            category,
            severity,
            code,
            message: message.into(),
            user_message,
            timestamp: Utc::now(),
            context: None,
        }
    }

    /// Attach throw-site context.
    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.category, self.severity, self.message)
    }
}

/// Classify an untyped error message by substring heuristics.
///
/// Used for errors that reach the boundary without a typed source. Matching is
/// case-insensitive; anything unrecognized lands on [`ErrorCategory::Unknown`].
#[must_use]
pub fn classify_message(message: &str) -> ClassifiedError {
    let lower = message.to_lowercase();

    let category = if lower.contains("fetch")
        || lower.contains("network")
        || lower.contains("connection")
        || lower.contains("timed out")
        || lower.contains("timeout")
    {
        ErrorCategory::Network
    } else if lower.contains("auth") || lower.contains("token") || lower.contains("credential") {
        ErrorCategory::Authentication
    } else {
        ErrorCategory::Unknown
    };

    ClassifiedError::new(category, None, message)
}

/// Stable user-facing message for a category and optional code.
///
/// Total: every category has a default, code-specific overrides refine it.
#[must_use]
pub fn user_message(category: ErrorCategory, code: Option<&str>) -> &'static str {
    if let Some(message) = code.and_then(code_message) {
        return message;
    }

    match category {
        ErrorCategory::Network => {
            "We couldn't reach the server. Check your connection and try again."
        }
        ErrorCategory::Authentication => "Your session has expired. Please sign in again.",
        ErrorCategory::Configuration => {
            "The app isn't configured correctly. Please try again later."
        }
        ErrorCategory::Api => "Something went wrong on our end. Please try again.",
        ErrorCategory::Stripe => "Your payment could not be processed. Please try again.",
        ErrorCategory::Validation => "Some of the information provided looks invalid.",
        ErrorCategory::Unknown => "Something unexpected went wrong. Please try again.",
    }
}

/// Code-specific user messages: Stripe decline codes, auth codes, HTTP statuses.
fn code_message(code: &str) -> Option<&'static str> {
    let message = match code {
        // Stripe card codes
        "card_declined" => "Your card was declined. Try a different payment method.",
        "insufficient_funds" => "Your card has insufficient funds.",
        "expired_card" => "Your card has expired. Please use a different card.",
        "incorrect_cvc" => "The security code you entered is incorrect.",
        // Auth provider codes
        "auth/wrong-password" => "Incorrect email or password.",
        "auth/user-not-found" => "No account exists for that email address.",
        "auth/too-many-requests" => "Too many attempts. Please wait a moment and try again.",
        // HTTP statuses
        "401" => "Your session has expired. Please sign in again.",
        "403" => "You don't have permission to do that.",
        "404" => "We couldn't find what you were looking for.",
        "500" | "502" | "503" | "504" => {
            "Our servers are having trouble right now. Please try again shortly."
        }
        _ => return None,
    };
    Some(message)
}

/// HTTP-status classification used by the retry policy.
///
/// Exactly six classes; `None` (no response at all) is a network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// No HTTP response was received.
    Network,
    /// 401: credentials missing or expired.
    Authentication,
    /// 403: authenticated but not allowed.
    Authorization,
    /// Client-side request problems (400, 404, 409, 422, 429).
    Validation,
    /// 5xx: the server failed.
    Server,
    /// A status outside the known mapping.
    Unknown,
}

/// Classify an HTTP status. `None` means the request never got a response.
#[must_use]
pub fn classify_status(status: Option<u16>) -> StatusClass {
    match status {
        None => StatusClass::Network,
        Some(401) => StatusClass::Authentication,
        Some(403) => StatusClass::Authorization,
        Some(400 | 404 | 409 | 422 | 429) => StatusClass::Validation,
        Some(s) if (500..600).contains(&s) => StatusClass::Server,
        Some(_) => StatusClass::Unknown,
    }
}

/// Retry-eligibility policy: retry only when no response arrived or the
/// server failed. 4xx responses are the caller's fault and never retried.
#[must_use]
pub fn retryable(status: Option<u16>) -> bool {
    match status {
        None => true,
        Some(s) => (500..600).contains(&s),
    }
}

/// Pluggable sink for classified errors.
pub trait ErrorLogger: Send + Sync {
    /// Record a classified error.
    fn log(&self, error: &ClassifiedError);
}

/// Default logger: forwards to `tracing` at a level matching the severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log(&self, error: &ClassifiedError) {
        match error.severity {
            Severity::Low => tracing::debug!(
                category = %error.category,
                code = error.code.as_deref(),
                "{}", error.message
            ),
            Severity::Medium => tracing::warn!(
                category = %error.category,
                code = error.code.as_deref(),
                "{}", error.message
            ),
            Severity::High | Severity::Critical => tracing::error!(
                category = %error.category,
                severity = %error.severity,
                code = error.code.as_deref(),
                "{}", error.message
            ),
        }
    }
}

/// Destination for critical errors (an external error-reporting service).
#[async_trait::async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Forward a critical error. Failures are the handler's to swallow.
    async fn report(&self, error: &ClassifiedError) -> Result<(), String>;
}

/// Reporter that drops everything. The default until a real service is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

#[async_trait::async_trait]
impl ErrorReporter for NoopReporter {
    async fn report(&self, _error: &ClassifiedError) -> Result<(), String> {
        Ok(())
    }
}

/// Logs every classified error and forwards critical ones to the reporter.
pub struct ErrorHandler {
    logger: Box<dyn ErrorLogger>,
    reporter: Box<dyn ErrorReporter>,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self {
            logger: Box::new(TracingLogger),
            reporter: Box::new(NoopReporter),
        }
    }
}

impl ErrorHandler {
    /// Build a handler with a custom logger and reporter.
    #[must_use]
    pub fn new(logger: Box<dyn ErrorLogger>, reporter: Box<dyn ErrorReporter>) -> Self {
        Self { logger, reporter }
    }

    /// Log the error; report it when critical. Never fails.
    pub async fn handle(&self, error: &ClassifiedError) {
        self.logger.log(error);

        if error.severity == Severity::Critical {
            if let Err(report_err) = self.reporter.report(error).await {
                tracing::warn!(error = %report_err, "failed to report critical error");
            }
        }
    }
}
