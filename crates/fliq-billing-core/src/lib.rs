//! Core types for the Fliq billing platform.
//!
//! This crate provides the foundational types used by the Fliq payment and
//! credits clients:
//!
//! - **Identifiers**: [`PlanId`], [`PaymentIntentId`], [`TransactionId`]
//! - **Plans**: [`PaymentPlan`], [`PackageType`], the [`default_plans`] fallback catalog
//! - **Credits**: [`CreditBalance`], [`CreditTransaction`], [`TransactionType`]
//! - **Classification**: [`ClassifiedError`], [`ErrorCategory`], [`Severity`],
//!   the HTTP [`StatusClass`] mapping and [`retryable`] policy
//!
//! # Credits
//!
//! Credits are integer counts owned by the backend. The client caches a
//! [`CreditBalance`] snapshot but never computes a balance itself: every
//! mutation takes the server's returned balance as truth.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod classify;
pub mod credits;
pub mod error;
pub mod ids;
pub mod plan;

pub use classify::{
    classify_message, classify_status, retryable, user_message, ClassifiedError, ErrorCategory,
    ErrorHandler, ErrorLogger, ErrorReporter, NoopReporter, Severity, StatusClass, TracingLogger,
};
pub use credits::{
    CreditBalance, CreditTransaction, TransactionType, BALANCE_REFRESH_INTERVAL,
};
pub use error::{BillingError, Result};
pub use ids::{IdError, PaymentIntentId, PlanId, TransactionId};
pub use plan::{default_plans, PackageType, PaymentPlan};
