//! Fliq billing client SDK.
//!
//! This crate provides the payment and credits clients for the Fliq platform:
//! runtime configuration loading, the plan catalog, payment-intent creation
//! and server-side verification, client-side card confirmation with Stripe,
//! and the credit ledger.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fliq_billing_client::{
//!     CardDetails, ClientOptions, FliqClient, StaticTokenProvider, StripeClient,
//! };
//!
//! # async fn example() -> Result<(), fliq_billing_client::ClientError> {
//! let client = FliqClient::with_options(
//!     Arc::new(StaticTokenProvider::new("user-session-token")),
//!     ClientOptions::default(),
//! );
//!
//! // Payment cannot proceed until runtime config is loaded.
//! let config = client.config().load().await?;
//! let stripe = StripeClient::new(&config.stripe.publishable_key);
//!
//! let plans = client.payments().fetch_plans().await;
//! let flow = client.purchase_flow(stripe);
//!
//! let card = CardDetails {
//!     number: "4242424242424242".into(),
//!     exp_month: 12,
//!     exp_year: 2030,
//!     cvc: "123".into(),
//!     billing_name: Some("Avery Student".into()),
//!     billing_email: None,
//! };
//! let result = flow.purchase_credits(&plans[0], &card).await?;
//! println!("purchased {} credits", result.credits_added);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod auth;
mod client;
mod config;
mod credits;
mod error;
mod http;
mod payment;
mod purchase;
mod retry;
mod stripe;
mod types;

pub use auth::{StaticTokenProvider, TokenProvider, Unauthenticated};
pub use client::{ClientOptions, FliqClient, DEFAULT_BASE_URL};
pub use config::{ApiConfig, ClientConfig, ConfigProvider, StripeConfig};
pub use credits::CreditsClient;
pub use error::ClientError;
pub use payment::PaymentsClient;
pub use purchase::{PurchaseFlow, PurchaseResult, PurchaseState};
pub use retry::{retry_if, retry_with_backoff, RetryPolicy};
pub use stripe::{CardDetails, PaymentIntent, PaymentIntentStatus, StripeClient};
pub use types::{
    Pagination, PaymentIntentResult, PaymentRecord, PlanSummary, VerifiedPayment,
};
