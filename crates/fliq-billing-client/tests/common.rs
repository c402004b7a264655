//! Common test utilities for client integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::MockServer;

use fliq_billing_client::{
    CreditsClient, PaymentsClient, PurchaseFlow, RetryPolicy, StaticTokenProvider, StripeClient,
    TokenProvider, Unauthenticated,
};

/// Bearer token the test harness authenticates with.
pub const TEST_TOKEN: &str = "test-session-token";

/// Test harness with mock backend and Stripe servers.
pub struct TestHarness {
    /// Mock Fliq backend.
    pub backend: MockServer,
    /// Mock Stripe API.
    pub stripe: MockServer,
    /// Payments client pointed at the mock backend.
    pub payments: Arc<PaymentsClient>,
    /// Credits client pointed at the mock backend.
    pub credits: Arc<CreditsClient>,
    /// Stripe client pointed at the mock Stripe server.
    pub stripe_client: StripeClient,
}

impl TestHarness {
    /// Harness with an authenticated session.
    pub async fn new() -> Self {
        Self::build(Arc::new(StaticTokenProvider::new(TEST_TOKEN))).await
    }

    /// Harness with no signed-in user.
    pub async fn unauthenticated() -> Self {
        Self::build(Arc::new(Unauthenticated)).await
    }

    async fn build(tokens: Arc<dyn TokenProvider>) -> Self {
        let backend = MockServer::start().await;
        let stripe = MockServer::start().await;
        let http = reqwest::Client::new();

        // Keep retries fast and deterministic in tests.
        let payments = Arc::new(
            PaymentsClient::new(http.clone(), backend.uri(), Arc::clone(&tokens))
                .with_retry_policy(fast_retry(0)),
        );
        let credits = Arc::new(CreditsClient::new(http, backend.uri(), tokens));
        let stripe_client = StripeClient::with_base_url("pk_test_harness", stripe.uri());

        Self {
            backend,
            stripe,
            payments,
            credits,
            stripe_client,
        }
    }

    /// Build a purchase flow over the harness clients.
    pub fn flow(&self) -> PurchaseFlow {
        PurchaseFlow::new(
            Arc::clone(&self.payments),
            Arc::clone(&self.credits),
            self.stripe_client.clone(),
        )
    }

    /// The authorization header value the backend mocks should expect.
    pub fn auth_header() -> String {
        format!("Bearer {TEST_TOKEN}")
    }
}

/// A retry policy with millisecond delays for tests.
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(
        max_retries,
        Duration::from_millis(1),
        Duration::from_millis(20),
    )
}

/// Generate a unique payment-intent id.
pub fn fresh_intent_id() -> String {
    format!("pi_{}", uuid::Uuid::new_v4().simple())
}

/// Client secret for an intent id, in Stripe's `pi_..._secret_...` format.
pub fn client_secret_for(intent_id: &str) -> String {
    format!("{intent_id}_secret_test")
}

/// A combo-plan catalog entry as the backend sends it.
pub fn wire_plan_json() -> serde_json::Value {
    json!({
        "id": "combo-standard",
        "credits": 100,
        "price": 2499,
        "name": "Combo Pack",
        "category": "combo_package",
        "profilesUnlocked": 10,
        "revisionsUnlocked": 5,
        "popular": true,
    })
}

/// The plan echo attached to intent and verification responses.
pub fn plan_summary_json() -> serde_json::Value {
    json!({
        "id": "combo-standard",
        "credits": 100,
        "price": 2499,
        "name": "Combo Pack",
        "priceFormatted": "$24.99",
    })
}

/// A Stripe payment-intent payload with the given status.
pub fn stripe_intent_json(intent_id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": intent_id,
        "amount": 2499,
        "currency": "usd",
        "status": status,
        "created": 1_730_000_000,
    })
}

/// Test card accepted by the mock Stripe server.
pub fn test_card() -> fliq_billing_client::CardDetails {
    fliq_billing_client::CardDetails {
        number: "4242424242424242".to_string(),
        exp_month: 12,
        exp_year: 2030,
        cvc: "123".to_string(),
        billing_name: Some("Avery Student".to_string()),
        billing_email: None,
    }
}
