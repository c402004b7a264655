//! Payment API client.
//!
//! Talks to the backend's payment endpoints. The catalog read degrades to the
//! hardcoded default plans so browsing never blocks on a catalog outage; the
//! purchase-path calls (intent creation, verification) fail loudly and are
//! never retried here.

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use fliq_billing_core::{default_plans, PaymentIntentId, PaymentPlan, PlanId};

use crate::auth::TokenProvider;
use crate::error::ClientError;
use crate::http::decode_success;
use crate::retry::{retry_if, RetryPolicy};
use crate::types::{
    CreatePaymentIntentEnvelope, CreatePaymentIntentRequest, PaymentHistoryEnvelope,
    PaymentIntentResult, PaymentRecord, PlansEnvelope, VerifiedPayment, VerifyPaymentEnvelope,
    VerifyPaymentRequest,
};

/// Client for the backend payment endpoints.
pub struct PaymentsClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
}

impl PaymentsClient {
    /// Create a payments client.
    #[must_use]
    pub fn new(http: Client, base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy used for catalog reads.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the plan catalog.
    ///
    /// Transport and server failures are retried per the policy, then masked
    /// by the default catalog: this call resolves even when the backend is
    /// down. Malformed catalogs (unknown categories, broken invariants) also
    /// fall back rather than surfacing a partial list.
    pub async fn fetch_plans(&self) -> Vec<PaymentPlan> {
        let result = retry_if(
            &self.retry,
            || self.fetch_plans_once(),
            ClientError::is_retryable,
        )
        .await;

        match result {
            Ok(plans) => plans,
            Err(err) => {
                warn!(error = %err, "plan catalog fetch failed, serving default catalog");
                default_plans()
            }
        }
    }

    async fn fetch_plans_once(&self) -> Result<Vec<PaymentPlan>, ClientError> {
        let url = format!("{}/api/payment/plans", self.base_url);
        let response = self.http.get(&url).send().await?;
        let envelope: PlansEnvelope = decode_success("/api/payment/plans", response).await?;

        if !envelope.success {
            return Err(ClientError::Api {
                code: "plans_unavailable".to_string(),
                message: "plan catalog endpoint reported failure".to_string(),
                status: 200,
            });
        }

        envelope
            .plans
            .into_iter()
            .map(crate::types::WirePlan::into_plan)
            .collect()
    }

    /// Create a payment intent for `plan_id`.
    ///
    /// Requires an authenticated user. Every call creates a fresh intent;
    /// deduplication of repeated attempts is the backend's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] with no signed-in user, and
    /// backend/transport failures otherwise.
    pub async fn create_payment_intent(
        &self,
        plan_id: &PlanId,
    ) -> Result<PaymentIntentResult, ClientError> {
        let token = self.tokens.require_token().await?;
        let url = format!("{}/api/payment/create-payment-intent", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&CreatePaymentIntentRequest { plan_id })
            .send()
            .await?;

        let envelope: CreatePaymentIntentEnvelope =
            decode_success("/api/payment/create-payment-intent", response).await?;

        if !envelope.success {
            return Err(ClientError::Api {
                code: "create_intent_failed".to_string(),
                message: "backend refused to create a payment intent".to_string(),
                status: 200,
            });
        }

        info!(plan_id = %plan_id, "created payment intent");
        Ok(PaymentIntentResult {
            client_secret: envelope.client_secret,
            plan: envelope.plan,
        })
    }

    /// Verify a confirmed payment server-side.
    ///
    /// This is the authoritative step that credits the account. Client-side
    /// confirmation alone grants nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] with no signed-in user, and
    /// backend/transport failures otherwise.
    pub async fn verify_payment(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> Result<VerifiedPayment, ClientError> {
        let token = self.tokens.require_token().await?;
        let url = format!("{}/api/payment/verify-payment", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&VerifyPaymentRequest {
                payment_intent_id: payment_intent_id.as_str(),
            })
            .send()
            .await?;

        let envelope: VerifyPaymentEnvelope =
            decode_success("/api/payment/verify-payment", response).await?;

        if !envelope.success {
            return Err(ClientError::Api {
                code: "verification_failed".to_string(),
                message: "backend did not verify the payment".to_string(),
                status: 200,
            });
        }

        info!(
            payment_intent_id = %payment_intent_id,
            credits_added = envelope.credits_added,
            "payment verified"
        );
        Ok(VerifiedPayment {
            message: envelope.message,
            credits_added: envelope.credits_added,
            plan: envelope.plan,
        })
    }

    /// Fetch the user's past payments.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] with no signed-in user, and
    /// backend/transport failures otherwise.
    pub async fn payment_history(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<PaymentRecord>, ClientError> {
        let token = self.tokens.require_token().await?;
        let url = format!("{}/api/payment/history", self.base_url);

        let mut request = self.http.get(&url).bearer_auth(token);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }

        let response = request.send().await?;
        let envelope: PaymentHistoryEnvelope =
            decode_success("/api/payment/history", response).await?;

        if !envelope.success {
            return Err(ClientError::Api {
                code: "history_unavailable".to_string(),
                message: "payment history endpoint reported failure".to_string(),
                status: 200,
            });
        }

        Ok(envelope.payments)
    }
}
