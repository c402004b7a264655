//! Stripe card-confirmation client.
//!
//! Confirms payment intents created by the backend, using the publishable key
//! and the intent's client secret the way Stripe's browser SDK does. The
//! backend remains the only holder of the secret key; this client can only
//! act on intents it has been handed a client secret for.

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::ClientError;

/// Stripe API base URL.
const STRIPE_BASE_URL: &str = "https://api.stripe.com/v1";

/// Card details collected from the billing form.
#[derive(Debug, Clone)]
pub struct CardDetails {
    /// Card number, digits only.
    pub number: String,
    /// Expiry month (1-12).
    pub exp_month: u32,
    /// Expiry year, four digits.
    pub exp_year: u32,
    /// Card security code.
    pub cvc: String,
    /// Cardholder name, when collected.
    pub billing_name: Option<String>,
    /// Billing email, when collected.
    pub billing_email: Option<String>,
}

/// Status of a Stripe payment intent.
///
/// The intent moves through Stripe's own state machine; this client only
/// treats [`Succeeded`](Self::Succeeded) as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    /// Awaiting a payment method.
    RequiresPaymentMethod,
    /// Payment method attached, awaiting confirmation.
    RequiresConfirmation,
    /// Further customer action needed (e.g. 3-D Secure).
    RequiresAction,
    /// Stripe is processing the payment.
    Processing,
    /// Authorized, awaiting capture.
    RequiresCapture,
    /// The intent was canceled.
    Canceled,
    /// The payment completed.
    Succeeded,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    /// Wire-format string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Stripe payment intent as returned by the confirm and retrieve calls.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Payment intent ID (`pi_...`).
    pub id: String,
    /// Amount in minor currency units.
    #[serde(default)]
    pub amount: i64,
    /// Currency (e.g. "usd").
    #[serde(default)]
    pub currency: String,
    /// Current status.
    pub status: PaymentIntentStatus,
    /// Created timestamp (Unix).
    #[serde(default)]
    pub created: i64,
    /// Description, when set by the backend.
    #[serde(default)]
    pub description: Option<String>,
}

/// Stripe API error response.
#[derive(Debug, Clone, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorDetail,
}

/// Stripe error detail.
#[derive(Debug, Clone, Deserialize)]
struct StripeErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Client-side Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    base_url: String,
    publishable_key: String,
}

impl StripeClient {
    /// Create a new Stripe client from a publishable key (`pk_test_...` or
    /// `pk_live_...`).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn new(publishable_key: impl Into<String>) -> Self {
        Self::with_base_url(publishable_key, STRIPE_BASE_URL)
    }

    /// Create a client that talks to a custom base URL (used by tests).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn with_base_url(publishable_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            publishable_key: publishable_key.into(),
        }
    }

    /// Confirm a payment intent with card details.
    ///
    /// The intent ID is derived from the client secret
    /// (`pi_..._secret_...`). Only the returned intent's status tells whether
    /// the payment went through; [`PaymentIntentStatus::Succeeded`] is the
    /// sole success state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a malformed client secret,
    /// [`ClientError::Stripe`] when Stripe rejects the confirmation, and
    /// transport errors as [`ClientError::Http`].
    pub async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card: &CardDetails,
    ) -> Result<PaymentIntent, ClientError> {
        let intent_id = intent_id_from_secret(client_secret)?;
        let url = format!("{}/payment_intents/{intent_id}/confirm", self.base_url);

        let mut params = vec![
            ("key", self.publishable_key.clone()),
            ("client_secret", client_secret.to_string()),
            ("payment_method_data[type]", "card".to_string()),
            ("payment_method_data[card][number]", card.number.clone()),
            (
                "payment_method_data[card][exp_month]",
                card.exp_month.to_string(),
            ),
            (
                "payment_method_data[card][exp_year]",
                card.exp_year.to_string(),
            ),
            ("payment_method_data[card][cvc]", card.cvc.clone()),
        ];

        if let Some(name) = &card.billing_name {
            params.push((
                "payment_method_data[billing_details][name]",
                name.clone(),
            ));
        }
        if let Some(email) = &card.billing_email {
            params.push((
                "payment_method_data[billing_details][email]",
                email.clone(),
            ));
        }

        tracing::debug!(intent_id = %intent_id, "confirming card payment");

        let response = self.client.post(&url).form(&params).send().await?;
        self.handle_response(response).await
    }

    /// Retrieve a payment intent's current state by its client secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Stripe returns an error.
    pub async fn get_payment_intent(
        &self,
        client_secret: &str,
    ) -> Result<PaymentIntent, ClientError> {
        let intent_id = intent_id_from_secret(client_secret)?;
        let url = format!("{}/payment_intents/{intent_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.publishable_key.as_str()),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<PaymentIntent, ClientError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|source| ClientError::Decode {
                endpoint: "stripe/payment_intents".to_string(),
                source,
            });
        }

        let error_body: Result<StripeErrorResponse, _> = response.json().await;
        match error_body {
            Ok(stripe_error) => Err(ClientError::Stripe {
                code: stripe_error.error.code,
                message: stripe_error.error.message,
            }),
            Err(_) => Err(ClientError::Stripe {
                code: None,
                message: format!("HTTP {status}"),
            }),
        }
    }
}

/// Extract the intent ID from a client secret (`pi_xxx_secret_yyy` → `pi_xxx`).
fn intent_id_from_secret(client_secret: &str) -> Result<String, ClientError> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id.to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ClientError::Validation(format!(
                "malformed client secret: {}",
                redact_secret(client_secret)
            ))
        })
}

/// Keep only the intent-id portion of a secret for error messages.
fn redact_secret(client_secret: &str) -> String {
    let visible = client_secret.chars().take(8).collect::<String>();
    format!("{visible}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = StripeClient::with_base_url("pk_test_x", "http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn intent_id_parses_from_client_secret() {
        let id = intent_id_from_secret("pi_3Abc_secret_xyz").unwrap();
        assert_eq!(id, "pi_3Abc");
    }

    #[test]
    fn intent_id_rejects_malformed_secret() {
        let err = intent_id_from_secret("not-a-secret").unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        // The raw secret must not leak into the message.
        assert!(!err.to_string().contains("not-a-secret"));

        assert!(intent_id_from_secret("_secret_xyz").is_err());
    }

    #[test]
    fn status_decodes_wire_names() {
        let status: PaymentIntentStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(status, PaymentIntentStatus::Succeeded);

        let status: PaymentIntentStatus =
            serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, PaymentIntentStatus::RequiresAction);

        // Statuses Stripe adds later must not break decoding.
        let status: PaymentIntentStatus =
            serde_json::from_str("\"some_future_state\"").unwrap();
        assert_eq!(status, PaymentIntentStatus::Unknown);
    }

    #[test]
    fn payment_intent_decodes_minimal_payload() {
        let json = serde_json::json!({
            "id": "pi_3Abc",
            "status": "succeeded",
            "amount": 2499,
            "currency": "usd",
        });
        let intent: PaymentIntent = serde_json::from_value(json).unwrap();
        assert_eq!(intent.id, "pi_3Abc");
        assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
        assert_eq!(intent.amount, 2499);
        assert_eq!(intent.description, None);
    }
}
