//! Request and response types for the Fliq backend API.
//!
//! Wire payloads are camelCase. Backend responses are decoded into dedicated
//! structs and validated at the boundary: unknown plan categories and broken
//! catalog invariants are errors here, not silent defaults downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fliq_billing_core::{CreditTransaction, PackageType, PaymentPlan, PlanId, TransactionType};

use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Envelope for `GET /api/payment/plans`.
#[derive(Debug, Deserialize)]
pub(crate) struct PlansEnvelope {
    pub success: bool,
    #[serde(default)]
    pub plans: Vec<WirePlan>,
}

/// A catalog plan as the backend sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePlan {
    pub id: String,
    pub credits: i64,
    pub price: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub profiles_unlocked: Option<i64>,
    #[serde(default)]
    pub revisions_unlocked: Option<i64>,
    #[serde(default)]
    pub popular: bool,
}

impl WirePlan {
    /// Validate and convert into a catalog [`PaymentPlan`].
    pub(crate) fn into_plan(self) -> Result<PaymentPlan, ClientError> {
        let plan_id =
            PlanId::new(self.id).map_err(|err| ClientError::Validation(err.to_string()))?;
        let package_type: PackageType = self
            .category
            .parse()
            .map_err(|err: fliq_billing_core::BillingError| {
                ClientError::Validation(err.to_string())
            })?;

        let plan = PaymentPlan {
            plan_id,
            credits: self.credits,
            price_cents: self.price,
            currency: self.currency.unwrap_or_else(|| "usd".to_string()),
            name: self.name,
            description: self.description.unwrap_or_default(),
            package_type,
            profiles_unlocked: self.profiles_unlocked,
            revisions_unlocked: self.revisions_unlocked,
            popular: self.popular,
        };
        plan.validate()
            .map_err(|err| ClientError::Validation(err.to_string()))?;
        Ok(plan)
    }
}

// ---------------------------------------------------------------------------
// Payment intents
// ---------------------------------------------------------------------------

/// Body for `POST /api/payment/create-payment-intent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePaymentIntentRequest<'a> {
    pub plan_id: &'a PlanId,
}

/// Envelope for the create-intent response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePaymentIntentEnvelope {
    pub success: bool,
    pub client_secret: String,
    pub plan: PlanSummary,
}

/// The plan echo attached to intent and verification responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    /// Catalog identifier.
    pub id: PlanId,
    /// Credits the plan grants.
    pub credits: i64,
    /// Price in minor currency units.
    pub price: i64,
    /// Display name.
    pub name: String,
    /// Price pre-formatted by the backend (e.g. `"$24.99"`).
    pub price_formatted: String,
}

/// A payment intent created server-side for one purchase attempt.
///
/// Single-use: Stripe allows exactly one successful confirmation per intent.
#[derive(Debug, Clone)]
pub struct PaymentIntentResult {
    /// Secret handed to Stripe for client-side confirmation.
    pub client_secret: String,
    /// The plan being purchased.
    pub plan: PlanSummary,
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Body for `POST /api/payment/verify-payment`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyPaymentRequest<'a> {
    pub payment_intent_id: &'a str,
}

/// Envelope for the verification response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyPaymentEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub credits_added: i64,
    pub plan: PlanSummary,
}

/// Outcome of server-side payment verification, the authoritative step that
/// actually credits the account.
#[derive(Debug, Clone)]
pub struct VerifiedPayment {
    /// Server-supplied confirmation message.
    pub message: String,
    /// Credits granted by the verification.
    pub credits_added: i64,
    /// The plan that was purchased.
    pub plan: PlanSummary,
}

// ---------------------------------------------------------------------------
// Payment history
// ---------------------------------------------------------------------------

/// Envelope for `GET /api/payment/history`.
#[derive(Debug, Deserialize)]
pub(crate) struct PaymentHistoryEnvelope {
    pub success: bool,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

/// A past payment as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Payment intent ID.
    pub id: String,
    /// Amount in minor currency units.
    #[serde(default)]
    pub amount: i64,
    /// Currency code.
    #[serde(default)]
    pub currency: String,
    /// Terminal status.
    #[serde(default)]
    pub status: String,
    /// When the payment was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

/// Envelope for `GET /api/profile/credits`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreditsEnvelope {
    pub success: bool,
    pub data: CreditsData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreditsData {
    pub credits: i64,
}

/// Body for `POST /api/profile/credits/add`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCreditsRequest<'a> {
    pub credits: i64,
    pub transaction_type: TransactionType,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_type: Option<PackageType>,
}

/// Body for `POST /api/profile/credits/deduct`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeductCreditsRequest<'a> {
    pub credits: i64,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<&'a str>,
}

/// Envelope for credit mutations.
#[derive(Debug, Deserialize)]
pub(crate) struct NewBalanceEnvelope {
    pub success: bool,
    pub data: NewBalanceData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewBalanceData {
    pub new_balance: i64,
}

/// Envelope for `GET /api/profile/credits/history`.
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryEnvelope {
    pub success: bool,
    pub data: HistoryData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryData {
    pub transactions: Vec<CreditTransaction>,
    pub pagination: Pagination,
}

/// Pagination metadata for ledger reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total ledger entries for the user.
    #[serde(default)]
    pub total: i64,
    /// Page size requested.
    pub limit: u32,
    /// Offset of this page.
    pub offset: u32,
    /// Whether more entries follow this page.
    #[serde(default)]
    pub has_more: bool,
}
