//! Purchase orchestration.
//!
//! Sequences one credit purchase end to end: intent creation, client-side
//! card confirmation with Stripe, then server-side verification. The states
//! are explicit and a single in-flight guard rejects a second purchase while
//! one is pending, so a double submit cannot create two payment intents.
//!
//! Verification is the step that actually credits the account. If it fails
//! after the card was charged, the intent id is retained and
//! [`PurchaseFlow::retry_verification`] re-runs verification alone, without
//! confirming (and charging) the card again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use fliq_billing_core::{ErrorHandler, PaymentIntentId, PaymentPlan};

use crate::credits::CreditsClient;
use crate::error::ClientError;
use crate::payment::PaymentsClient;
use crate::stripe::{CardDetails, PaymentIntent, PaymentIntentStatus, StripeClient};
use crate::types::{PlanSummary, VerifiedPayment};

/// Where a purchase attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseState {
    /// No purchase in progress.
    Idle,
    /// Asking the backend for a payment intent.
    CreatingIntent,
    /// Confirming the card with Stripe.
    Confirming,
    /// Asking the backend to verify the confirmed payment.
    Verifying,
    /// The last purchase completed and was verified.
    Succeeded,
    /// The last purchase failed; see the returned error.
    Failed,
}

/// Outcome of a completed, verified purchase.
#[derive(Debug, Clone)]
pub struct PurchaseResult {
    /// The confirmed Stripe payment intent.
    pub payment_intent: PaymentIntent,
    /// Credits granted by server-side verification.
    pub credits_added: i64,
    /// The plan that was purchased.
    pub plan: PlanSummary,
}

/// Orchestrates credit purchases.
pub struct PurchaseFlow {
    payments: Arc<PaymentsClient>,
    credits: Arc<CreditsClient>,
    stripe: StripeClient,
    handler: ErrorHandler,
    state: Mutex<PurchaseState>,
    in_flight: AtomicBool,
    pending_verification: Mutex<Option<PaymentIntentId>>,
}

impl PurchaseFlow {
    /// Create a purchase flow over the given clients.
    #[must_use]
    pub fn new(
        payments: Arc<PaymentsClient>,
        credits: Arc<CreditsClient>,
        stripe: StripeClient,
    ) -> Self {
        Self {
            payments,
            credits,
            stripe,
            handler: ErrorHandler::default(),
            state: Mutex::new(PurchaseState::Idle),
            in_flight: AtomicBool::new(false),
            pending_verification: Mutex::new(None),
        }
    }

    /// Replace the error handler (logging/reporting sink).
    #[must_use]
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.handler = handler;
        self
    }

    /// The current purchase state.
    #[must_use]
    pub fn state(&self) -> PurchaseState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The intent awaiting verification after a charged-but-unverified
    /// purchase, if any.
    #[must_use]
    pub fn pending_verification(&self) -> Option<PaymentIntentId> {
        self.pending_verification
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one purchase: create intent, confirm card, verify server-side.
    ///
    /// On success the credits cache is refreshed from the server. Errors are
    /// classified and routed through the error handler before being returned,
    /// so callers always have a `user_message` available via
    /// [`ClientError::classify`].
    ///
    /// # Errors
    ///
    /// - [`ClientError::PurchaseInFlight`] while another purchase is pending.
    /// - [`ClientError::PaymentIncomplete`] when confirmation ends in any
    ///   status other than `succeeded`; verification is not attempted.
    /// - Any error from intent creation, confirmation, or verification.
    pub async fn purchase_credits(
        &self,
        plan: &PaymentPlan,
        card: &CardDetails,
    ) -> Result<PurchaseResult, ClientError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(ClientError::PurchaseInFlight);
        }

        let result = self.run(plan, card).await;
        match &result {
            Ok(_) => self.set_state(PurchaseState::Succeeded),
            Err(err) => {
                self.set_state(PurchaseState::Failed);
                self.handler.handle(&err.classify()).await;
            }
        }
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run(
        &self,
        plan: &PaymentPlan,
        card: &CardDetails,
    ) -> Result<PurchaseResult, ClientError> {
        plan.validate()
            .map_err(|err| ClientError::Validation(err.to_string()))?;

        self.set_state(PurchaseState::CreatingIntent);
        let intent = self.payments.create_payment_intent(&plan.plan_id).await?;

        self.set_state(PurchaseState::Confirming);
        let confirmed = self
            .stripe
            .confirm_card_payment(&intent.client_secret, card)
            .await?;

        if confirmed.status != PaymentIntentStatus::Succeeded {
            // The card was not charged; verification must not run, or a
            // false credit grant could be attempted.
            return Err(ClientError::PaymentIncomplete {
                status: confirmed.status,
            });
        }

        self.set_state(PurchaseState::Verifying);
        let intent_id = PaymentIntentId::new(confirmed.id.clone())
            .map_err(|err| ClientError::Validation(err.to_string()))?;

        match self.payments.verify_payment(&intent_id).await {
            Ok(verified) => {
                self.set_pending(None);
                self.refresh_balance().await;
                Ok(PurchaseResult {
                    payment_intent: confirmed,
                    credits_added: verified.credits_added,
                    plan: verified.plan,
                })
            }
            Err(err) => {
                // The card is already charged. Keep the intent so
                // verification can be retried without re-confirming.
                self.set_pending(Some(intent_id));
                Err(err)
            }
        }
    }

    /// Re-run server-side verification for a charged-but-unverified payment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when no payment awaits
    /// verification, or the verification failure otherwise (the intent stays
    /// pending for another retry).
    pub async fn retry_verification(&self) -> Result<VerifiedPayment, ClientError> {
        let Some(intent_id) = self.pending_verification() else {
            return Err(ClientError::Validation(
                "no payment awaiting verification".to_string(),
            ));
        };

        match self.payments.verify_payment(&intent_id).await {
            Ok(verified) => {
                self.set_pending(None);
                self.set_state(PurchaseState::Succeeded);
                self.refresh_balance().await;
                Ok(verified)
            }
            Err(err) => {
                self.handler.handle(&err.classify()).await;
                Err(err)
            }
        }
    }

    /// Refresh the credits cache after a verified purchase. A refresh
    /// failure does not undo the purchase; the cache simply stays stale.
    async fn refresh_balance(&self) {
        if let Err(err) = self.credits.fetch_credits().await {
            warn!(error = %err, "balance refresh after purchase failed");
        }
    }

    fn set_state(&self, state: PurchaseState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn set_pending(&self, pending: Option<PaymentIntentId>) {
        *self
            .pending_verification
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = pending;
    }
}
