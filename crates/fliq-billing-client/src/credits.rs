//! Credit ledger client.
//!
//! Reads and mutates the user's credit balance against the backend. A cached
//! [`CreditBalance`] snapshot backs the synchronous
//! [`CreditsClient::has_credits`] predicate; the server's returned balance is
//! always taken as truth and the client never computes a balance itself.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Client;
use tracing::{debug, info};

use fliq_billing_core::{
    CreditBalance, CreditTransaction, PackageType, TransactionType, BALANCE_REFRESH_INTERVAL,
};

use crate::auth::TokenProvider;
use crate::error::ClientError;
use crate::http::decode_success;
use crate::types::{
    AddCreditsRequest, CreditsEnvelope, DeductCreditsRequest, HistoryEnvelope, NewBalanceEnvelope,
    Pagination,
};

/// Client for the backend credit endpoints.
pub struct CreditsClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    cache: RwLock<Option<CreditBalance>>,
}

impl CreditsClient {
    /// Create a credits client.
    #[must_use]
    pub fn new(http: Client, base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            cache: RwLock::new(None),
        }
    }

    /// Fetch the current balance from the server and refresh the cache.
    ///
    /// Unauthenticated sessions resolve to a zero balance without touching
    /// the network.
    ///
    /// # Errors
    ///
    /// Returns backend/transport failures. The stale cache is left as-is on
    /// failure; callers decide whether to keep showing it.
    pub async fn fetch_credits(&self) -> Result<CreditBalance, ClientError> {
        let Some(token) = self.tokens.bearer_token().await? else {
            debug!("no signed-in user, reporting zero balance");
            let balance = CreditBalance::zero();
            self.store(balance.clone());
            return Ok(balance);
        };

        let url = format!("{}/api/profile/credits", self.base_url);
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let envelope: CreditsEnvelope = decode_success("/api/profile/credits", response).await?;

        if !envelope.success {
            return Err(ClientError::Api {
                code: "credits_unavailable".to_string(),
                message: "credits endpoint reported failure".to_string(),
                status: 200,
            });
        }

        let balance = CreditBalance::now(envelope.data.credits);
        self.store(balance.clone());
        Ok(balance)
    }

    /// Refetch only when the cache is missing or older than
    /// [`BALANCE_REFRESH_INTERVAL`].
    ///
    /// # Errors
    ///
    /// Returns backend/transport failures from the refetch.
    pub async fn refresh_if_stale(&self) -> Result<CreditBalance, ClientError> {
        match self.cached_balance() {
            Some(balance) if !balance.is_stale(BALANCE_REFRESH_INTERVAL) => Ok(balance),
            _ => self.fetch_credits().await,
        }
    }

    /// Add credits to the account.
    ///
    /// Returns the server's new balance, which also replaces the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for non-positive amounts,
    /// [`ClientError::Authentication`] with no signed-in user, and
    /// backend/transport failures otherwise.
    pub async fn add_credits(
        &self,
        amount: i64,
        transaction_type: TransactionType,
        description: &str,
        package_type: Option<PackageType>,
    ) -> Result<i64, ClientError> {
        if amount <= 0 {
            return Err(ClientError::Validation(format!(
                "credits amount must be positive, got {amount}"
            )));
        }

        let token = self.tokens.require_token().await?;
        let url = format!("{}/api/profile/credits/add", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&AddCreditsRequest {
                credits: amount,
                transaction_type,
                description,
                package_type,
            })
            .send()
            .await?;

        let envelope: NewBalanceEnvelope =
            decode_success("/api/profile/credits/add", response).await?;
        if !envelope.success {
            return Err(ClientError::Api {
                code: "add_credits_failed".to_string(),
                message: "credit addition was not applied".to_string(),
                status: 200,
            });
        }

        let new_balance = envelope.data.new_balance;
        self.store(CreditBalance::now(new_balance));
        info!(amount, new_balance, "credits added");
        Ok(new_balance)
    }

    /// Deduct credits from the account.
    ///
    /// Returns the server's new balance, which also replaces the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for non-positive amounts,
    /// [`ClientError::Authentication`] with no signed-in user, and
    /// backend/transport failures otherwise.
    pub async fn deduct_credits(
        &self,
        amount: i64,
        description: &str,
        service_type: Option<&str>,
    ) -> Result<i64, ClientError> {
        if amount <= 0 {
            return Err(ClientError::Validation(format!(
                "credits amount must be positive, got {amount}"
            )));
        }

        let token = self.tokens.require_token().await?;
        let url = format!("{}/api/profile/credits/deduct", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&DeductCreditsRequest {
                credits: amount,
                description,
                service_type,
            })
            .send()
            .await?;

        let envelope: NewBalanceEnvelope =
            decode_success("/api/profile/credits/deduct", response).await?;
        if !envelope.success {
            return Err(ClientError::Api {
                code: "deduct_credits_failed".to_string(),
                message: "credit deduction was not applied".to_string(),
                status: 200,
            });
        }

        let new_balance = envelope.data.new_balance;
        self.store(CreditBalance::now(new_balance));
        info!(amount, new_balance, "credits deducted");
        Ok(new_balance)
    }

    /// Read a page of the credit ledger.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] with no signed-in user, and
    /// backend/transport failures otherwise.
    pub async fn credit_history(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<CreditTransaction>, Pagination), ClientError> {
        let token = self.tokens.require_token().await?;
        let url = format!("{}/api/profile/credits/history", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;

        let envelope: HistoryEnvelope =
            decode_success("/api/profile/credits/history", response).await?;
        if !envelope.success {
            return Err(ClientError::Api {
                code: "history_unavailable".to_string(),
                message: "credit history endpoint reported failure".to_string(),
                status: 200,
            });
        }

        Ok((envelope.data.transactions, envelope.data.pagination))
    }

    /// Whether the cached balance covers `required` credits.
    ///
    /// Purely local: consults only the last-fetched snapshot and never
    /// triggers a network call, so the answer may be stale. Callers needing a
    /// strict guarantee must [`fetch_credits`](Self::fetch_credits) first.
    /// With no snapshot at all the answer is `false`.
    #[must_use]
    pub fn has_credits(&self, required: i64) -> bool {
        self.cached_balance()
            .is_some_and(|balance| balance.covers(required))
    }

    /// The last-fetched balance snapshot, if any.
    #[must_use]
    pub fn cached_balance(&self) -> Option<CreditBalance> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, balance: CreditBalance) {
        *self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(balance);
    }
}
