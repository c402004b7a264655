//! Client assembly.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::TokenProvider;
use crate::config::{ClientConfig, ConfigProvider};
use crate::credits::CreditsClient;
use crate::payment::PaymentsClient;
use crate::purchase::PurchaseFlow;
use crate::stripe::StripeClient;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://fliq-backend-bxhr.onrender.com";

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Backend base URL.
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ClientOptions {
    /// Create options pointing at a custom backend.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Entry point bundling the config, payments, and credits clients over one
/// shared HTTP connection pool.
pub struct FliqClient {
    base_url: String,
    config: Arc<ConfigProvider>,
    payments: Arc<PaymentsClient>,
    credits: Arc<CreditsClient>,
}

impl FliqClient {
    /// Create a client against the default backend.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_options(tokens, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn with_options(tokens: Arc<dyn TokenProvider>, options: ClientOptions) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        let base_url = options.base_url.trim_end_matches('/').to_string();
        let config = Arc::new(ConfigProvider::new(http.clone(), &base_url));
        let payments = Arc::new(PaymentsClient::new(
            http.clone(),
            &base_url,
            Arc::clone(&tokens),
        ));
        let credits = Arc::new(CreditsClient::new(http, &base_url, tokens));

        Self {
            base_url,
            config,
            payments,
            credits,
        }
    }

    /// Create a client from already-loaded runtime configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_options(tokens, ClientOptions::with_base_url(&config.api.base_url))
    }

    /// The backend base URL this client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The runtime configuration provider.
    #[must_use]
    pub fn config(&self) -> &Arc<ConfigProvider> {
        &self.config
    }

    /// The payments client.
    #[must_use]
    pub fn payments(&self) -> &Arc<PaymentsClient> {
        &self.payments
    }

    /// The credits client.
    #[must_use]
    pub fn credits(&self) -> &Arc<CreditsClient> {
        &self.credits
    }

    /// Build a purchase flow using `stripe` for card confirmation.
    #[must_use]
    pub fn purchase_flow(&self, stripe: StripeClient) -> PurchaseFlow {
        PurchaseFlow::new(Arc::clone(&self.payments), Arc::clone(&self.credits), stripe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Unauthenticated;

    #[test]
    fn client_trims_trailing_slash() {
        let client = FliqClient::with_options(
            Arc::new(Unauthenticated),
            ClientOptions::with_base_url("http://localhost:8080/"),
        );
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn default_options_target_production_backend() {
        let options = ClientOptions::default();
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert_eq!(options.timeout_seconds, 30);
    }
}
