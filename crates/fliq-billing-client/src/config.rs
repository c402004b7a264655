//! Runtime configuration provider.
//!
//! Payment cannot proceed until the Stripe publishable key and API base URL
//! are known, so the provider fetches them from the backend before the first
//! purchase. A last-known-good copy is kept in memory: if a refresh fails the
//! stale copy is served rather than blocking the caller, and only a cold
//! cache propagates the failure.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ClientError;

/// Stripe-related runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeConfig {
    /// Publishable key used for client-side card confirmation.
    pub publishable_key: String,
}

/// Backend API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL for API calls.
    pub base_url: String,
}

/// Runtime configuration served by `GET /api/config/client`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Stripe configuration.
    pub stripe: StripeConfig,

    /// API configuration.
    pub api: ApiConfig,

    /// Feature flags.
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

impl ClientConfig {
    /// Whether a feature flag is enabled. Unknown flags are off.
    #[must_use]
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }
}

/// Envelope for the config endpoint.
#[derive(Debug, Deserialize)]
struct ConfigEnvelope {
    success: bool,
    config: ClientConfig,
    #[serde(default)]
    environment: Option<String>,
}

/// Fetches and caches runtime configuration.
///
/// The cache is an explicit dependency handed to the payment and credits
/// clients, not an ambient global.
pub struct ConfigProvider {
    http: reqwest::Client,
    base_url: String,
    cache: RwLock<Option<ClientConfig>>,
}

impl ConfigProvider {
    /// Create a provider that fetches from `base_url`.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: RwLock::new(None),
        }
    }

    /// Fetch the runtime configuration, falling back to the cached copy.
    ///
    /// # Errors
    ///
    /// Returns an error only when the fetch fails *and* no cached copy
    /// exists; callers must then treat payment as unavailable.
    pub async fn load(&self) -> Result<ClientConfig, ClientError> {
        match self.fetch().await {
            Ok(config) => {
                *self
                    .cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
                Ok(config)
            }
            Err(err) => {
                if let Some(cached) = self.cached() {
                    warn!(error = %err, "config fetch failed, serving last-known-good copy");
                    return Ok(cached);
                }
                Err(err)
            }
        }
    }

    /// Return the cached configuration, if any.
    #[must_use]
    pub fn cached(&self) -> Option<ClientConfig> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the cached configuration so the next [`load`](Self::load) refetches.
    pub fn invalidate(&self) {
        *self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether the backend is reachable and healthy.
    ///
    /// Network failures report `false` rather than erroring: health checks
    /// exist to decide whether to show a degraded state, not to fail flows.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }

    async fn fetch(&self) -> Result<ClientConfig, ClientError> {
        let url = format!("{}/api/config/client", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                code: "config_unavailable".to_string(),
                message: format!("config endpoint returned HTTP {status}"),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let envelope: ConfigEnvelope =
            serde_json::from_str(&body).map_err(|source| ClientError::Decode {
                endpoint: "/api/config/client".to_string(),
                source,
            })?;

        if !envelope.success {
            return Err(ClientError::Api {
                code: "config_unavailable".to_string(),
                message: "config endpoint reported failure".to_string(),
                status: status.as_u16(),
            });
        }

        let config = envelope.config;
        if config.stripe.publishable_key.trim().is_empty() {
            return Err(ClientError::Configuration(
                "config is missing the Stripe publishable key".to_string(),
            ));
        }

        info!(
            environment = envelope.environment.as_deref().unwrap_or("unknown"),
            "loaded runtime configuration"
        );
        Ok(config)
    }
}
