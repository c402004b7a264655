//! Authentication seam.
//!
//! Tokens are opaque bearer strings obtained just-in-time before every
//! protected request, so a provider backed by a real auth SDK can refresh
//! behind the scenes. The client never inspects or caches tokens itself.

use async_trait::async_trait;

use crate::error::ClientError;

/// Supplies bearer tokens for protected API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a fresh bearer token, or `None` when no user is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the token refresh itself fails.
    async fn bearer_token(&self) -> Result<Option<String>, ClientError>;

    /// Return a token or fail the operation for unauthenticated users.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] when no user is signed in.
    async fn require_token(&self) -> Result<String, ClientError> {
        self.bearer_token().await?.ok_or_else(|| {
            ClientError::Authentication("user must be authenticated".to_string())
        })
    }
}

/// Provider with a fixed token. Used by tests and server-side tooling.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Create a provider that always returns `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<Option<String>, ClientError> {
        Ok(Some(self.token.clone()))
    }
}

/// Provider for sessions with no signed-in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unauthenticated;

#[async_trait]
impl TokenProvider for Unauthenticated {
    async fn bearer_token(&self) -> Result<Option<String>, ClientError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_token() {
        let provider = StaticTokenProvider::new("tok-123");
        assert_eq!(
            provider.bearer_token().await.unwrap(),
            Some("tok-123".to_string())
        );
        assert_eq!(provider.require_token().await.unwrap(), "tok-123");
    }

    #[tokio::test]
    async fn unauthenticated_requires_token_fails() {
        let provider = Unauthenticated;
        assert_eq!(provider.bearer_token().await.unwrap(), None);
        let err = provider.require_token().await.unwrap_err();
        assert!(matches!(err, ClientError::Authentication(_)));
        assert!(err.to_string().contains("must be authenticated"));
    }
}
