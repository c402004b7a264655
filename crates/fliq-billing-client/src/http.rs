//! Shared response handling for the backend API.
//!
//! Every backend endpoint wraps its payload in a `{ success, ... }` envelope
//! and reports failures as `{ success: false, error, message }`. Decoding is
//! done from the raw body so malformed responses surface as
//! [`ClientError::Decode`] with the offending endpoint named.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;

/// Error envelope returned by failed backend calls.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decode a successful response body, or convert the error envelope.
pub(crate) async fn decode_success<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let body = response.text().await?;
        return serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: endpoint.to_string(),
            source,
        });
    }

    let body = response.text().await.unwrap_or_default();
    let envelope: Option<ErrorEnvelope> = serde_json::from_str(&body).ok();

    match envelope {
        Some(env) => Err(ClientError::Api {
            code: env
                .error
                .clone()
                .unwrap_or_else(|| "request_failed".to_string()),
            message: env
                .message
                .or(env.error)
                .unwrap_or_else(|| format!("HTTP {status}")),
            status: status.as_u16(),
        }),
        None => Err(ClientError::Api {
            code: "unknown".to_string(),
            message: format!("HTTP {status}"),
            status: status.as_u16(),
        }),
    }
}
