//! Companion identity service client.
//!
//! Performs the authenticated calls to the companion app's token-validation
//! and health endpoints and translates transport/status outcomes into typed
//! results. The token itself is opaque; only the companion decodes it.

use crate::models::{RemoteIdentity, SsoSettings};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Bound on every outbound companion call.
const CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the shared secret on every outbound call.
const API_KEY_HEADER: &str = "X-API-Key";

/// Error type for companion calls.
#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("token must not be empty")]
    EmptyToken,

    #[error("companion service denied the request (status {0})")]
    Denied(u16),

    #[error("companion response carried no usable identity: {0}")]
    MalformedResponse(String),

    #[error("companion service timed out")]
    TimedOut,

    #[error("companion service unreachable: {0}")]
    Unreachable(String),
}

/// Client for the companion service, shared across calls.
///
/// Holds one pooled `reqwest::Client`; the base URL and secret come from the
/// per-call settings snapshot so hot config updates take effect immediately.
#[derive(Clone)]
pub struct CompanionClient {
    client: Client,
}

impl CompanionClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Ask the companion service whether `token` is valid.
    ///
    /// Single attempt, no retries: the caller owns retry/backoff policy, and
    /// retrying an identity call risks duplicate provisioning side effects.
    pub async fn verify_token(
        &self,
        token: &str,
        settings: &SsoSettings,
    ) -> Result<RemoteIdentity, CompanionError> {
        if token.is_empty() {
            return Err(CompanionError::EmptyToken);
        }

        let url = endpoint(&settings.companion_base_url, "/api/auth/validate-sso");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, settings.shared_secret.expose_secret())
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Companion service rejected SSO token");
            return Err(CompanionError::Denied(status.as_u16()));
        }

        let body = response.text().await.map_err(map_transport_error)?;
        tracing::debug!(status = %status, body = %body, "Companion validate-sso response");

        parse_identity(&body)
    }

    /// Probe the companion health endpoint. Body content is ignored.
    pub async fn check_health(&self, settings: &SsoSettings) -> Result<(), CompanionError> {
        let url = endpoint(&settings.companion_base_url, "/api/health");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, settings.shared_secret.expose_secret())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompanionError::Denied(status.as_u16()));
        }

        Ok(())
    }
}

impl Default for CompanionClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Join the configured base URL and a path, tolerating a trailing slash.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn map_transport_error(err: reqwest::Error) -> CompanionError {
    if err.is_timeout() {
        CompanionError::TimedOut
    } else {
        CompanionError::Unreachable(err.to_string())
    }
}

fn parse_identity(body: &str) -> Result<RemoteIdentity, CompanionError> {
    let identity: RemoteIdentity =
        serde_json::from_str(body).map_err(|e| CompanionError::MalformedResponse(e.to_string()))?;

    if identity.username.is_empty() {
        return Err(CompanionError::MalformedResponse(
            "username is empty".to_string(),
        ));
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn test_settings() -> SsoSettings {
        SsoSettings {
            companion_base_url: "http://localhost:3000".to_string(),
            shared_secret: Secret::new("test-secret".to_string()),
            enabled: true,
            auto_create_users: true,
            sync_admin_status: true,
            log_attempts: false,
        }
    }

    #[tokio::test]
    async fn empty_token_is_rejected_without_network() {
        // Base URL points nowhere; an attempted call would fail differently.
        let mut settings = test_settings();
        settings.companion_base_url = "http://invalid.invalid".to_string();

        let client = CompanionClient::new();
        let err = client.verify_token("", &settings).await.unwrap_err();
        assert!(matches!(err, CompanionError::EmptyToken));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        assert_eq!(
            endpoint("http://host:3000/", "/api/health"),
            "http://host:3000/api/health"
        );
        assert_eq!(
            endpoint("http://host:3000", "/api/health"),
            "http://host:3000/api/health"
        );
    }

    #[test]
    fn parse_identity_accepts_minimal_body() {
        let identity = parse_identity(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(identity.username, "alice");
        assert!(!identity.is_admin);
        assert!(identity.email.is_none());
        assert!(identity.display_name.is_none());
    }

    #[test]
    fn parse_identity_reads_optional_fields() {
        let identity = parse_identity(
            r#"{"username":"bob","email":"bob@example.com","isAdmin":true,"displayName":"Bob"}"#,
        )
        .unwrap();
        assert_eq!(identity.email.as_deref(), Some("bob@example.com"));
        assert!(identity.is_admin);
        assert_eq!(identity.display_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn parse_identity_rejects_missing_username() {
        let err = parse_identity(r#"{"isAdmin":true}"#).unwrap_err();
        assert!(matches!(err, CompanionError::MalformedResponse(_)));
    }

    #[test]
    fn parse_identity_rejects_empty_username() {
        let err = parse_identity(r#"{"username":""}"#).unwrap_err();
        assert!(matches!(err, CompanionError::MalformedResponse(_)));
    }

    #[test]
    fn parse_identity_rejects_non_json() {
        let err = parse_identity("<html>oops</html>").unwrap_err();
        assert!(matches!(err, CompanionError::MalformedResponse(_)));
    }
}
