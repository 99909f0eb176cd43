//! End-to-end SSO verification orchestration.
//!
//! Strict two-stage pipeline: the companion service's trust decision first,
//! the local provisioning decision second. No local user is ever looked up
//! or created on behalf of an unverified remote claim.

use crate::models::{ConnectivityResult, RejectReason, UnavailableReason, VerificationOutcome};
use crate::services::companion::{CompanionClient, CompanionError};
use crate::services::user_store::UserStore;
use crate::services::{identity, metrics, SettingsStore};
use std::sync::Arc;

/// Orchestrator over the companion client, the settings snapshot, and the
/// injected user store.
#[derive(Clone)]
pub struct SsoService {
    companion: CompanionClient,
    settings: SettingsStore,
    users: Arc<dyn UserStore>,
}

impl SsoService {
    pub fn new(companion: CompanionClient, settings: SettingsStore, users: Arc<dyn UserStore>) -> Self {
        Self {
            companion,
            settings,
            users,
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Verify one opaque token and map it onto a local account.
    pub async fn validate_token(&self, token: &str) -> VerificationOutcome {
        let settings = self.settings.snapshot().await;

        if !settings.enabled {
            let outcome = VerificationOutcome::Rejected(RejectReason::SsoDisabled);
            metrics::record_verification(&outcome);
            return outcome;
        }

        if settings.log_attempts {
            tracing::info!("SSO validation attempt received");
        }

        let assertion = match self.companion.verify_token(token, &settings).await {
            Ok(assertion) => assertion,
            Err(e) => {
                let outcome = companion_outcome(e, settings.log_attempts);
                metrics::record_verification(&outcome);
                return outcome;
            }
        };

        if settings.log_attempts {
            tracing::info!(
                username = %assertion.username,
                is_admin = assertion.is_admin,
                "Companion service verified SSO token"
            );
        }

        let outcome = identity::resolve(&assertion, &settings, self.users.as_ref()).await;

        if settings.log_attempts {
            match &outcome {
                VerificationOutcome::Verified { user_id, username } => {
                    tracing::info!(user_id = %user_id, username = %username, "SSO verification succeeded");
                }
                VerificationOutcome::Rejected(reason) => {
                    tracing::warn!(reason = ?reason, "SSO provisioning rejected");
                }
                VerificationOutcome::Unavailable(reason) => {
                    tracing::error!(reason = ?reason, "SSO provisioning unavailable");
                }
            }
        }

        metrics::record_verification(&outcome);
        outcome
    }

    /// Administrator-triggered connectivity probe; never touches the user store.
    pub async fn test_connection(&self) -> ConnectivityResult {
        let settings = self.settings.snapshot().await;

        match self.companion.check_health(&settings).await {
            Ok(()) => ConnectivityResult {
                success: true,
                message: "Connection to companion service successful".to_string(),
            },
            Err(CompanionError::Denied(status)) => ConnectivityResult {
                success: false,
                message: format!("Companion service returned status code: {}", status),
            },
            Err(e) => ConnectivityResult {
                success: false,
                message: format!("Failed to connect to companion service: {}", e),
            },
        }
    }
}

/// Map a companion client failure onto a verification outcome.
fn companion_outcome(err: CompanionError, log_attempts: bool) -> VerificationOutcome {
    match err {
        CompanionError::EmptyToken => {
            VerificationOutcome::Rejected(RejectReason::MissingToken)
        }
        CompanionError::Denied(status) => {
            if log_attempts {
                tracing::warn!(status = status, "Companion service denied SSO token");
            }
            VerificationOutcome::Rejected(RejectReason::RemoteDenied(status))
        }
        CompanionError::MalformedResponse(detail) => {
            if log_attempts {
                tracing::warn!(detail = %detail, "Companion response was malformed");
            }
            VerificationOutcome::Rejected(RejectReason::MalformedResponse)
        }
        CompanionError::TimedOut => {
            // Infrastructure faults are logged regardless of the toggle.
            tracing::error!("Companion service call timed out");
            VerificationOutcome::Unavailable(UnavailableReason::Timeout)
        }
        CompanionError::Unreachable(detail) => {
            tracing::error!(detail = %detail, "Companion service unreachable");
            VerificationOutcome::Unavailable(UnavailableReason::Transport(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SsoSettings;
    use crate::services::user_store::InMemoryUserStore;
    use secrecy::Secret;

    fn service(enabled: bool) -> SsoService {
        let settings = SsoSettings {
            // Nothing listens on port 1, so any network attempt is refused
            // immediately; the disabled/empty-token paths must never reach it.
            companion_base_url: "http://127.0.0.1:1".to_string(),
            shared_secret: Secret::new(String::new()),
            enabled,
            auto_create_users: true,
            sync_admin_status: false,
            log_attempts: false,
        };
        SsoService::new(
            CompanionClient::new(),
            SettingsStore::new(settings),
            Arc::new(InMemoryUserStore::new()),
        )
    }

    #[tokio::test]
    async fn disabled_sso_short_circuits() {
        let outcome = service(false).validate_token("some-token").await;
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(RejectReason::SsoDisabled)
        );
    }

    #[tokio::test]
    async fn empty_token_short_circuits() {
        let outcome = service(true).validate_token("").await;
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(RejectReason::MissingToken)
        );
    }

    #[tokio::test]
    async fn unreachable_companion_is_unavailable() {
        let outcome = service(true).validate_token("some-token").await;
        assert!(matches!(
            outcome,
            VerificationOutcome::Unavailable(UnavailableReason::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_reports_failure_when_unreachable() {
        let result = service(true).test_connection().await;
        assert!(!result.success);
    }
}
