//! Identity mapping and provisioning policy.
//!
//! Pure decision layer over the user-store boundary: no network I/O, so it
//! is independently testable with an in-memory store. Runs only after the
//! companion service has vouched for the assertion.

use crate::models::{
    RejectReason, RemoteIdentity, SsoSettings, UnavailableReason, VerificationOutcome,
};
use crate::services::user_store::UserStore;

/// Map a verified remote assertion onto a local account.
pub async fn resolve(
    assertion: &RemoteIdentity,
    settings: &SsoSettings,
    store: &dyn UserStore,
) -> VerificationOutcome {
    let existing = match store.find_by_name(&assertion.username).await {
        Ok(existing) => existing,
        Err(e) => {
            tracing::error!(username = %assertion.username, error = %e, "User store lookup failed");
            return VerificationOutcome::Unavailable(UnavailableReason::StoreError(e.to_string()));
        }
    };

    match existing {
        Some(user) => {
            if settings.sync_admin_status && user.is_admin != assertion.is_admin {
                // Best effort: a privilege-sync failure never fails the verification.
                if let Err(e) = store.set_admin(user.id, assertion.is_admin).await {
                    tracing::warn!(
                        username = %user.username,
                        error = %e,
                        "Failed to sync admin status; continuing"
                    );
                }
            }

            VerificationOutcome::Verified {
                user_id: user.id,
                username: user.username,
            }
        }
        None if settings.auto_create_users => match store.create(&assertion.username).await {
            Ok(user) => {
                tracing::info!(username = %user.username, user_id = %user.id, "Created new SSO user");

                if settings.sync_admin_status && assertion.is_admin {
                    if let Err(e) = store.set_admin(user.id, true).await {
                        tracing::warn!(
                            username = %user.username,
                            error = %e,
                            "Failed to sync admin status; continuing"
                        );
                    }
                }

                VerificationOutcome::Verified {
                    user_id: user.id,
                    username: user.username,
                }
            }
            Err(e) => {
                // Provisioning failure is an infrastructure fault, not an
                // authentication rejection.
                tracing::error!(username = %assertion.username, error = %e, "User creation failed");
                VerificationOutcome::Unavailable(UnavailableReason::StoreError(e.to_string()))
            }
        },
        None => VerificationOutcome::Rejected(RejectReason::UnknownUser),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_store::{InMemoryUserStore, UserStoreError};
    use async_trait::async_trait;
    use secrecy::Secret;
    use uuid::Uuid;

    fn settings(auto_create: bool, sync_admin: bool) -> SsoSettings {
        SsoSettings {
            companion_base_url: "http://localhost:3000".to_string(),
            shared_secret: Secret::new(String::new()),
            enabled: true,
            auto_create_users: auto_create,
            sync_admin_status: sync_admin,
            log_attempts: false,
        }
    }

    fn assertion(username: &str, is_admin: bool) -> RemoteIdentity {
        RemoteIdentity {
            username: username.to_string(),
            email: None,
            is_admin,
            display_name: None,
        }
    }

    /// Store whose every call fails, for the infrastructure-fault paths.
    struct FailingStore;

    #[async_trait]
    impl UserStore for FailingStore {
        async fn find_by_name(
            &self,
            _username: &str,
        ) -> Result<Option<crate::models::LocalUser>, UserStoreError> {
            Err(UserStoreError::Backend("store down".to_string()))
        }

        async fn create(
            &self,
            _username: &str,
        ) -> Result<crate::models::LocalUser, UserStoreError> {
            Err(UserStoreError::Backend("store down".to_string()))
        }

        async fn set_admin(&self, _user_id: Uuid, _is_admin: bool) -> Result<(), UserStoreError> {
            Err(UserStoreError::Backend("store down".to_string()))
        }
    }

    #[tokio::test]
    async fn existing_user_verifies_without_creation() {
        let store = InMemoryUserStore::new();
        let alice = store.insert("alice", false).await;

        let outcome = resolve(&assertion("alice", false), &settings(true, false), &store).await;
        assert_eq!(
            outcome,
            VerificationOutcome::Verified {
                user_id: alice.id,
                username: "alice".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unknown_user_is_created_when_auto_create_on() {
        let store = InMemoryUserStore::new();

        let outcome = resolve(&assertion("alice", false), &settings(true, false), &store).await;
        let created = store.find_by_name("alice").await.unwrap().unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::Verified {
                user_id: created.id,
                username: "alice".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_when_auto_create_off() {
        let store = InMemoryUserStore::new();

        let outcome = resolve(&assertion("alice", false), &settings(false, false), &store).await;
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(RejectReason::UnknownUser)
        );
        assert!(store.find_by_name("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admin_flag_is_synced_when_enabled() {
        let store = InMemoryUserStore::new();
        store.insert("alice", false).await;

        resolve(&assertion("alice", true), &settings(true, true), &store).await;
        assert!(store.find_by_name("alice").await.unwrap().unwrap().is_admin);
    }

    #[tokio::test]
    async fn admin_flag_is_left_alone_when_sync_disabled() {
        let store = InMemoryUserStore::new();
        store.insert("alice", false).await;

        resolve(&assertion("alice", true), &settings(true, false), &store).await;
        assert!(!store.find_by_name("alice").await.unwrap().unwrap().is_admin);
    }

    #[tokio::test]
    async fn created_admin_gets_flag_applied() {
        let store = InMemoryUserStore::new();

        let outcome = resolve(&assertion("root", true), &settings(true, true), &store).await;
        assert!(matches!(outcome, VerificationOutcome::Verified { .. }));
        assert!(store.find_by_name("root").await.unwrap().unwrap().is_admin);
    }

    #[tokio::test]
    async fn store_failure_is_unavailable_not_rejected() {
        let outcome = resolve(&assertion("alice", false), &settings(true, false), &FailingStore).await;
        assert!(matches!(
            outcome,
            VerificationOutcome::Unavailable(UnavailableReason::StoreError(_))
        ));
    }
}
