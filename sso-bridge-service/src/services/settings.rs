//! Hot-updatable holder for the SSO settings.
//!
//! Administrators may change settings at any time; verification calls read
//! one coherent snapshot so the base URL and secret never tear.

use crate::models::SsoSettings;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<SsoSettings>>,
}

impl SettingsStore {
    pub fn new(initial: SsoSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Clone the current settings as one coherent snapshot.
    pub async fn snapshot(&self) -> SsoSettings {
        self.inner.read().await.clone()
    }

    /// Replace the settings wholesale.
    pub async fn replace(&self, next: SsoSettings) {
        *self.inner.write().await = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::{ExposeSecret, Secret};

    fn settings(url: &str) -> SsoSettings {
        SsoSettings {
            companion_base_url: url.to_string(),
            shared_secret: Secret::new("s3cret".to_string()),
            enabled: true,
            auto_create_users: true,
            sync_admin_status: false,
            log_attempts: false,
        }
    }

    #[tokio::test]
    async fn snapshot_reflects_replace() {
        let store = SettingsStore::new(settings("http://one"));
        assert_eq!(store.snapshot().await.companion_base_url, "http://one");

        let mut next = settings("http://two");
        next.enabled = false;
        store.replace(next).await;

        let snap = store.snapshot().await;
        assert_eq!(snap.companion_base_url, "http://two");
        assert!(!snap.enabled);
        assert_eq!(snap.shared_secret.expose_secret(), "s3cret");
    }
}
