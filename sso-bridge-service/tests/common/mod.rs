use secrecy::Secret;
use sso_bridge_service::config::{Config, SecurityConfig, ServerConfig};
use sso_bridge_service::models::SsoSettings;
use sso_bridge_service::services::{InMemoryUserStore, UserStore};
use sso_bridge_service::Application;
use std::sync::Arc;
use wiremock::MockServer;

pub const TEST_ADMIN_KEY: &str = "test-admin-key";
pub const TEST_SHARED_SECRET: &str = "test-shared-secret";

pub struct TestApp {
    pub address: String,
    /// Fake companion service; mount expectations on it per test.
    pub companion: MockServer,
    pub users: Arc<InMemoryUserStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with adjusted SSO settings (toggles, alternate base URL).
    pub async fn spawn_with(customize: impl FnOnce(&mut SsoSettings)) -> Self {
        let companion = MockServer::start().await;

        let mut sso = SsoSettings {
            companion_base_url: companion.uri(),
            shared_secret: Secret::new(TEST_SHARED_SECRET.to_string()),
            enabled: true,
            auto_create_users: true,
            sync_admin_status: false,
            log_attempts: false,
        };
        customize(&mut sso);

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            security: SecurityConfig {
                admin_api_key: Secret::new(TEST_ADMIN_KEY.to_string()),
            },
            sso,
            service_name: "sso-bridge-service-test".to_string(),
        };

        let users = Arc::new(InMemoryUserStore::new());
        let store: Arc<dyn UserStore> = users.clone();

        let app = Application::build_with_store(config, store)
            .await
            .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            companion,
            users,
            client: reqwest::Client::new(),
        }
    }

    pub async fn validate(&self, token: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/sso/validate", self.address))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .expect("validate request failed")
    }

    pub async fn admin_get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header("X-Admin-Api-Key", TEST_ADMIN_KEY)
            .send()
            .await
            .expect("admin request failed")
    }
}
