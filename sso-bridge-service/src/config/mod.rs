use crate::models::SsoSettings;
use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub sso: SsoSettings,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct SecurityConfig {
    pub admin_api_key: Secret<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("SSO_BRIDGE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SSO_BRIDGE_PORT")
            .unwrap_or_else(|_| "3007".to_string())
            .parse()?;

        let admin_api_key =
            env::var("SSO_BRIDGE_ADMIN_API_KEY").unwrap_or_else(|_| "dev-admin-key".to_string());

        let companion_base_url = env::var("SSO_COMPANION_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let shared_secret = env::var("SSO_SHARED_SECRET").unwrap_or_default();

        Ok(Self {
            server: ServerConfig { host, port },
            security: SecurityConfig {
                admin_api_key: Secret::new(admin_api_key),
            },
            sso: SsoSettings {
                companion_base_url,
                shared_secret: Secret::new(shared_secret),
                enabled: env_flag("SSO_ENABLED", true),
                auto_create_users: env_flag("SSO_AUTO_CREATE_USERS", true),
                sync_admin_status: env_flag("SSO_SYNC_ADMIN_STATUS", true),
                log_attempts: env_flag("SSO_LOG_ATTEMPTS", true),
            },
            service_name: "sso-bridge-service".to_string(),
        })
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
