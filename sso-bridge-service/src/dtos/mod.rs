use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound body for `POST /sso/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateSsoRequest {
    /// Opaque token issued by the companion service. A missing field is
    /// treated the same as an empty one.
    #[serde(default)]
    pub token: String,
}

/// Successful validation response.
#[derive(Debug, Serialize)]
pub struct ValidateSsoResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub username: String,
    pub message: String,
}

/// Administrative view of the SSO settings. Never carries the shared secret.
#[derive(Debug, Serialize)]
pub struct SsoConfigResponse {
    pub enabled: bool,
    pub companion_url: String,
    pub auto_create_users: bool,
    pub sync_admin_status: bool,
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateSsoConfigRequest {
    pub companion_base_url: Option<String>,
    pub shared_secret: Option<String>,
    pub enabled: Option<bool>,
    pub auto_create_users: Option<bool>,
    pub sync_admin_status: Option<bool>,
    pub log_attempts: Option<bool>,
}

/// Result of the administrator-triggered connectivity probe.
#[derive(Debug, Serialize)]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
