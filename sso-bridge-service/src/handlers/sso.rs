//! SSO validation and administration handlers.
//!
//! Maps verification outcomes onto the inbound wire contract: 400 for local
//! policy refusals, 401 for a remote denial, 502 when the companion cannot
//! be reached, 500 for store faults.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use secrecy::Secret;

use crate::dtos::{
    SsoConfigResponse, TestConnectionResponse, UpdateSsoConfigRequest, ValidateSsoRequest,
    ValidateSsoResponse,
};
use crate::error::AppError;
use crate::models::{RejectReason, UnavailableReason, VerificationOutcome};
use crate::AppState;

/// Validate an SSO token from the companion application.
pub async fn validate(
    State(state): State<AppState>,
    Json(payload): Json<ValidateSsoRequest>,
) -> Result<Json<ValidateSsoResponse>, AppError> {
    let outcome = state.sso.validate_token(&payload.token).await;

    match outcome {
        VerificationOutcome::Verified { user_id, username } => Ok(Json(ValidateSsoResponse {
            success: true,
            user_id,
            username,
            message: "Token validated successfully".to_string(),
        })),
        VerificationOutcome::Rejected(reason) => Err(reject_error(reason)),
        VerificationOutcome::Unavailable(reason) => Err(unavailable_error(reason)),
    }
}

fn reject_error(reason: RejectReason) -> AppError {
    match reason {
        RejectReason::SsoDisabled => AppError::BadRequest(anyhow::anyhow!("SSO is not enabled")),
        RejectReason::MissingToken => AppError::BadRequest(anyhow::anyhow!("Token is required")),
        RejectReason::MalformedResponse => {
            AppError::BadRequest(anyhow::anyhow!("Invalid user information in token"))
        }
        RejectReason::UnknownUser => AppError::BadRequest(anyhow::anyhow!(
            "User does not exist and auto-create is disabled"
        )),
        RejectReason::RemoteDenied(_) => AppError::Unauthorized(anyhow::anyhow!("Invalid token")),
    }
}

fn unavailable_error(reason: UnavailableReason) -> AppError {
    match reason {
        UnavailableReason::Timeout => {
            AppError::BadGateway("companion service timed out".to_string())
        }
        UnavailableReason::Transport(detail) => AppError::BadGateway(detail),
        UnavailableReason::StoreError(_) => {
            AppError::InternalError(anyhow::anyhow!("User store failure during provisioning"))
        }
    }
}

/// Read the SSO settings (admin only). The shared secret is never echoed.
pub async fn get_config(State(state): State<AppState>) -> Json<SsoConfigResponse> {
    let settings = state.sso.settings().snapshot().await;

    Json(SsoConfigResponse {
        enabled: settings.enabled,
        companion_url: settings.companion_base_url,
        auto_create_users: settings.auto_create_users,
        sync_admin_status: settings.sync_admin_status,
    })
}

/// Replace parts of the SSO settings (admin only). Takes effect on the next
/// verification call.
pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSsoConfigRequest>,
) -> Json<SsoConfigResponse> {
    let mut settings = state.sso.settings().snapshot().await;

    if let Some(url) = payload.companion_base_url {
        settings.companion_base_url = url;
    }
    if let Some(secret) = payload.shared_secret {
        settings.shared_secret = Secret::new(secret);
    }
    if let Some(enabled) = payload.enabled {
        settings.enabled = enabled;
    }
    if let Some(auto_create) = payload.auto_create_users {
        settings.auto_create_users = auto_create;
    }
    if let Some(sync_admin) = payload.sync_admin_status {
        settings.sync_admin_status = sync_admin;
    }
    if let Some(log_attempts) = payload.log_attempts {
        settings.log_attempts = log_attempts;
    }

    tracing::info!(
        enabled = settings.enabled,
        auto_create_users = settings.auto_create_users,
        sync_admin_status = settings.sync_admin_status,
        "SSO settings updated"
    );

    state.sso.settings().replace(settings.clone()).await;

    Json(SsoConfigResponse {
        enabled: settings.enabled,
        companion_url: settings.companion_base_url,
        auto_create_users: settings.auto_create_users,
        sync_admin_status: settings.sync_admin_status,
    })
}

/// Probe connectivity to the companion service (admin only).
pub async fn test_connection(
    State(state): State<AppState>,
) -> (StatusCode, Json<TestConnectionResponse>) {
    let result = state.sso.test_connection().await;

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    (
        status,
        Json(TestConnectionResponse {
            success: result.success,
            message: result.message,
            timestamp: Utc::now(),
        }),
    )
}
