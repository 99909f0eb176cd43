use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use secrecy::ExposeSecret;
use serde_json::json;
use subtle::ConstantTimeEq;

/// Guard for the privileged `/sso/config` and `/sso/test` routes.
///
/// Stands in for the host's administrator-role policy: callers present the
/// startup-configured key in `X-Admin-Api-Key`, compared in constant time.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let api_key = headers
        .get("X-Admin-Api-Key")
        .and_then(|value| value.to_str().ok());

    let expected = state.config.security.admin_api_key.expose_secret();
    let authorized = api_key
        .map(|key| bool::from(key.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!("Failed admin authentication attempt");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized: Invalid or missing admin API key" })),
        )
            .into_response()
    }
}
