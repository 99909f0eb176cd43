//! HTTP handlers for sso-bridge-service.

pub mod sso;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "sso-bridge-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
