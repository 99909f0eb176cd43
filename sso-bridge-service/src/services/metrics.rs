use crate::models::{RejectReason, UnavailableReason, VerificationOutcome};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static SSO_VERIFICATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }

    let registry = Registry::new();

    let verifications_counter = IntCounterVec::new(
        Opts::new(
            "sso_verifications_total",
            "Total SSO verification attempts by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create sso_verifications_total metric");

    registry
        .register(Box::new(verifications_counter.clone()))
        .expect("Failed to register sso_verifications_total");

    PROMETHEUS_REGISTRY
        .set(registry)
        .expect("Failed to set prometheus registry");
    SSO_VERIFICATIONS_TOTAL
        .set(verifications_counter)
        .expect("Failed to set sso_verifications_total");
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record one verification attempt by its outcome.
pub fn record_verification(outcome: &VerificationOutcome) {
    if let Some(counter) = SSO_VERIFICATIONS_TOTAL.get() {
        counter.with_label_values(&[outcome_label(outcome)]).inc();
    }
}

fn outcome_label(outcome: &VerificationOutcome) -> &'static str {
    match outcome {
        VerificationOutcome::Verified { .. } => "verified",
        VerificationOutcome::Rejected(RejectReason::SsoDisabled) => "sso_disabled",
        VerificationOutcome::Rejected(RejectReason::MissingToken) => "missing_token",
        VerificationOutcome::Rejected(RejectReason::RemoteDenied(_)) => "remote_denied",
        VerificationOutcome::Rejected(RejectReason::MalformedResponse) => "malformed_response",
        VerificationOutcome::Rejected(RejectReason::UnknownUser) => "unknown_user",
        VerificationOutcome::Unavailable(UnavailableReason::Timeout) => "timeout",
        VerificationOutcome::Unavailable(UnavailableReason::Transport(_)) => "transport_error",
        VerificationOutcome::Unavailable(UnavailableReason::StoreError(_)) => "store_error",
    }
}
