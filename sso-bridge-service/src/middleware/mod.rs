pub mod admin;
pub mod metrics;
pub mod tracing;

pub use admin::admin_auth_middleware;
pub use metrics::metrics_middleware;
pub use tracing::request_id_middleware;
