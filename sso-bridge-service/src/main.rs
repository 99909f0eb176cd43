use sso_bridge_service::services::metrics::init_metrics;
use sso_bridge_service::{config::Config, Application};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sso_bridge_service=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    init_metrics();

    let config = Config::from_env().expect("Failed to load configuration");
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
