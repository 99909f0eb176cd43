pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{CompanionClient, InMemoryUserStore, SettingsStore, SsoService, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sso: SsoService,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the shipped in-memory user store.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
        Self::build_with_store(config, users).await
    }

    /// Build with an injected user store.
    ///
    /// This is the dependency-injection seam for the host's real user store;
    /// nothing in the service reaches for a process-wide instance.
    pub async fn build_with_store(
        config: Config,
        users: Arc<dyn UserStore>,
    ) -> anyhow::Result<Self> {
        let settings = SettingsStore::new(config.sso.clone());
        let sso = SsoService::new(CompanionClient::new(), settings, users);

        let state = AppState {
            config: config.clone(),
            sso,
        };

        // Privileged routes, guarded by the admin API key.
        let admin_routes = Router::new()
            .route(
                "/sso/config",
                get(handlers::sso::get_config).put(handlers::sso::update_config),
            )
            .route("/sso/test", get(handlers::sso::test_connection))
            .layer(from_fn_with_state(
                state.clone(),
                middleware::admin_auth_middleware,
            ));

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics))
            .route("/sso/validate", post(handlers::sso::validate))
            .merge(admin_routes)
            .layer(from_fn(middleware::metrics_middleware))
            .layer(from_fn(middleware::request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .with_state(state);

        // Port 0 yields a random port, used by the test harness.
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        tracing::info!("SSO bridge listening on {}", listener.local_addr()?);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        axum::serve(self.listener, self.router).await?;

        Ok(())
    }
}
