//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the legacy endpoints
//! - Wire up middleware (request ID, tracing, body limit, charset repair)
//! - Own the session cache and the fallback credential
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::backend::{BackendClient, BackendResult, Credential};
use crate::config::ProxyConfig;
use crate::http::handlers::{beep, get_list, get_text, send_actions};
use crate::http::request::{make_span, normalize_content_type, track_metrics};
use crate::session::{resolve_credential, SessionCache};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub sessions: SessionCache,
    pub fallback: Credential,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            sessions: SessionCache::new(config.backend.clone()),
            fallback: Credential::new(config.auth.fallback_token.trim()),
        }
    }

    /// Resolve the request's credential and return its session.
    pub async fn client_for(&self, access_token: Option<&str>) -> BackendResult<Arc<BackendClient>> {
        let credential = resolve_credential(access_token, &self.fallback);
        tracing::debug!(credential = %credential.fingerprint(), "Credential resolved");
        self.sessions.get_or_connect(&credential).await
    }
}

/// HTTP server for the legacy API.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState::new(&config);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// There is no request-level timeout: backend calls are bounded by the
    /// backend client's own timeout and are never cancelled mid-flight.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/v3/send", post(send_actions))
            .route("/v3/get", post(get_list))
            .route("/v3beta/text", post(get_text))
            .route("/beep", get(beep))
            .with_state(state)
            .layer(middleware::from_fn(normalize_content_type))
            .layer(middleware::from_fn(track_metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// A handle to the router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.api_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}
