//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the KB proxy handlers
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Start the rate limit sweeper
//! - Serve until the shutdown signal fires

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::MakeRequestUuid;
use crate::proxy::handlers;
use crate::proxy::ProxyState;
use crate::security::rate_limit::run_sweeper;
use crate::upstream::UpstreamResult;

/// HTTP server for the knowledge-base gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: Arc<ProxyState>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> UpstreamResult<Self> {
        let state = Arc::new(ProxyState::from_config(&config)?);
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: Arc<ProxyState>) -> Router {
        Router::new()
            .route("/healthz", get(handlers::healthz))
            .route("/api/kb/info", get(handlers::kb_info))
            .route("/api/kb/list", get(handlers::kb_list))
            .route("/api/kb/doc/{*slug}", get(handlers::kb_document))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.http.request_timeout_secs,
                    )))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// A clone of the router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared proxy state (caches, limiter).
    pub fn state(&self) -> Arc<ProxyState> {
        self.state.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        if self.config.rate_limit.enabled {
            tokio::spawn(run_sweeper(
                self.state.limiter.clone(),
                Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
                shutdown.resubscribe(),
            ));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::http::{X_CACHE, X_REQUEST_ID};

    async fn get(router: Router, uri: &str) -> axum::response::Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_disabled_endpoints() {
        let server = HttpServer::new(GatewayConfig::default()).unwrap();

        for uri in ["/api/kb/info", "/api/kb/list", "/api/kb/doc/intro"] {
            let response = get(server.router(), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(response.headers().get(X_CACHE).is_none());
            assert_eq!(body_json(response).await["status"], "disabled");
        }
    }

    #[tokio::test]
    async fn test_healthz_and_request_id() {
        let server = HttpServer::new(GatewayConfig::default()).unwrap();
        let response = get(server.router(), "/healthz").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        let body = body_json(response).await;
        assert_eq!(body["status"], "operational");
        assert_eq!(body["upstream"], "disabled");
    }

    #[tokio::test]
    async fn test_invalid_upstream_url_fails_startup() {
        let mut config = GatewayConfig::default();
        config.upstream.enabled = true;
        config.upstream.base_url = Some("::not-a-url".into());
        assert!(HttpServer::new(config).is_err());
    }
}
