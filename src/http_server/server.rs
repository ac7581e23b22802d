//! # HTTP Server
//!
//! Mounts the student and health routes under `/api`, wraps them in request
//! tracing and CORS, and serves until a shutdown signal arrives.

use std::future::Future;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::config::HttpServerConfig;
use super::errors::route_not_found;
use super::health_routes::health_routes;
use super::student_routes::{student_routes, StudentState};
use crate::store::StudentStore;

/// HTTP server for the student API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, store: Arc<dyn StudentStore>) -> Self {
        let router = Self::build_router(&config, store);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, store: Arc<dyn StudentStore>) -> Router {
        let student_state = Arc::new(StudentState::new(store));

        let api = Router::new()
            .merge(health_routes())
            .merge(student_routes(student_state));

        Router::new()
            .nest("/api", api)
            .fallback(route_not_found)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(cors_layer(config))
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serves until Ctrl-C or SIGTERM.
    pub async fn start(self) -> Result<(), std::io::Error> {
        self.serve_until(shutdown_signal()).await
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        tracing::info!(%addr, "student API listening");
        tracing::info!("health check: http://{}/api/health", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn server(config: HttpServerConfig) -> HttpServer {
        HttpServer::new(config, Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_server_creation() {
        assert_eq!(server(HttpServerConfig::default()).socket_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = server(HttpServerConfig::with_port(8080));
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_restricted_cors() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".into(), "not a\norigin".into()],
            ..Default::default()
        };
        let _router = server(config).router();
    }

    #[tokio::test]
    async fn test_serve_until_stops_on_signal() {
        let config = HttpServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
        };
        server(config).serve_until(async {}).await.unwrap();
    }

    async fn allow_origin_for(cors_origins: Vec<String>, origin: &str) -> Option<String> {
        let config = HttpServerConfig {
            cors_origins,
            ..Default::default()
        };
        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();

        let response = server(config).router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_any_origin_when_unconfigured() {
        let allowed = allow_origin_for(vec![], "http://ui.example.com").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_cors_echoes_listed_origin() {
        let origins = vec!["http://localhost:5173".to_string()];
        let allowed = allow_origin_for(origins, "http://localhost:5173").await;
        assert_eq!(allowed.as_deref(), Some("http://localhost:5173"));
    }

    #[tokio::test]
    async fn test_cors_omits_header_for_unlisted_origin() {
        let origins = vec!["http://localhost:5173".to_string()];
        let allowed = allow_origin_for(origins, "http://evil.example.com").await;
        assert_eq!(allowed, None);
    }
}
