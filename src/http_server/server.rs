//! # HTTP Server
//!
//! Admin API server: health check plus the `/tables` routes.

use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::observability::{Event, Logger};
use crate::orchestrator::SchemaOrchestrator;

use super::config::HttpServerConfig;
use super::table_routes::{table_routes, TablesState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// HTTP server for the admin API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, orchestrator: SchemaOrchestrator) -> Self {
        let router = Self::build_router(&config, orchestrator);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, orchestrator: SchemaOrchestrator) -> Router {
        let tables_state = Arc::new(TablesState::new(orchestrator));

        Router::new()
            .route("/health", get(health_handler))
            .nest("/tables", table_routes(tables_state))
            .layer(config.cors_layer())
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Binds and serves until the listener fails.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.listen_addr()?;

        let listener = TcpListener::bind(addr).await?;
        Logger::event(Event::Serving, &[("addr", &addr.to_string())]);
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
