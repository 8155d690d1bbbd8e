//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::mcp::{self, McpServer};
use super::routes::health;
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let mut router = Router::new().route("/api/v1/health", get(health::health));

        if app.config.mcp.enabled {
            let mcp_server = McpServer::new(
                app.benchmarks.clone(),
                Arc::new(app.config.clone()),
                app.http.clone(),
            );
            let ct = mcp::cancellation_token_from_shutdown(&shutdown);
            router = router.nest("/mcp", mcp::routes(mcp_server, ct));
        }

        let router = router
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            addr = %addr,
            mcp = app.config.mcp.enabled,
            "Server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
