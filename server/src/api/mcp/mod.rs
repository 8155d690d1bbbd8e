use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::core::shutdown::ShutdownService;

mod tools;
mod types;

pub use self::tools::McpServer;

type McpService = StreamableHttpService<McpServer>;

/// Shared state for MCP routes. Sessions are managed by a single shared
/// `LocalSessionManager`; the per-request `StreamableHttpService` is cheap
/// to construct (three Arc clones).
#[derive(Clone)]
struct McpRouterState {
    server: McpServer,
    ct: CancellationToken,
    session_manager: Arc<LocalSessionManager>,
}

pub fn routes(server: McpServer, ct: CancellationToken) -> Router<()> {
    let state = McpRouterState {
        server,
        ct,
        session_manager: Arc::new(LocalSessionManager::default()),
    };

    Router::new().fallback(mcp_proxy).with_state(state)
}

async fn mcp_proxy(State(state): State<McpRouterState>, req: axum::extract::Request) -> Response {
    let server = state.server.clone();
    let svc = McpService::new(
        move || Ok(server.clone()),
        state.session_manager.clone(),
        StreamableHttpServerConfig {
            cancellation_token: state.ct.clone(),
            ..Default::default()
        },
    );
    svc.oneshot(req).await.unwrap().into_response()
}

/// Bridge the shutdown signal into the cancellation token the MCP transport
/// expects, so open sessions close on shutdown.
pub fn cancellation_token_from_shutdown(shutdown: &ShutdownService) -> CancellationToken {
    let token = CancellationToken::new();
    let mut rx = shutdown.subscribe();
    let t = token.clone();
    tokio::spawn(async move {
        let _ = rx.wait_for(|&v| v).await;
        t.cancel();
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancellation_token_follows_shutdown() {
        let shutdown = ShutdownService::new();
        let token = cancellation_token_from_shutdown(&shutdown);
        assert!(!token.is_cancelled());

        shutdown.trigger();
        tokio::time::timeout(std::time::Duration::from_millis(100), token.cancelled())
            .await
            .unwrap();
    }
}
