//! HTTP server lifecycle.
//!
//! Bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::state::AppState;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind the configured address, mount the router and serve in a
/// background tokio task.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    tracing::info!(%addr, "API server binding");

    let app = api_router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The TempDir is returned so the database file survives until the
    // test ends.
    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server-test.db");
        (AppState::new(path), dir)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (state, _dir) = test_state();
        let mut server = start_server(state, addr)
            .await
            .expect("server should start");

        assert!(server.addr.port() > 0);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (state, _dir) = test_state();
        let mut server = start_server(state, addr)
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}
