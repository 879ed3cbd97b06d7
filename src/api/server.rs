//! Serving the back-office API.
//!
//! `start_api_server` binds the listener before returning, so a port
//! conflict surfaces to the caller and `local_addr()` reports the real
//! port even when the configured one was 0. Serving runs in a tokio task
//! that stops once `shutdown()` fires its oneshot.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::core_state::CoreState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Cannot read the bound address: {0}")]
    LocalAddr(std::io::Error),
}

/// A running API server.
pub struct ApiServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections. In-flight requests finish first.
    /// Calling it again does nothing.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the serving task to end.
    pub async fn stopped(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "API server task panicked");
            }
        }
    }
}

pub async fn start_api_server(
    core: Arc<CoreState>,
    addr: SocketAddr,
) -> Result<ApiServer, ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = api_router(core);

    let task = tokio::spawn(async move {
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
        match served {
            Ok(()) => tracing::info!(addr = %local_addr, "API server stopped"),
            Err(e) => tracing::error!(addr = %local_addr, error = %e, "API server failed"),
        }
    });

    Ok(ApiServer {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use crate::core_state::test_support::test_state;

    const NO_UPSTREAM: &str = "http://127.0.0.1:9/v1";

    fn any_local_port() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    async fn start(dir: &tempfile::TempDir) -> ApiServer {
        let core = Arc::new(test_state(dir, NO_UPSTREAM));
        start_api_server(core, any_local_port()).await.unwrap()
    }

    #[tokio::test]
    async fn reports_the_ephemeral_port_it_bound() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = start(&dir).await;

        let addr = server.local_addr();
        assert_ne!(addr.port(), 0);
        assert!(addr.ip().is_loopback());

        let resp = reqwest::get(format!("http://{addr}/api/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");

        server.shutdown();
    }

    #[tokio::test]
    async fn serves_storage_writes_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = start(&dir).await;
        let base = format!("http://{}", server.local_addr());
        let client = reqwest::Client::new();

        let resp = client
            .put(format!("{base}/api/preferences/theme"))
            .json(&serde_json::json!({ "value": "light" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = client
            .get(format!("{base}/api/preferences/theme"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["value"], "light");

        let resp = client.get(format!("{base}/outside-api")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_ends_the_serving_task() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = start(&dir).await;
        let addr = server.local_addr();

        server.shutdown();
        server.shutdown();
        tokio::time::timeout(Duration::from_secs(5), server.stopped())
            .await
            .expect("server should stop after shutdown");

        assert!(reqwest::get(format!("http://{addr}/api/health")).await.is_err());
    }

    #[tokio::test]
    async fn occupied_port_is_a_bind_error() {
        let dir = tempfile::tempdir().unwrap();
        let taken = TcpListener::bind(any_local_port()).await.unwrap();
        let addr = taken.local_addr().unwrap();

        let core = Arc::new(test_state(&dir, NO_UPSTREAM));
        match start_api_server(core, addr).await {
            Err(ServerError::Bind { addr: reported, .. }) => assert_eq!(reported, addr),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("second bind on {addr} should fail"),
        }
    }
}
