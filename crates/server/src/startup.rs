use std::{future::Future, net::SocketAddr};

use axum::Router;
use configs::{AppConfig, ServerConfig};
use service::runtime::StoreRuntime;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Resolve the listen address from the server section
pub fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}:{}: {e}", server.host, server.port)))
}

/// Build the app and run the HTTP server until `shutdown` resolves, then close
/// the store's database connection.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let runtime = StoreRuntime::open(&cfg).await?;

    let state = AppState { store: runtime.store.clone() };
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, backend = ?cfg.storage.backend, "starting todo server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown).await;

    if let Err(e) = runtime.shutdown().await {
        error!(error = %e, "closing store failed");
    }
    served?;
    info!("todo server stopped");
    Ok(())
}
