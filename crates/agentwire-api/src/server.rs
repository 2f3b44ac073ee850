//! API server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use agentwire_config::ServerConfig;

use crate::error::ApiError;
use crate::http::routes::create_router;
use crate::state::AppState;

/// Listen address options.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
}

impl ServerOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl From<&ServerConfig> for ServerOptions {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

/// The HTTP/WebSocket server.
pub struct ApiServer {
    options: ServerOptions,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(options: ServerOptions, state: Arc<AppState>) -> Self {
        Self { options, state }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.options.host, self.options.port)
    }

    /// Bind the listen socket.
    pub async fn bind(&self) -> Result<TcpListener, ApiError> {
        let addr = self.addr();
        let socket: SocketAddr = addr.parse().map_err(|e: std::net::AddrParseError| {
            ApiError::InvalidAddress {
                addr: addr.clone(),
                reason: e.to_string(),
            }
        })?;
        TcpListener::bind(socket)
            .await
            .map_err(|source| ApiError::Bind { addr, source })
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ApiError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state.clone());
        if let Ok(local) = listener.local_addr() {
            info!("API server listening on {}", local);
        }
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("API server stopped");
        Ok(())
    }

    /// Bind and serve until Ctrl-C.
    pub async fn run(&self) -> Result<(), ApiError> {
        let listener = self.bind().await?;
        self.serve(listener, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
    }
}
