//! `Server` builder and run loop.
//!
//! Ties the layers together: the axum HTTP API and the duplex accept
//! loop share one [`AppState`] and run side by side until ctrl-c.

use std::net::SocketAddr;

use gridfire_game::GameConfig;
use gridfire_transport::WebSocketTransport;
use tokio::net::TcpListener;

use crate::{http, ws, AppState, GridfireError};

/// Builder for configuring and starting a Gridfire server.
pub struct ServerBuilder {
    http_addr: String,
    ws_addr: String,
    game_config: GameConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            http_addr: "127.0.0.1:8080".to_string(),
            ws_addr: "127.0.0.1:8081".to_string(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the HTTP API bind address.
    pub fn http_addr(mut self, addr: &str) -> Self {
        self.http_addr = addr.to_string();
        self
    }

    /// Sets the duplex (WebSocket) bind address.
    pub fn ws_addr(mut self, addr: &str) -> Self {
        self.ws_addr = addr.to_string();
        self
    }

    /// Sets the gameplay configuration shared by all sessions.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Binds both listeners and assembles the server.
    pub async fn build(self) -> Result<Server, GridfireError> {
        let http_listener = TcpListener::bind(&self.http_addr).await?;
        tracing::info!(addr = %self.http_addr, "HTTP API listening");
        let transport = WebSocketTransport::bind(&self.ws_addr).await?;

        Ok(Server {
            http_listener,
            transport,
            state: AppState::new(self.game_config),
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Gridfire server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct Server {
    http_listener: TcpListener,
    transport: WebSocketTransport,
    state: AppState,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The bound HTTP address (useful with port 0).
    pub fn http_addr(&self) -> Result<SocketAddr, GridfireError> {
        Ok(self.http_listener.local_addr()?)
    }

    /// The bound duplex address (useful with port 0).
    pub fn ws_addr(&self) -> Result<SocketAddr, GridfireError> {
        Ok(self.transport.local_addr()?)
    }

    /// A clone of the shared state (lobby registry + session manager).
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serves HTTP and the duplex channel until ctrl-c.
    pub async fn run(self) -> Result<(), GridfireError> {
        let app = http::router(self.state.clone());
        tracing::info!("Gridfire server running");

        tokio::select! {
            result = axum::serve(self.http_listener, app) => {
                result?;
            }
            _ = ws::run_accept_loop(self.transport, self.state) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
            }
        }
        Ok(())
    }
}
