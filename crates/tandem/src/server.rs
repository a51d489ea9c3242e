//! `TandemServer` builder and accept loop.
//!
//! This is the entry point for running a Tandem server. It ties the
//! layers together: transport → protocol → room registry → game.

use std::sync::Arc;
use std::time::Duration;

use tandem_game::GameConfig;
use tandem_protocol::{Codec, JsonCodec};
use tandem_room::{RoomConfig, RoomManager};
use tandem_transport::{Incoming, Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ServerConfig, TandemError};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
    pub(crate) ping_interval: Duration,
}

/// Builder for configuring and starting a Tandem server.
///
/// ```rust,no_run
/// use tandem::prelude::*;
///
/// # async fn start() -> Result<(), TandemError> {
/// let server = TandemServer::builder()
///     .bind("127.0.0.1:5000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TandemServerBuilder {
    config: ServerConfig,
}

impl TandemServerBuilder {
    /// Creates a builder with [`ServerConfig::default`] settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting at once, e.g. with [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = interval;
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.config.game = config;
        self
    }

    /// Binds the listener. Clients speak JSON over WebSocket.
    pub async fn build(mut self) -> Result<TandemServer<JsonCodec>, TandemError> {
        if self.config.ping_interval.is_zero() {
            tracing::warn!("ping_interval is zero, using default");
            self.config.ping_interval = ServerConfig::default().ping_interval;
        }
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new(self.config.room, self.config.game)),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
            ping_interval: self.config.ping_interval,
        });

        Ok(TandemServer { transport, state })
    }
}

/// A bound Tandem server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TandemServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl TandemServer<JsonCodec> {
    pub fn builder() -> TandemServerBuilder {
        TandemServerBuilder::new()
    }
}

impl<C: Codec> TandemServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning one task per client. The WebSocket
    /// upgrade runs on that task, so a client that stalls its handshake
    /// only delays itself. Runs until the task is dropped or the process
    /// exits.
    pub async fn run(mut self) -> Result<(), TandemError> {
        tracing::info!("Tandem server running");

        loop {
            let incoming = match self.transport.accept().await {
                Ok(incoming) => incoming,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    continue;
                }
            };

            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                let conn = match incoming.upgrade().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::debug!(error = %e, "dropped client during handshake");
                        return;
                    }
                };
                if let Err(e) = handle_connection(conn, state).await {
                    tracing::debug!(error = %e, "connection ended with error");
                }
            });
        }
    }
}
