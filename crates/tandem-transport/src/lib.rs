//! Transport layer for the Tandem server.
//!
//! The server's accept loop and connection handlers are written against
//! the [`Transport`], [`Incoming`] and [`Connection`] traits. Browsers connect over
//! WebSocket, which the `websocket` feature (on by default) provides via
//! `tokio-tungstenite`.

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

pub use error::{BoxError, TransportError};
#[cfg(feature = "websocket")]
pub use websocket::{
    HANDSHAKE_TIMEOUT, WebSocketConnection, WebSocketIncoming, WebSocketTransport,
};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for a connection.
///
/// The server uses it as the player's identity inside a room, so ids are
/// never reused while the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next id. Ids start at 1 and only grow.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw value, e.g. one read back from logs.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that hands out freshly accepted clients.
///
/// `accept` only waits for the socket. Any protocol upgrade happens in
/// [`Incoming::upgrade`], so callers can run it off the accept loop and a
/// slow client never holds up the next one.
pub trait Transport: Send + Sync + 'static {
    type Incoming: Incoming<Error = Self::Error>;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client socket.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;

    /// The address the listener is bound to.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// An accepted client that has not finished its protocol upgrade yet.
pub trait Incoming: Send + 'static {
    type Connection: Connection<Error = Self::Error>;
    type Error: std::error::Error + Send + Sync;

    fn peer_addr(&self) -> SocketAddr;

    /// Completes the upgrade. An error here (see
    /// [`TransportError::is_handshake`]) concerns this peer only.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// What [`Connection::recv`] hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One whole application message.
    Message(Vec<u8>),
    /// The peer answered a [`Connection::ping`].
    Pong,
}

/// One client connection carrying whole messages as bytes.
///
/// `send` and `recv` may be driven concurrently from the same task
/// (e.g. from two arms of a `tokio::select!`); a pending `recv` must not
/// block a `send`.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one message.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message or pong. `Ok(None)` means the peer
    /// closed the connection cleanly.
    async fn recv(&self) -> Result<Option<Inbound>, Self::Error>;

    /// Asks the peer for a [`Inbound::Pong`].
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Starts a clean close.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;
}
