//! Error types for the transport layer.

use std::net::SocketAddr;

use crate::ConnectionId;

/// Boxed cause from the underlying socket or WebSocket library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The peer connected but the WebSocket upgrade failed.
    #[error("handshake with {peer} failed: {source}")]
    Handshake {
        peer: SocketAddr,
        #[source]
        source: BoxError,
    },

    /// The peer connected but never finished the upgrade.
    #[error("handshake with {peer} timed out")]
    HandshakeTimeout { peer: SocketAddr },

    /// Writing to an open connection failed.
    #[error("send on {id} failed: {source}")]
    Send {
        id: ConnectionId,
        #[source]
        source: BoxError,
    },

    /// Reading from an open connection failed.
    #[error("receive on {id} failed: {source}")]
    Receive {
        id: ConnectionId,
        #[source]
        source: BoxError,
    },
}

impl TransportError {
    /// `true` for failures caused by one misbehaving peer during accept.
    /// The listener itself is fine and should keep accepting.
    pub fn is_handshake(&self) -> bool {
        matches!(self, Self::Handshake { .. } | Self::HandshakeTimeout { .. })
    }
}
