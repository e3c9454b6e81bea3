//! Transport Layer for the Companion Channel
//!
//! The scene engine never blocks on the network: surfaces own a transport,
//! hand it the scheduler's outbox between frames and feed whatever arrives
//! back through [`FrameScheduler::handle_server_event`].
//!
//! - [`InProcessTransport`]: a channel pair, used embedded and in tests
//! - `WebSocketTransport` (feature `websocket`): JSON text frames to a
//!   companion process
//!
//! When no transport is available the surface runs fully local and the
//! scheduler's responder answers instead.
//!
//! [`FrameScheduler::handle_server_event`]: crate::FrameScheduler::handle_server_event

mod in_process;
#[cfg(feature = "websocket")]
mod websocket;

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{ClientEvent, ProtocolError, ServerEvent};

pub use in_process::{CompanionHandle, InProcessTransport, CHANNEL_CAPACITY};
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

/// Errors that can occur on the companion channel
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach the companion
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The peer went away
    #[error("Connection closed")]
    ConnectionClosed,

    /// Failed to hand an event to the peer
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Failed to read from the peer
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Frame could not be encoded or decoded
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Surface side of the companion channel
///
/// `recv` must be cancellation safe: surfaces poll it inside `tokio::select!`
/// alongside input and the frame tick.
#[async_trait]
pub trait CompanionTransport: Send {
    /// Send one event to the companion
    async fn send(&mut self, event: ClientEvent) -> Result<(), TransportError>;

    /// Wait for the next event from the companion
    async fn recv(&mut self) -> Result<ServerEvent, TransportError>;

    /// Close the channel
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Whether the channel is still open
    fn is_connected(&self) -> bool;
}

/// Open the WebSocket transport for `url`
///
/// # Errors
///
/// Returns `TransportError::ConnectionFailed` when the companion cannot be
/// reached.
#[cfg(feature = "websocket")]
pub async fn connect_companion(url: &str) -> Result<Box<dyn CompanionTransport>, TransportError> {
    let transport = WebSocketTransport::connect(url).await?;
    Ok(Box::new(transport))
}
