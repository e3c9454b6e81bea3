//! In-Process Transport
//!
//! Channel-based companion link for embedded use and tests. No
//! serialization happens: events travel as values.
//!
//! ```ignore
//! let (mut transport, mut companion) = InProcessTransport::new_pair();
//! transport.send(ClientEvent::ClearKnowledge {}).await?;
//! let event = companion.events.recv().await;
//! companion.replies.send(ServerEvent::AgentsRegistered { count: 7 }).await?;
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CompanionTransport, TransportError};
use crate::protocol::{ClientEvent, ServerEvent};

/// Default channel capacity in each direction
pub const CHANNEL_CAPACITY: usize = 100;

/// Surface end of an in-process channel pair
pub struct InProcessTransport {
    events: mpsc::Sender<ClientEvent>,
    replies: mpsc::Receiver<ServerEvent>,
    connected: bool,
}

/// Companion end of an in-process channel pair
pub struct CompanionHandle {
    /// Events sent by the surface
    pub events: mpsc::Receiver<ClientEvent>,
    /// Replies delivered to the surface
    pub replies: mpsc::Sender<ServerEvent>,
}

impl InProcessTransport {
    /// Create a connected pair with the default capacity
    #[must_use]
    pub fn new_pair() -> (Self, CompanionHandle) {
        Self::new_pair_with_capacity(CHANNEL_CAPACITY)
    }

    /// Create a connected pair with a custom capacity
    #[must_use]
    pub fn new_pair_with_capacity(capacity: usize) -> (Self, CompanionHandle) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (reply_tx, reply_rx) = mpsc::channel(capacity);
        let transport = Self {
            events: event_tx,
            replies: reply_rx,
            connected: true,
        };
        let handle = CompanionHandle {
            events: event_rx,
            replies: reply_tx,
        };
        (transport, handle)
    }
}

#[async_trait]
impl CompanionTransport for InProcessTransport {
    async fn send(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::ConnectionClosed);
        }
        self.events
            .send(event)
            .await
            .map_err(|_| TransportError::SendFailed("Channel closed".to_string()))
    }

    async fn recv(&mut self) -> Result<ServerEvent, TransportError> {
        if !self.connected {
            return Err(TransportError::ConnectionClosed);
        }
        match self.replies.recv().await {
            Some(event) => Ok(event),
            None => {
                self.connected = false;
                Err(TransportError::ConnectionClosed)
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        self.replies.close();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
