//! WebSocket Transport
//!
//! One JSON text frame per event (see [`crate::protocol`]). Pings are
//! answered by tungstenite on the next read; binary frames are ignored and
//! malformed text frames are logged and skipped rather than closing the
//! channel.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{CompanionTransport, TransportError};
use crate::protocol::{self, ClientEvent, ServerEvent};

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client connection to a companion process
pub struct WebSocketTransport {
    url: String,
    stream: Option<Stream>,
}

impl WebSocketTransport {
    /// Connect to the companion at `url` (`ws://host:port`)
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ConnectionFailed` if the handshake fails.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{url}: {e}")))?;
        tracing::info!(%url, "Connected to companion");
        Ok(Self {
            url: url.to_string(),
            stream: Some(stream),
        })
    }

    /// Companion address
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompanionTransport for WebSocketTransport {
    async fn send(&mut self, event: ClientEvent) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::ConnectionClosed)?;
        let frame = protocol::encode(&event)?;
        stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Result<ServerEvent, TransportError> {
        loop {
            let stream = self.stream.as_mut().ok_or(TransportError::ConnectionClosed)?;
            match stream.next().await {
                Some(Ok(Message::Text(text))) => match protocol::decode::<ServerEvent>(&text) {
                    Ok(event) => return Ok(event),
                    Err(e) => tracing::warn!(error = %e, "Skipping malformed companion frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(url = %self.url, ?frame, "Companion closed the connection");
                    self.stream = None;
                    return Err(TransportError::ConnectionClosed);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
                None => {
                    self.stream = None;
                    return Err(TransportError::ConnectionClosed);
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .close(None)
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
