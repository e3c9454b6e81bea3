//! Companion Server
//!
//! WebSocket server every surface connects to:
//! - Accepts TCP connections and upgrades them to WebSocket
//! - Spawns a handler task per connection
//! - Broadcasts conversation events to every surface
//! - Runs agent follow-up turns in a background task
//!
//! ```text
//!                    CompanionServer
//!                          │
//!          ┌───────────────┼───────────────┐
//!          │               │               │
//!      TUI surface    Web surface     Test client
//!       (conn-1)        (conn-2)        (conn-3)
//!          │               │               │
//!          └──── broadcast::Sender<ServerEvent> ────┐
//!                          │                        │
//!                 ConversationManager ──► continuation task
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use dashmap::DashMap;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio::task::AbortHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use halo_conductor::protocol::{decode, encode};
use halo_conductor::{ClientEvent, ServerEvent};

use crate::manager::ConversationManager;

/// Gap between several replies within one turn
const REPLY_GAP: Duration = Duration::from_millis(300);

type Outbound = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Unique id for one surface connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Fresh random id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state tracking
struct ConnectionState {
    /// When the connection was established
    connected_at: Instant,
    /// Remote address
    peer: SocketAddr,
    /// Handle to abort the connection task
    abort_handle: AbortHandle,
}

/// Configuration for the companion server
pub struct ServerConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Events buffered per surface before it starts lagging
    pub broadcast_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_connections: 32,
            broadcast_capacity: 256,
        }
    }
}

/// State every connection task shares
#[derive(Clone)]
struct Shared {
    manager: Arc<Mutex<ConversationManager>>,
    updates: broadcast::Sender<ServerEvent>,
    continuation: Arc<Mutex<Option<AbortHandle>>>,
}

impl Shared {
    fn broadcast(&self, event: ServerEvent) {
        // Nobody listening is fine; the next surface gets fresh state
        if self.updates.send(event).is_err() {
            debug!("Broadcast with no connected surfaces");
        }
    }
}

/// The companion server
pub struct CompanionServer {
    config: ServerConfig,
    shared: Shared,
    connection_states: Arc<DashMap<ConnectionId, ConnectionState>>,
}

impl CompanionServer {
    /// Server with default limits; `seed` makes replies reproducible
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_config(seed, ServerConfig::default())
    }

    /// Server with explicit limits
    #[must_use]
    pub fn with_config(seed: Option<u64>, config: ServerConfig) -> Self {
        let (updates, _) = broadcast::channel(config.broadcast_capacity);
        Self {
            config,
            shared: Shared {
                manager: Arc::new(Mutex::new(ConversationManager::new(seed))),
                updates,
                continuation: Arc::new(Mutex::new(None)),
            },
            connection_states: Arc::new(DashMap::new()),
        }
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Currently infallible once the listener is bound; accept errors are
    /// logged and the loop continues.
    pub async fn run(&self, listener: TcpListener, shutdown: impl Future<Output = ()>) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "Listening for surfaces");
        }
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                        continue;
                    }
                },
            };

            if self.connection_states.len() >= self.config.max_connections {
                warn!(%peer, "Connection limit reached, rejecting new connection");
                drop(stream);
                continue;
            }

            let conn_id = ConnectionId::new();
            info!(
                conn_id = %conn_id,
                %peer,
                active_connections = self.connection_states.len() + 1,
                "New connection accepted"
            );

            // The handler only starts once its state entry exists, so its
            // removal on exit can never run ahead of the insert
            let (start_tx, start_rx) = oneshot::channel::<()>();
            let handler = Self::handle_connection(
                conn_id,
                stream,
                self.shared.clone(),
                Arc::clone(&self.connection_states),
            );
            let task = tokio::spawn(
                async move {
                    if start_rx.await.is_ok() {
                        handler.await;
                    }
                }
                .instrument(tracing::info_span!("connection", %conn_id)),
            );

            self.connection_states.insert(
                conn_id,
                ConnectionState {
                    connected_at: Instant::now(),
                    peer,
                    abort_handle: task.abort_handle(),
                },
            );
            let _ = start_tx.send(());
        }

        self.shutdown().await;
        Ok(())
    }

    /// Serve one surface until it disconnects
    async fn handle_connection(
        conn_id: ConnectionId,
        stream: TcpStream,
        shared: Shared,
        connection_states: Arc<DashMap<ConnectionId, ConnectionState>>,
    ) {
        let ws = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!(error = %e, "WebSocket handshake failed");
                connection_states.remove(&conn_id);
                return;
            }
        };
        info!("Connection handler started");

        let (mut outbound, mut inbound) = ws.split();
        let mut updates = shared.updates.subscribe();

        let hello = ServerEvent::ConnectionResponse {
            status: "connected".to_string(),
            sid: conn_id.to_string(),
        };
        if Self::send_event(&mut outbound, &hello).await {
            loop {
                tokio::select! {
                    frame = inbound.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let direct = match decode::<ClientEvent>(&text) {
                                Ok(event) => {
                                    debug!(event = ?event, "Received event");
                                    Self::dispatch(&shared, event).await
                                }
                                Err(e) => {
                                    warn!(error = %e, "Failed to decode event frame");
                                    vec![ServerEvent::Error {
                                        message: format!("Malformed event: {e}"),
                                    }]
                                }
                            };
                            let mut open = true;
                            for event in &direct {
                                open = open && Self::send_event(&mut outbound, event).await;
                            }
                            if !open {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Surface disconnected");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(error = %e, "Read error");
                            break;
                        }
                    },

                    update = updates.recv() => match update {
                        Ok(event) => {
                            if !Self::send_event(&mut outbound, &event).await {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Surface lagging, events dropped");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        }

        connection_states.remove(&conn_id);
        info!(
            active_connections = connection_states.len(),
            "Connection handler finished"
        );
    }

    /// Apply one event; returns what goes back to the sender only
    async fn dispatch(shared: &Shared, event: ClientEvent) -> Vec<ServerEvent> {
        let outcome = shared.manager.lock().await.handle_event(event);
        for event in outcome.broadcast {
            shared.broadcast(event);
        }
        if outcome.continue_conversation {
            Self::spawn_continuation(shared).await;
        }
        outcome.direct
    }

    /// Let agents keep talking, replacing any run already in progress
    async fn spawn_continuation(shared: &Shared) {
        let turns = shared.manager.lock().await.continuation_turns();
        let task_shared = shared.clone();
        let task = tokio::spawn(
            async move {
                for turn in 0..turns {
                    let pause = task_shared.manager.lock().await.turn_pause();
                    tokio::time::sleep(pause).await;

                    let events = task_shared.manager.lock().await.continue_turn();
                    if events.is_empty() {
                        break;
                    }
                    debug!(turn, events = events.len(), "Follow-up turn");
                    for (i, event) in events.into_iter().enumerate() {
                        if i > 0 && matches!(event, ServerEvent::NewMessage(_)) {
                            tokio::time::sleep(REPLY_GAP).await;
                        }
                        task_shared.broadcast(event);
                    }
                }
                debug!("Continuation finished");
            }
            .instrument(tracing::info_span!("continuation", turns)),
        );

        if let Some(previous) = shared.continuation.lock().await.replace(task.abort_handle()) {
            previous.abort();
        }
    }

    /// Abort every connection and the continuation task
    async fn shutdown(&self) {
        info!("Initiating graceful shutdown");

        let conn_ids: Vec<ConnectionId> = self.connection_states.iter().map(|r| *r.key()).collect();
        for conn_id in conn_ids {
            if let Some((_, state)) = self.connection_states.remove(&conn_id) {
                info!(conn_id = %conn_id, "Aborting connection");
                state.abort_handle.abort();
            }
        }
        if let Some(task) = self.shared.continuation.lock().await.take() {
            task.abort();
        }

        info!("Shutdown complete");
    }

    /// Number of active connections
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connection_states.len()
    }

    /// Per-connection statistics
    #[must_use]
    pub fn connection_stats(&self) -> HashMap<ConnectionId, ConnectionStats> {
        self.connection_states
            .iter()
            .map(|r| {
                let state = r.value();
                (
                    *r.key(),
                    ConnectionStats {
                        peer: state.peer,
                        uptime_secs: state.connected_at.elapsed().as_secs(),
                    },
                )
            })
            .collect()
    }

    /// Write one event to a surface; false once the socket is gone
    async fn send_event(outbound: &mut Outbound, event: &ServerEvent) -> bool {
        let frame = match encode(event) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to encode event");
                return true;
            }
        };
        match outbound.send(Message::Text(frame)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Write error");
                false
            }
        }
    }
}

/// Statistics for a single connection
#[derive(Debug, Clone)]
pub struct ConnectionStats {
    /// Remote address
    pub peer: SocketAddr,
    /// Connection uptime in seconds
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use halo_conductor::RosterEntry;
    use pretty_assertions::assert_eq;
    use tokio_tungstenite::connect_async;

    async fn next_event<S>(socket: &mut S) -> ServerEvent
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return decode(&text).unwrap(),
                Some(Ok(_)) => continue,
                other => panic!("socket ended: {other:?}"),
            }
        }
    }

    #[test]
    fn test_connection_id_display() {
        let formatted = ConnectionId::new().to_string();
        assert!(formatted.starts_with("conn-"));
        assert_eq!(formatted.len(), 41);
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.max_connections, 32);
        assert_eq!(config.broadcast_capacity, 256);
    }

    #[tokio::test]
    async fn test_surface_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(CompanionServer::new(Some(5)));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let running = Arc::clone(&server);
        let handle = tokio::spawn(async move {
            running
                .run(listener, async {
                    let _ = stop_rx.await;
                })
                .await
        });

        let (mut socket, _) = connect_async(format!("ws://{addr}")).await.unwrap();
        let ServerEvent::ConnectionResponse { status, sid } = next_event(&mut socket).await else {
            panic!("expected connection_response");
        };
        assert_eq!(status, "connected");
        assert!(sid.starts_with("conn-"));
        assert_eq!(server.connection_count(), 1);

        let mut agents = BTreeMap::new();
        for (i, name) in ["YOU", "Osiris"].iter().enumerate() {
            agents.insert(
                i.to_string(),
                RosterEntry {
                    name: (*name).to_string(),
                    personality: Vec::new(),
                },
            );
        }
        let frame = encode(&ClientEvent::RegisterAgents { agents }).unwrap();
        socket.send(Message::Text(frame)).await.unwrap();
        assert_eq!(
            next_event(&mut socket).await,
            ServerEvent::AgentsRegistered { count: 2 }
        );

        socket
            .send(Message::Text("not json".to_string()))
            .await
            .unwrap();
        assert!(matches!(
            next_event(&mut socket).await,
            ServerEvent::Error { .. }
        ));

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(server.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_handshakes_leave_no_connection_state() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(CompanionServer::new(Some(5)));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let running = Arc::clone(&server);
        let handle = tokio::spawn(async move {
            running
                .run(listener, async {
                    let _ = stop_rx.await;
                })
                .await
        });

        for _ in 0..16 {
            let mut raw = TcpStream::connect(addr).await.unwrap();
            raw.write_all(b"not a websocket upgrade\r\n\r\n").await.unwrap();
            let mut rest = Vec::new();
            let _ = raw.read_to_end(&mut rest).await;
        }

        tokio::time::timeout(Duration::from_secs(5), async {
            while server.connection_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("handshake failures left connection state behind");

        // A real surface still gets in afterwards
        let (mut socket, _) = connect_async(format!("ws://{addr}")).await.unwrap();
        assert!(matches!(
            next_event(&mut socket).await,
            ServerEvent::ConnectionResponse { .. }
        ));
        assert_eq!(server.connection_count(), 1);

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(server.connection_count(), 0);
    }
}
