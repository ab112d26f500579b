//! WebSocket client with ping/pong keepalive
//!
//! One `WsConnection` is one socket. There is no reconnection here: a dropped
//! socket ends the stream, and whoever owns the session state decides whether
//! to open a new one.

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// WebSocket client factory
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Open a connection.
    ///
    /// The handshake completes before this returns, so connection errors are
    /// reported here. A background task then pumps frames in both directions
    /// and keeps the socket alive with pings.
    pub async fn connect(&self) -> Result<WsConnection, WsError> {
        if self.config.ping_interval.is_zero() {
            return Err(WsError::InvalidConfig("ping interval must be non-zero".into()));
        }

        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        for (name, value) in &self.config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| WsError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| WsError::InvalidHeader(name.as_str().to_string()))?;
            request.headers_mut().insert(name, value);
        }

        tracing::info!(url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, _response) =
            tokio::time::timeout(self.config.connect_timeout, connect_async(request))
                .await
                .map_err(|_| WsError::ConnectTimeout)?
                .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        tracing::info!("WebSocket connected");

        let (msg_tx, msg_rx) = mpsc::channel(self.config.buffer_size);
        let (send_tx, send_rx) = mpsc::channel(16);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            match pump(ws_stream, &config, &msg_tx, send_rx).await {
                Ok(()) => {
                    let _ = msg_tx.send(WsMessage::Disconnected).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket connection failed");
                    let _ = msg_tx.send(WsMessage::Failed(e)).await;
                }
            }
        });

        Ok(WsConnection {
            incoming: msg_rx,
            outgoing: send_tx,
            task,
        })
    }
}

/// An open WebSocket connection
pub struct WsConnection {
    incoming: mpsc::Receiver<WsMessage>,
    outgoing: mpsc::Sender<String>,
    task: JoinHandle<()>,
}

impl WsConnection {
    /// Queue a text frame for sending
    pub async fn send(&self, text: String) -> Result<(), WsError> {
        self.outgoing
            .send(text)
            .await
            .map_err(|_| WsError::ChannelClosed)
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once the connection has ended and every message has
    /// been delivered.
    pub async fn recv(&mut self) -> Option<WsMessage> {
        self.incoming.recv().await
    }

    /// Send a close frame and wait for the connection task to finish
    pub async fn close(self) {
        drop(self.outgoing);
        drop(self.incoming);
        let _ = self.task.await;
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Move frames between the socket and the channels until either side ends
async fn pump(
    ws_stream: WsStream,
    config: &WsConfig,
    tx: &mpsc::Sender<WsMessage>,
    mut send_rx: mpsc::Receiver<String>,
) -> Result<(), WsError> {
    let (mut write, mut read) = ws_stream.split();

    let mut ping_interval = tokio::time::interval(config.ping_interval);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // first tick fires immediately
    ping_interval.tick().await;

    let mut pong_deadline: Option<Instant> = None;

    loop {
        let deadline = pong_deadline;

        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(WsMessage::Text(text)).await.is_err() {
                            tracing::debug!("Receiver dropped, closing connection");
                            let _ = write.send(Message::Close(None)).await;
                            return Ok(());
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        if tx.send(WsMessage::Binary(data)).await.is_err() {
                            tracing::debug!("Receiver dropped, closing connection");
                            let _ = write.send(Message::Close(None)).await;
                            return Ok(());
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await
                            .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        pong_deadline = None;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(frame = ?frame, "Received close frame");
                        return Ok(());
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        return Err(WsError::ConnectionFailed(e.to_string()));
                    }
                    None => {
                        return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                    }
                }
            }

            msg = send_rx.recv() => {
                match msg {
                    Some(text) => {
                        write.send(Message::Text(text)).await
                            .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    }
                    None => {
                        // Owner closed the connection
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(());
                    }
                }
            }

            _ = ping_interval.tick() => {
                write.send(Message::Ping(vec![])).await
                    .map_err(|e| WsError::SendFailed(e.to_string()))?;
                if pong_deadline.is_none() {
                    pong_deadline = Some(Instant::now() + config.pong_timeout);
                }
            }

            _ = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            } => {
                return Err(WsError::PongTimeout);
            }
        }
    }
}
