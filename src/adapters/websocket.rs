//! WebSocket transport for the push channel using tokio-tungstenite.
//!
//! Text frames are yielded as-is, binary frames are decoded as UTF-8.
//! Ping/pong is answered by tungstenite; a close frame ends the stream.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{Channel, ChannelConnector};
use crate::infrastructure::logging::scrub;

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens push channels over WebSocket.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// Create a connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChannelConnector for WebSocketConnector {
    async fn open(&self, endpoint: &str) -> DomainResult<Box<dyn Channel>> {
        let (stream, response) = connect_async(endpoint)
            .await
            .map_err(|e| DomainError::Transport(format!("websocket connect to {endpoint} failed: {e}")))?;
        tracing::debug!(endpoint, status = %response.status(), "websocket opened");
        Ok(Box::new(WebSocketChannel { stream }))
    }
}

/// One open WebSocket connection.
pub struct WebSocketChannel {
    stream: Stream,
}

#[async_trait]
impl Channel for WebSocketChannel {
    async fn send_text(&mut self, text: &str) -> DomainResult<()> {
        self.stream
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| DomainError::Transport(format!("websocket send failed: {}", scrub(&e.to_string()))))
    }

    async fn next_frame(&mut self) -> Option<DomainResult<String>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => {
                    return Some(Err(DomainError::Transport(format!(
                        "websocket receive failed: {e}"
                    ))))
                }
            };

            match message {
                Message::Text(text) => return Some(Ok(text)),
                Message::Binary(data) => {
                    return Some(String::from_utf8(data).map_err(|e| {
                        DomainError::Decode(format!("binary frame is not UTF-8: {e}"))
                    }))
                }
                Message::Close(frame) => {
                    tracing::debug!(?frame, "websocket close frame received");
                    return None;
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) -> DomainResult<()> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(DomainError::Transport(format!("websocket close failed: {e}"))),
        }
    }
}
