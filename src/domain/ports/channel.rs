//! Push channel port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// One open persistent channel to the server.
#[async_trait]
pub trait Channel: Send {
    /// Send a raw text frame.
    async fn send_text(&mut self, text: &str) -> DomainResult<()>;

    /// Next inbound text frame.
    ///
    /// Returns `None` once the peer closed the channel. Transport errors are
    /// reported as `Some(Err(_))` and end the channel as well; a
    /// `DomainError::Decode` only drops that one frame.
    async fn next_frame(&mut self) -> Option<DomainResult<String>>;

    /// Close the channel from our side.
    async fn close(&mut self) -> DomainResult<()>;
}

/// Factory for channels; the transport seam of the connection manager.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    /// Open a channel to `endpoint`; no handshake is sent.
    async fn open(&self, endpoint: &str) -> DomainResult<Box<dyn Channel>>;
}
