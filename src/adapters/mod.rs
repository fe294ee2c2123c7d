//! Adapters connecting the ports to the monitoring server.

pub mod http;
pub mod websocket;

pub use http::ApiClient;
pub use websocket::{WebSocketChannel, WebSocketConnector};
