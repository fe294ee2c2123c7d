//! Domain models for the user session.
//!
//! Identity is owned by the server; the client only mirrors what the
//! identity endpoint reports for the current bearer token.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity reported for the current credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInfo {
    /// Server's view of whether the token is valid.
    #[serde(default)]
    pub is_logged_in: bool,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
}

impl LoginInfo {
    /// Human readable name, falling back to the username.
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => self.username.clone(),
        }
    }
}

/// Successful token exchange response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque bearer token.
    pub access_token: String,
    /// Always `bearer` for this server.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// Tokens never end up in logs through Debug.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Lifecycle of the persistent push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No channel.
    Disconnected,
    /// Channel is being opened.
    Connecting,
    /// Channel is open, token not sent yet.
    AwaitingAuth,
    /// Token sent; push events flow.
    Connected,
}

impl ConnectionState {
    /// Whether push events can arrive.
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingAuth => "awaiting_auth",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}
