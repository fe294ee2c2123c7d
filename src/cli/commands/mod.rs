//! CLI command implementations.

pub mod login;
pub mod logout;
pub mod visibility;
pub mod watch;
pub mod whoami;

use serde::Serialize;

use crate::cli::output::{action_success, CommandOutput};
use crate::domain::models::LoginInfo;

/// Identity as reported by the server, shared by login and whoami.
#[derive(Debug, Serialize)]
pub struct IdentityOutput {
    /// Server's answer for the stored token.
    pub logged_in: bool,
    /// Login name.
    pub username: Option<String>,
    /// First and last name, when the server knows them.
    pub display_name: Option<String>,
}

impl From<Option<LoginInfo>> for IdentityOutput {
    fn from(info: Option<LoginInfo>) -> Self {
        match info {
            Some(info) => Self {
                logged_in: info.is_logged_in,
                display_name: info.display_name(),
                username: info.username,
            },
            None => Self {
                logged_in: false,
                username: None,
                display_name: None,
            },
        }
    }
}

impl CommandOutput for IdentityOutput {
    fn to_human(&self) -> String {
        if !self.logged_in {
            return "Not logged in".to_string();
        }
        match (&self.display_name, &self.username) {
            (Some(name), Some(username)) if name != username => {
                action_success(&format!("Logged in as {name} ({username})"))
            }
            (_, Some(username)) => action_success(&format!("Logged in as {username}")),
            (Some(name), None) => action_success(&format!("Logged in as {name}")),
            (None, None) => action_success("Logged in"),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
