//! Identity and token exchange port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AccessToken, LoginInfo};

/// Port for identity and token-exchange endpoints.
#[async_trait]
pub trait LoginClient: Send + Sync {
    /// Identity associated with the current credential.
    async fn current_user(&self) -> DomainResult<LoginInfo>;

    /// Exchange a username/password pair for a bearer token.
    ///
    /// # Errors
    /// Returns `DomainError::LoginRejected` carrying the server's detail
    /// message when the credentials are refused.
    async fn access_token(&self, username: &str, password: &str) -> DomainResult<AccessToken>;
}
