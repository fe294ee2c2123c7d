//! Typed HTTP client for the feedback and login endpoints.
//!
//! Every API request carries `Authorization: Bearer <token>` when the
//! credential store holds a token. The token endpoint is called without it.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::models::ErrorDetail;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AccessToken, AppConfig, LogRecord, LoginInfo, RecordId};
use crate::domain::ports::{FeedbackClient, LogQuery, LoginClient, VisibilityRequest};
use crate::infrastructure::logging::scrub;
use crate::services::credential_store::CredentialStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("studyfeed/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the monitoring server REST API.
///
/// Network failures map to [`DomainError::Transport`], 401 responses to
/// [`DomainError::Unauthorized`], other non-2xx statuses to
/// [`DomainError::Fetch`] and unreadable bodies to [`DomainError::Decode`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    api_base_url: String,
    token_url: String,
    credentials: Arc<CredentialStore>,
}

impl ApiClient {
    /// Build a client for the configured API base and token endpoint.
    pub fn new(config: &AppConfig, credentials: Arc<CredentialStore>) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DomainError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Build a request with the bearer credential attached when present.
    fn authorized(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.request(method, url);
        match self.credentials.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> DomainResult<T> {
        let url = self.endpoint(path);
        tracing::debug!(operation, %url, "api request");

        let resp = self
            .authorized(Method::GET, &url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("{operation} request failed: {}", scrub(&e.to_string()))))?;

        let resp = check_status(operation, resp).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DomainError::Transport(format!("{operation} body read failed: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::Decode(format!("{operation} parse failed: {e}")))
    }
}

async fn check_status(operation: &'static str, resp: Response) -> DomainResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = scrub(&resp.text().await.unwrap_or_default());
    tracing::warn!(operation, %status, "api request rejected");
    if status == StatusCode::UNAUTHORIZED {
        return Err(DomainError::Unauthorized(format!("{operation} returned {status}: {body}")));
    }
    Err(DomainError::Fetch(format!("{operation} returned {status}: {body}")))
}

fn lookback_param(lookback: Option<Duration>) -> Option<(&'static str, String)> {
    lookback.map(|window| ("interval_sec", window.as_secs().to_string()))
}

#[async_trait]
impl FeedbackClient for ApiClient {
    async fn fetch_log(&self, query: &LogQuery) -> DomainResult<Vec<LogRecord>> {
        let mut params = vec![query.subject.query_pair()];
        params.extend(lookback_param(query.lookback));

        let records: Vec<LogRecord> = self
            .get_json("get_message_log", "feedback/get_message_log", &params)
            .await?;
        tracing::debug!(subject = %query.subject, count = records.len(), "message log fetched");
        Ok(records)
    }

    async fn fetch_one(&self, id: RecordId) -> DomainResult<Option<LogRecord>> {
        self.get_json(
            "get_message",
            "feedback/get_message",
            &[("message_id", id.to_string())],
        )
        .await
    }

    async fn set_visibility(&self, request: &VisibilityRequest) -> DomainResult<u64> {
        let mut params = vec![
            request.subject.query_pair(),
            ("visible", request.visible.to_string()),
            ("level", request.level.to_string()),
        ];
        params.extend(lookback_param(request.lookback));

        let affected: Value = self
            .get_json(
                "set_message_log_visibility",
                "feedback/set_message_log_visibility",
                &params,
            )
            .await?;
        affected.as_u64().ok_or_else(|| {
            DomainError::Decode(format!(
                "set_message_log_visibility returned a non-count value: {affected}"
            ))
        })
    }
}

#[async_trait]
impl LoginClient for ApiClient {
    async fn current_user(&self) -> DomainResult<LoginInfo> {
        self.get_json("get_current_user", "login/get_current_user", &[])
            .await
    }

    async fn access_token(&self, username: &str, password: &str) -> DomainResult<AccessToken> {
        tracing::debug!(username, url = %self.token_url, "requesting access token");
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("username", username),
                ("password", password),
                ("grant_type", "password"),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("token request failed: {}", scrub(&e.to_string()))))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DomainError::Transport(format!("token body read failed: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorDetail>(&bytes)
                .map(|body| body.message())
                .unwrap_or_else(|_| format!("Login failed ({status})"));
            return Err(DomainError::LoginRejected(detail));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::Decode(format!("token response parse failed: {e}")))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base_url", &self.api_base_url)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}
