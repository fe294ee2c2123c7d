/// Integration tests for the REST adapter
///
/// Test coverage:
/// - Bearer header present only when a token is stored
/// - Snapshot query shape (subject key, lookback window)
/// - `null` detail response maps to "record gone"
/// - Visibility toggle returns the affected count
/// - 401 classification
/// - Token exchange form body and verbatim rejection detail
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use studyfeed::adapters::ApiClient;
use studyfeed::domain::models::{AppConfig, Level, LevelMask, RecordId, Subject};
use studyfeed::domain::ports::{FeedbackClient, LogQuery, LoginClient, VisibilityRequest};
use studyfeed::infrastructure::credentials::MemoryTokenStorage;
use studyfeed::{CredentialStore, DomainError};

fn client_for(server: &ServerGuard, token: Option<&str>) -> ApiClient {
    let config = AppConfig {
        api_base_url: format!("{}/api/1", server.url()),
        token_url: format!("{}/token", server.url()),
        ..AppConfig::default()
    };
    let storage = match token {
        Some(token) => MemoryTokenStorage::with_token(token),
        None => MemoryTokenStorage::new(),
    };
    let credentials = Arc::new(CredentialStore::new(Arc::new(storage)));
    ApiClient::new(&config, credentials).expect("Failed to create client")
}

fn record_body(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "study_id": 7,
        "study": "pilot",
        "event_on": "2024-03-01T10:00:00.123",
        "registered_on": "2024-03-01 10:00:01",
        "recorded_on": null,
        "level": "WARNING",
        "device": "scanner-1",
        "description": "trigger arrived late"
    })
}

#[tokio::test]
async fn test_fetch_log_sends_bearer_and_subject_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/1/feedback/get_message_log")
        .match_header("authorization", "Bearer tok-123")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("study_id".into(), "7".into()),
            Matcher::UrlEncoded("interval_sec".into(), "3600".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([record_body(11), record_body(12)]).to_string())
        .create_async()
        .await;

    let client = client_for(&server, Some("tok-123"));
    let records = assert_ok!(
        client
            .fetch_log(&LogQuery {
                subject: Subject::Study(7),
                lookback: Some(Duration::from_secs(3600)),
            })
            .await
    );

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, RecordId(11));
    assert_eq!(records[0].level, Level::Warning);
    assert!(records[0].recorded_on.is_none());
}

#[tokio::test]
async fn test_no_token_means_no_authorization_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/1/feedback/get_message_log")
        .match_header("authorization", Matcher::Missing)
        .match_query(Matcher::UrlEncoded("category_id".into(), "3".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = client_for(&server, None);
    let records = client
        .fetch_log(&LogQuery {
            subject: Subject::Category(3),
            lookback: None,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_fetch_one_null_means_gone() {
    let mut server = Server::new_async().await;
    let gone = server
        .mock("GET", "/api/1/feedback/get_message")
        .match_query(Matcher::UrlEncoded("message_id".into(), "99".into()))
        .with_status(200)
        .with_body("null")
        .create_async()
        .await;
    let present = server
        .mock("GET", "/api/1/feedback/get_message")
        .match_query(Matcher::UrlEncoded("message_id".into(), "11".into()))
        .with_status(200)
        .with_body(record_body(11).to_string())
        .create_async()
        .await;

    let client = client_for(&server, Some("tok"));
    assert!(client.fetch_one(RecordId(99)).await.unwrap().is_none());
    let record = client.fetch_one(RecordId(11)).await.unwrap().unwrap();
    assert_eq!(record.description.as_deref(), Some("trigger arrived late"));

    gone.assert_async().await;
    present.assert_async().await;
}

#[tokio::test]
async fn test_set_visibility_returns_affected_count() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/1/feedback/set_message_log_visibility")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("study_id".into(), "7".into()),
            Matcher::UrlEncoded("visible".into(), "false".into()),
            Matcher::UrlEncoded("level".into(), "*".into()),
        ]))
        .with_status(200)
        .with_body("5")
        .create_async()
        .await;

    let client = client_for(&server, Some("tok"));
    let affected = client
        .set_visibility(&VisibilityRequest {
            subject: Subject::Study(7),
            visible: false,
            level: LevelMask::Any,
            lookback: None,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(affected, 5);
}

#[tokio::test]
async fn test_unauthorized_and_server_errors_are_classified() {
    let mut server = Server::new_async().await;
    let _identity = server
        .mock("GET", "/api/1/login/get_current_user")
        .with_status(401)
        .with_body(r#"{"detail":"Not authenticated"}"#)
        .create_async()
        .await;
    let _log = server
        .mock("GET", "/api/1/feedback/get_message_log")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = client_for(&server, Some("expired"));
    let err = assert_err!(client.current_user().await);
    assert!(matches!(err, DomainError::Unauthorized(_)), "got {err:?}");

    let err = client
        .fetch_log(&LogQuery {
            subject: Subject::Study(1),
            lookback: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Fetch(_)), "got {err:?}");
}

#[tokio::test]
async fn test_current_user_decodes_identity() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/1/login/get_current_user")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"is_logged_in": true, "username": "jdoe", "first_name": "Jane"}"#)
        .create_async()
        .await;

    let info = client_for(&server, Some("tok")).current_user().await.unwrap();
    assert!(info.is_logged_in);
    assert_eq!(info.display_name().as_deref(), Some("Jane"));
}

#[tokio::test]
async fn test_access_token_posts_password_form() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "jdoe".into()),
            Matcher::UrlEncoded("password".into(), "s3cret&more".into()),
            Matcher::UrlEncoded("grant_type".into(), "password".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token": "fresh", "token_type": "bearer"}"#)
        .create_async()
        .await;

    let token = client_for(&server, Some("stale"))
        .access_token("jdoe", "s3cret&more")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(token.access_token, "fresh");
}

#[tokio::test]
async fn test_rejected_login_keeps_server_detail() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/token")
        .with_status(401)
        .with_body(r#"{"detail": "Incorrect username or password"}"#)
        .create_async()
        .await;

    let err = client_for(&server, None)
        .access_token("jdoe", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::LoginRejected(_)));
    assert_eq!(err.to_string(), "Incorrect username or password");
}

#[tokio::test]
async fn test_rejected_login_without_detail_reports_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/token")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let err = client_for(&server, None)
        .access_token("jdoe", "pw")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Login failed (502 Bad Gateway)");
}
