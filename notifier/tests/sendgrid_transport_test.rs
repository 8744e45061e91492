//! Integration tests for the SendGrid mail transport.
//!
//! These tests run the transport against a mock SendGrid API and verify the
//! request it sends and how it maps response statuses to errors.

use std::sync::Arc;

use huc_notifier::config::MailConfig;
use huc_notifier::error::NotifierError;
use huc_notifier::homepage::WatchedHomepage;
use huc_notifier::transport::{MailTransport, SendGridTransport, TransportError};
use huc_notifier::types::Episode;
use huc_notifier::user::User;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

/// Creates a transport pointed at the mock server.
fn create_test_transport(server_url: &str) -> SendGridTransport {
    let config = MailConfig::new("SG.test-key".to_string(), "digest@example.com".to_string())
        .with_base_url(server_url);
    SendGridTransport::new(config).expect("client should build")
}

// =============================================================================
// Transport Tests
// =============================================================================

/// Verifies the request carries the API key and the SendGrid v3 body.
#[tokio::test]
async fn test_send_posts_v3_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("authorization", "Bearer SG.test-key"))
        .and(body_partial_json(serde_json::json!({
            "personalizations": [{ "to": [{ "email": "viewer@example.com" }] }],
            "from": { "email": "digest@example.com" },
            "subject": "Episode updates",
            "content": [{ "type": "text/html", "value": "<h1>Episode updates</h1>" }]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_test_transport(&mock_server.uri());
    let result = transport
        .send("viewer@example.com", "<h1>Episode updates</h1>")
        .await;

    assert!(result.is_ok(), "Send should succeed: {:?}", result);
}

/// Verifies that 401 maps to an authentication failure.
#[tokio::test]
async fn test_unauthorized_maps_to_auth_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let transport = create_test_transport(&mock_server.uri());
    let result = transport.send("viewer@example.com", "<p>body</p>").await;

    assert!(matches!(result, Err(TransportError::AuthFailed)));
}

/// Verifies that other error statuses carry status and response body.
#[tokio::test]
async fn test_server_error_maps_to_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_test_transport(&mock_server.uri());
    let result = transport.send("viewer@example.com", "<p>body</p>").await;

    match result {
        Err(TransportError::Rejected { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

// =============================================================================
// End-to-End Tests
// =============================================================================

/// A homepage announcement flows through the user into one SendGrid request.
#[tokio::test]
async fn test_user_flush_through_sendgrid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(body_partial_json(serde_json::json!({
            "personalizations": [{ "to": [{ "email": "viewer@example.com" }] }]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_test_transport(&mock_server.uri());
    let homepage = Arc::new(WatchedHomepage::new("https://a.example/show"));
    let user = Arc::new(User::new("viewer@example.com"));
    user.add_homepage_notifications(homepage.clone());

    homepage.announce(&[Episode::new(1, "https://a.example/show/1", "Pilot")]);

    assert!(user.send_updates(&transport).await.unwrap());
    assert!(!user.has_pending());

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let html = body["content"][0]["value"].as_str().unwrap();
    assert!(html.contains(r#"[1] <a href="https://a.example/show/1">Pilot</a>"#));
}

/// A rejected delivery keeps the backlog for the next flush.
#[tokio::test]
async fn test_user_flush_rejected_keeps_backlog() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&mock_server)
        .await;

    let transport = create_test_transport(&mock_server.uri());
    let user = User::new("viewer@example.com");
    user.add_update_notification(
        "https://a.example/show",
        Episode::new(1, "https://a.example/show/1", "Pilot"),
    );

    let err = user.send_updates(&transport).await.unwrap_err();

    assert!(matches!(
        err,
        NotifierError::Transport(TransportError::Rejected { status: 503, .. })
    ));
    assert_eq!(user.pending_count(), 1);
}
