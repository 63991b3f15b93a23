//! Integration tests for the service-account authenticator using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tmplctl_http::{ServiceAuthenticator, build_http_client};
use tmplctl_remote::{Authenticator, RemoteError};

fn create_authenticator(server: &MockServer) -> ServiceAuthenticator {
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    ServiceAuthenticator::new(http, &server.uri(), "svc-1", "secret-1")
}

async fn mount_login(server: &MockServer, expiration: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/ums/v2/services/accessToken"))
        .and(body_json(json!({"id": "svc-1", "secretKey": "secret-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "jwt-1",
            "accessTokenExpiration": expiration
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_token_is_cached_until_near_expiry() {
    let server = MockServer::start().await;
    mount_login(&server, "2999-01-01T00:00:00Z", 1).await;

    let auth = create_authenticator(&server);
    let first = auth.access_token().await.unwrap();
    let second = auth.access_token().await.unwrap();

    assert_eq!(first.as_str(), "jwt-1");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_token_close_to_expiry_is_refreshed() {
    let server = MockServer::start().await;
    // Expires within the refresh buffer, so it is never reused.
    mount_login(&server, "2000-01-01T00:00:00Z", 2).await;

    let auth = create_authenticator(&server);
    auth.access_token().await.unwrap();
    auth.access_token().await.unwrap();
}

#[tokio::test]
async fn test_unparsable_expiry_is_not_reused() {
    let server = MockServer::start().await;
    mount_login(&server, "not-a-timestamp", 2).await;

    let auth = create_authenticator(&server);
    auth.access_token().await.unwrap();
    auth.access_token().await.unwrap();
}

#[tokio::test]
async fn test_invalidate_forces_login() {
    let server = MockServer::start().await;
    mount_login(&server, "2999-01-01T00:00:00Z", 2).await;

    let auth = create_authenticator(&server);
    auth.access_token().await.unwrap();
    auth.invalidate().await;
    auth.access_token().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_callers_share_one_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ums/v2/services/accessToken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "accessToken": "jwt-1",
                    "accessTokenExpiration": "2999-01-01T00:00:00Z"
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = Arc::new(create_authenticator(&server));
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let auth = Arc::clone(&auth);
            tokio::spawn(async move { auth.access_token().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().as_str(), "jwt-1");
    }
}

#[tokio::test]
async fn test_login_failure_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ums/v2/services/accessToken"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "INVALID_CREDENTIALS",
            "message": "bad secret",
            "traceId": "trace-3"
        })))
        .mount(&server)
        .await;

    let err = create_authenticator(&server).access_token().await.unwrap_err();

    assert!(matches!(err, RemoteError::Authentication { .. }));
    let message = err.to_string();
    assert!(message.contains("service ID [svc-1]"));
    assert!(message.contains("INVALID_CREDENTIALS"));
    assert!(!message.contains("secret-1"));
}
