//! Site client contract tests against a stub server.
//!
//! Covers the request shape of check-in and profile calls, cookie handling
//! for the challenge, and how HTTP failures map onto `SiteError`.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use anycheckin_infrastructure::config::SiteConfig;
use anycheckin_infrastructure::http::{SiteClient, SiteError};

mod test_helpers;

const ARG1: &str = "1111111111111111111111111111111111111111";
const SOLVED: &str = "2111067111947117170410422112781136911264";

fn client_for(server: &MockServer) -> SiteClient {
    SiteClient::new(SiteConfig::default().with_base_url(server.uri())).expect("Valid base url")
}

fn challenge_page() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<html><script>var arg1='{}';</script></html>",
        ARG1
    ))
}

fn cookie_contains(expected: String) -> impl Fn(&Request) -> bool + Send + Sync + 'static {
    move |request: &Request| {
        request
            .headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .map(|cookies| cookies.split("; ").any(|c| c == expected))
            .unwrap_or(false)
    }
}

fn without_header(name: &'static str) -> impl Fn(&Request) -> bool + Send + Sync + 'static {
    move |request: &Request| !request.headers.contains_key(name)
}

// ────────────────────────────────────────────────────────────────────────────
// check_in
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_in_sends_session_and_challenge_cookie() {
    let server = MockServer::start().await;
    let session = test_helpers::session_for(42, "alice");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .expect(1)
        .mount(&server)
        .await;

    let body = r#"{"success":true,"message":"签到成功"}"#;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .and(cookie_contains(format!("session={}", session)))
        .and(cookie_contains(format!("acw_sc__v2={}", SOLVED)))
        .and(header("cache-control", "no-store"))
        .and(header("origin", server.uri().as_str()))
        .and(header(
            "referer",
            format!("{}/console/personal", server.uri()).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client_for(&server)
        .check_in(&session)
        .await
        .expect("Check-in should succeed");
    assert_eq!(raw, body);
}

#[tokio::test]
async fn test_check_in_accepts_cookie_header_input() {
    let server = MockServer::start().await;
    let session = test_helpers::session_for(7, "bob");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .and(cookie_contains(format!("session={}", session)))
        .respond_with(ResponseTemplate::new(200).set_body_string("今日已签到"))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client_for(&server)
        .check_in(&format!("foo=bar; session={}; other=1", session))
        .await
        .expect("Check-in should succeed");
    assert_eq!(raw, "今日已签到");
}

#[tokio::test]
async fn test_check_in_without_challenge_still_posts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>welcome</html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .and(cookie_contains("session=abc".to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":false}"#))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client_for(&server)
        .check_in("abc")
        .await
        .expect("Check-in should succeed");
    // The body is returned as-is; classification happens elsewhere
    assert_eq!(raw, r#"{"success":false}"#);
}

#[tokio::test]
async fn test_check_in_unauthorized_is_session_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let result = client_for(&server).check_in("expired").await;
    assert!(matches!(result, Err(SiteError::SessionInvalid(_))));
}

#[tokio::test]
async fn test_check_in_server_error_is_transport() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = client_for(&server).check_in("abc").await;
    assert!(matches!(result, Err(SiteError::Transport(_))));
}

#[tokio::test]
async fn test_check_in_empty_session_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(challenge_page())
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server).check_in("   ").await;
    assert!(matches!(result, Err(SiteError::EmptySession)));
}

// ────────────────────────────────────────────────────────────────────────────
// fetch_self
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_self_parses_profile_and_sends_user_header() {
    let server = MockServer::start().await;
    let session = test_helpers::session_for(42, "alice");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .and(header("new-api-user", "42"))
        .and(cookie_contains(format!("acw_sc__v2={}", SOLVED)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "data": {"id": 42, "username": "alice", "role": 1, "status": 1, "quota": 12_345_678}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = client_for(&server)
        .fetch_self(&session, 42)
        .await
        .expect("Profile should load");
    assert_eq!(profile.user_id, 42);
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.quota, 12_345_678);
    assert_eq!(profile.balance, 24.69);
}

#[tokio::test]
async fn test_fetch_self_retries_once_without_user_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .and(header("new-api-user", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "无权进行此操作，未登录且未提供 access token"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .and(without_header("new-api-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 6, "username": "carol", "quota": 500000}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = client_for(&server)
        .fetch_self("abc", 5)
        .await
        .expect("Retry without header should succeed");
    assert_eq!(profile.user_id, 6);
    assert_eq!(profile.balance, 1.0);
}

#[tokio::test]
async fn test_fetch_self_without_hint_does_not_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_self("abc", 0).await;
    assert!(matches!(result, Err(SiteError::SessionInvalid(_))));
}

#[tokio::test]
async fn test_fetch_self_remote_failure_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(challenge_page())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "maintenance"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_self("abc", 9).await;
    assert!(matches!(result, Err(SiteError::Remote(ref msg)) if msg == "maintenance"));
}
