//! End-to-end gateway tests over real HTTP: the reqwest transport talking to
//! a mockito server, exercising bearer attachment, the silent refresh path
//! and the terminal failure path.

use std::sync::Arc;

use serde_json::json;

use shopadmin_lib::auth::store::TokenStore;
use shopadmin_lib::auth::token::TokenPair;
use shopadmin_lib::config::Config;
use shopadmin_lib::error::AdminError;
use shopadmin_lib::gateway::transport::ReqwestTransport;
use shopadmin_lib::gateway::{ApiGateway, AppNavigator, Navigator, LOGIN_ROUTE};

struct Harness {
    gateway: ApiGateway,
    store: Arc<TokenStore>,
    navigator: Arc<AppNavigator>,
    _dir: tempfile::TempDir,
}

async fn harness(base_url: &str, initial_route: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        api_base_url: base_url.to_string(),
        ..Config::default()
    };
    let store = Arc::new(
        TokenStore::open(dir.path().join("tokens.json"))
            .await
            .unwrap(),
    );
    let navigator = Arc::new(AppNavigator::new(initial_route));
    let gateway = ApiGateway::new(
        &config,
        Arc::new(ReqwestTransport::new()),
        store.clone(),
        navigator.clone(),
    );
    Harness {
        gateway,
        store,
        navigator,
        _dir: dir,
    }
}

#[tokio::test]
async fn bearer_token_rides_along_and_payload_comes_back_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/categories")
        .match_header("authorization", "Bearer A1")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "data": [{"_id": "c1", "name": "Lamps"}]}"#)
        .create_async()
        .await;

    let h = harness(&format!("{}/api", server.url()), "/dashboard").await;
    h.store
        .store_pair(&TokenPair::new("A1", None))
        .await
        .unwrap();

    let payload = h.gateway.get("/categories").await.unwrap();
    assert_eq!(payload["data"][0]["name"], "Lamps");
    mock.assert_async().await;
}

#[tokio::test]
async fn expired_token_is_refreshed_and_the_call_retried_once() {
    let mut server = mockito::Server::new_async().await;

    // First attempt with the stale token is rejected as expired
    let expired = server
        .mock("GET", "/api/admin/orders")
        .match_header("authorization", "Bearer OLD")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code": "TOKEN_EXPIRED", "message": "Access token expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let refresh = server
        .mock("POST", "/api/auth/refresh-token")
        .match_body(mockito::Matcher::Json(json!({"refreshToken": "R1"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken": "NEW"}"#)
        .expect(1)
        .create_async()
        .await;

    let retried = server
        .mock("GET", "/api/admin/orders")
        .match_header("authorization", "Bearer NEW")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "data": []}"#)
        .expect(1)
        .create_async()
        .await;

    let h = harness(&format!("{}/api", server.url()), "/orders").await;
    h.store
        .store_pair(&TokenPair::new("OLD", Some("R1".to_string())))
        .await
        .unwrap();

    let payload = h.gateway.get("/admin/orders").await.unwrap();
    assert_eq!(payload["success"], true);

    expired.assert_async().await;
    refresh.assert_async().await;
    retried.assert_async().await;

    // The rotated access token is persisted, the session stays put
    assert_eq!(h.store.access_token().await.as_deref(), Some("NEW"));
    assert_eq!(h.navigator.current_route().await, "/orders");
}

#[tokio::test]
async fn rejected_refresh_ends_the_session_with_the_original_message() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/api/admin/users")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code": "TOKEN_EXPIRED", "message": "Access token expired"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/auth/refresh-token")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Refresh token revoked"}"#)
        .create_async()
        .await;

    let h = harness(&format!("{}/api", server.url()), "/users").await;
    h.store
        .store_pair(&TokenPair::new("OLD", Some("R1".to_string())))
        .await
        .unwrap();

    let err = h.gateway.get("/admin/users").await.unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(err.to_string(), "Access token expired");

    // Both halves of the credential pair are gone and the application is
    // back on the login screen
    assert!(h.store.access_token().await.is_none());
    assert!(h.store.refresh_token().await.is_none());
    assert_eq!(h.navigator.current_route().await, LOGIN_ROUTE);
}

#[tokio::test]
async fn non_auth_errors_surface_without_touching_the_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/categories/c9")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Category not found"}"#)
        .create_async()
        .await;

    let h = harness(&format!("{}/api", server.url()), "/categories").await;
    h.store
        .store_pair(&TokenPair::new("A1", Some("R1".to_string())))
        .await
        .unwrap();

    let err = h
        .gateway
        .request(
            "/categories/c9",
            shopadmin_lib::gateway::RequestOptions::method(
                shopadmin_lib::gateway::transport::Method::Delete,
            ),
        )
        .await
        .unwrap_err();

    match err {
        AdminError::Api { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Category not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.store.access_token().await.as_deref(), Some("A1"));
    assert_eq!(h.navigator.current_route().await, "/categories");
}
