//! Authenticated request gateway.
//!
//! Every call to the backend goes through [`ApiGateway::request`]: it attaches
//! the stored bearer token, detects an expired-token 401, performs at most one
//! silent refresh followed by one retry of the original call, and on terminal
//! authentication failure clears the credential pair and sends the whole
//! application back to the login screen.

pub mod transport;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::store::TokenStore;
use crate::config::Config;
use crate::error::{AdminError, Result, TOKEN_EXPIRED_CODE};
use transport::{HttpTransport, Method, RequestBody, TransportRequest, TransportResponse};

/// Route of the login screen
pub const LOGIN_ROUTE: &str = "/login";
/// Fixed path used for the silent refresh call
const REFRESH_PATH: &str = "/auth/refresh-token";

/// Options for a single gateway call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method, `GET` when not specified
    pub method: Method,
    /// Structured or multipart payload
    pub body: Option<RequestBody>,
    /// Extra headers supplied by the caller
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::Get,
            body: None,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    /// A bodyless request with the given method
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// A request carrying a structured JSON payload
    pub fn json(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(RequestBody::Json(body)),
            headers: Vec::new(),
        }
    }

    /// A request carrying a multipart payload
    pub fn multipart(method: Method, form: transport::MultipartForm) -> Self {
        Self {
            method,
            body: Some(RequestBody::Multipart(form)),
            headers: Vec::new(),
        }
    }
}

/// Seam for the "navigate the whole application" side effect. The console
/// keeps its current route here; tests observe redirects through it.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Route the application is currently showing
    async fn current_route(&self) -> String;

    /// Move the application to another route
    async fn navigate(&self, route: &str);
}

/// Route tracker used by the terminal console
pub struct AppNavigator {
    route: RwLock<String>,
}

impl AppNavigator {
    pub fn new(initial_route: &str) -> Self {
        Self {
            route: RwLock::new(initial_route.to_string()),
        }
    }
}

#[async_trait]
impl Navigator for AppNavigator {
    async fn current_route(&self) -> String {
        self.route.read().await.clone()
    }

    async fn navigate(&self, route: &str) {
        info!(route = route, "Navigating");
        *self.route.write().await = route.to_string();
    }
}

/// The authenticated request gateway
pub struct ApiGateway {
    base_url: String,
    file_base_url: String,
    transport: Arc<dyn HttpTransport>,
    store: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiGateway {
    pub fn new(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        store: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            file_base_url: config.file_base_url(),
            transport,
            store,
            navigator,
        }
    }

    /// Shorthand for a plain GET
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(path, RequestOptions::default()).await
    }

    /// Perform one call to `path`, transparently recovering from a detected
    /// access-token expiry exactly once.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value> {
        let token = self.store.access_token().await;
        let request = self.compose(path, &options, token.as_deref());

        debug!(method = ?options.method, path = path, "Issuing request");
        let response = self.transport.send(request).await?;
        let payload = parse_payload(&response)?;

        if response.is_success() {
            return Ok(payload);
        }

        if response.status == 401 {
            let code = payload.get("code").and_then(Value::as_str);
            if code == Some(TOKEN_EXPIRED_CODE) {
                if let Some(refresh_token) = self.store.refresh_token().await {
                    // A successful refresh+retry short-circuits the failure
                    // path entirely. Any refresh failure is swallowed here so
                    // the logout path below stays uniform.
                    match self.refresh_and_retry(path, &options, &refresh_token).await {
                        Ok(Some(retried)) => return Ok(retried),
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, "Token refresh failed");
                        }
                    }
                }
            }

            if let Err(e) = self.store.clear().await {
                warn!(error = %e, "Failed to clear credential pair");
            }
            if self.navigator.current_route().await != LOGIN_ROUTE {
                self.navigator.navigate(LOGIN_ROUTE).await;
            }
        }

        Err(AdminError::from_payload(response.status, &payload))
    }

    /// One refresh call plus, on success, one reissue of the original call.
    /// `Ok(None)` means the recovery did not pan out and the caller should
    /// proceed to the terminal failure path.
    async fn refresh_and_retry(
        &self,
        path: &str,
        options: &RequestOptions,
        refresh_token: &str,
    ) -> Result<Option<Value>> {
        debug!("Access token expired, attempting silent refresh");

        let refresh_request = TransportRequest {
            method: Method::Post,
            url: format!("{}{}", self.base_url, REFRESH_PATH),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(RequestBody::Json(json!({ "refreshToken": refresh_token }))),
        };

        let refresh_response = self.transport.send(refresh_request).await?;
        if !refresh_response.is_success() {
            debug!(status = refresh_response.status, "Refresh call rejected");
            return Ok(None);
        }

        let refresh_payload = parse_payload(&refresh_response)?;
        let access_token = match refresh_payload.get("accessToken").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => {
                debug!("Refresh response carried no usable access token");
                return Ok(None);
            }
        };

        self.store.set_access_token(&access_token).await?;
        info!("Access token refreshed, retrying original call");

        // Rebuild the original call with the new bearer token and reissue it
        // exactly once.
        let retry = self.compose(path, options, Some(&access_token));
        let retry_response = self.transport.send(retry).await?;
        let retry_payload = parse_payload(&retry_response)?;

        if retry_response.is_success() {
            Ok(Some(retry_payload))
        } else {
            debug!(status = retry_response.status, "Retry after refresh failed");
            Ok(None)
        }
    }

    /// Compose the full request: content type per the body kind, caller
    /// headers merged in (minus any content-type they try to smuggle), bearer
    /// authorization when a token is present.
    fn compose(&self, path: &str, options: &RequestOptions, token: Option<&str>) -> TransportRequest {
        let mut headers = Vec::new();

        let is_multipart = matches!(options.body, Some(RequestBody::Multipart(_)));
        if !is_multipart {
            // Multipart omits the content type so the transport can set its
            // own boundary.
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        for (key, value) in &options.headers {
            if key.eq_ignore_ascii_case("content-type") {
                continue;
            }
            headers.push((key.clone(), value.clone()));
        }

        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        TransportRequest {
            method: options.method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body: options.body.clone(),
        }
    }

    /// Resolve a stored relative media path against the file-serving origin.
    /// Already-absolute addresses pass through unchanged; an absent path
    /// resolves to the empty string.
    pub fn asset_url(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if path.starts_with("http") {
            return path.to_string();
        }
        format!("{}{}", self.file_base_url, path)
    }
}

/// Parse the body as JSON only when the response declares a JSON content
/// type; anything else is treated as an absent body.
fn parse_payload(response: &TransportResponse) -> Result<Value> {
    if !response.is_json() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body)
        .map_err(|e| AdminError::Transport(format!("malformed JSON response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::transport::mock::MockTransport;
    use super::*;
    use crate::auth::token::TokenPair;

    const BASE: &str = "https://shop.example.com/api";

    struct Harness {
        gateway: ApiGateway,
        transport: Arc<MockTransport>,
        store: Arc<TokenStore>,
        navigator: Arc<AppNavigator>,
        _dir: tempfile::TempDir,
    }

    async fn harness(initial_route: &str) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_base_url: BASE.to_string(),
            ..Config::default()
        };
        let store = Arc::new(
            TokenStore::open(dir.path().join("tokens.json"))
                .await
                .unwrap(),
        );
        let transport = Arc::new(MockTransport::new());
        let navigator = Arc::new(AppNavigator::new(initial_route));
        let gateway = ApiGateway::new(
            &config,
            transport.clone(),
            store.clone(),
            navigator.clone(),
        );
        Harness {
            gateway,
            transport,
            store,
            navigator,
            _dir: dir,
        }
    }

    fn header<'a>(request: &'a TransportRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn valid_token_issues_exactly_one_request_and_returns_body_verbatim() {
        // Scenario A
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", None))
            .await
            .unwrap();
        h.transport.enqueue_json(
            Method::Get,
            &format!("{}/categories", BASE),
            200,
            json!({"data": [{"_id": "1", "name": "Toys"}]}),
        );

        let value = h.gateway.get("/categories").await.unwrap();

        assert_eq!(value, json!({"data": [{"_id": "1", "name": "Toys"}]}));
        let requests = h.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer T1"));
        assert_eq!(
            header(&requests[0], "content-type"),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn expired_token_without_refresh_clears_and_redirects() {
        // Scenario B: no stored tokens at all, backend still answers 401
        let h = harness("/view-products").await;
        h.transport.enqueue_json(
            Method::Delete,
            &format!("{}/products", BASE),
            401,
            json!({"code": "TOKEN_EXPIRED", "message": "expired"}),
        );

        let err = h
            .gateway
            .request("/products", RequestOptions::method(Method::Delete))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "expired");
        assert!(err.is_auth_failure());
        assert!(h.store.access_token().await.is_none());
        assert!(h.store.refresh_token().await.is_none());
        assert_eq!(h.navigator.current_route().await, LOGIN_ROUTE);
        // No refresh token, so no refresh call: a single transport interaction
        assert_eq!(h.transport.requests().len(), 1);
        // The unauthenticated call carried no bearer header
        assert!(header(&h.transport.requests()[0], "authorization").is_none());
    }

    #[tokio::test]
    async fn expired_token_with_refresh_retries_once_and_succeeds() {
        // Scenario C
        let h = harness("/view-products").await;
        h.store
            .store_pair(&TokenPair::new("T1", Some("R1".to_string())))
            .await
            .unwrap();
        let products_url = format!("{}/products", BASE);
        h.transport.enqueue_json(
            Method::Delete,
            &products_url,
            401,
            json!({"code": "TOKEN_EXPIRED", "message": "expired"}),
        );
        h.transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/refresh-token", BASE),
            200,
            json!({"accessToken": "T2"}),
        );
        h.transport
            .enqueue_json(Method::Delete, &products_url, 200, json!({"success": true}));

        let value = h
            .gateway
            .request("/products", RequestOptions::method(Method::Delete))
            .await
            .unwrap();

        assert_eq!(value, json!({"success": true}));
        assert_eq!(h.store.access_token().await.as_deref(), Some("T2"));
        assert_eq!(h.store.refresh_token().await.as_deref(), Some("R1"));
        // No redirect on the short-circuit path
        assert_eq!(h.navigator.current_route().await, "/view-products");

        // Exactly three transport interactions: original, refresh, retry
        let requests = h.transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer T1"));
        assert_eq!(
            requests[1].url,
            format!("{}/auth/refresh-token", BASE)
        );
        assert_eq!(header(&requests[2], "authorization"), Some("Bearer T2"));
    }

    #[tokio::test]
    async fn subsequent_call_uses_the_rotated_token() {
        // Round-trip property: after a refresh, the next call never sees the
        // stale token.
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", Some("R1".to_string())))
            .await
            .unwrap();
        let url = format!("{}/categories", BASE);
        h.transport.enqueue_json(
            Method::Get,
            &url,
            401,
            json!({"code": "TOKEN_EXPIRED", "message": "expired"}),
        );
        h.transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/refresh-token", BASE),
            200,
            json!({"accessToken": "T2"}),
        );
        h.transport
            .enqueue_json(Method::Get, &url, 200, json!({"data": []}));
        h.transport
            .enqueue_json(Method::Get, &url, 200, json!({"data": []}));

        h.gateway.get("/categories").await.unwrap();
        h.gateway.get("/categories").await.unwrap();

        let requests = h.transport.requests();
        let last = requests.last().unwrap();
        assert_eq!(header(last, "authorization"), Some("Bearer T2"));
    }

    #[tokio::test]
    async fn failed_refresh_falls_through_to_logout() {
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", Some("R1".to_string())))
            .await
            .unwrap();
        let url = format!("{}/orders", BASE);
        h.transport.enqueue_json(
            Method::Get,
            &url,
            401,
            json!({"code": "TOKEN_EXPIRED", "message": "expired"}),
        );
        h.transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/refresh-token", BASE),
            401,
            json!({"message": "refresh token invalid"}),
        );

        let err = h.gateway.get("/orders").await.unwrap_err();

        // The refresh error is swallowed; the caller sees the original 401
        // message.
        assert_eq!(err.to_string(), "expired");
        assert!(h.store.access_token().await.is_none());
        assert_eq!(h.navigator.current_route().await, LOGIN_ROUTE);
        assert_eq!(h.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn refresh_without_usable_access_token_falls_through() {
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", Some("R1".to_string())))
            .await
            .unwrap();
        let url = format!("{}/orders", BASE);
        h.transport.enqueue_json(
            Method::Get,
            &url,
            401,
            json!({"code": "TOKEN_EXPIRED", "message": "expired"}),
        );
        h.transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/refresh-token", BASE),
            200,
            json!({"ok": true}),
        );

        let err = h.gateway.get("/orders").await.unwrap_err();
        assert_eq!(err.to_string(), "expired");
        assert_eq!(h.navigator.current_route().await, LOGIN_ROUTE);
    }

    #[tokio::test]
    async fn retry_failure_is_terminal_for_the_call() {
        // At most one refresh-and-retry cycle: a second failure clears both
        // tokens.
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", Some("R1".to_string())))
            .await
            .unwrap();
        let url = format!("{}/orders", BASE);
        h.transport.enqueue_json(
            Method::Get,
            &url,
            401,
            json!({"code": "TOKEN_EXPIRED", "message": "expired"}),
        );
        h.transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/refresh-token", BASE),
            200,
            json!({"accessToken": "T2"}),
        );
        h.transport.enqueue_json(
            Method::Get,
            &url,
            401,
            json!({"code": "TOKEN_EXPIRED", "message": "still expired"}),
        );

        let err = h.gateway.get("/orders").await.unwrap_err();

        assert_eq!(err.to_string(), "expired");
        assert_eq!(h.transport.requests().len(), 3);
        assert!(h.store.access_token().await.is_none());
        assert!(h.store.refresh_token().await.is_none());
        assert_eq!(h.navigator.current_route().await, LOGIN_ROUTE);
    }

    #[tokio::test]
    async fn plain_401_does_not_attempt_refresh() {
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", Some("R1".to_string())))
            .await
            .unwrap();
        h.transport.enqueue_json(
            Method::Get,
            &format!("{}/orders", BASE),
            401,
            json!({"message": "not allowed"}),
        );

        let err = h.gateway.get("/orders").await.unwrap_err();

        assert_eq!(err.to_string(), "not allowed");
        assert_eq!(h.transport.requests().len(), 1);
        assert!(h.store.access_token().await.is_none());
        assert_eq!(h.navigator.current_route().await, LOGIN_ROUTE);
    }

    #[tokio::test]
    async fn already_on_login_does_not_renavigate() {
        let h = harness(LOGIN_ROUTE).await;
        h.transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/login", BASE),
            401,
            json!({"message": "bad credentials"}),
        );

        let err = h
            .gateway
            .request(
                "/auth/login",
                RequestOptions::json(Method::Post, json!({"email": "a", "password": "b"})),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "bad credentials");
        assert_eq!(h.navigator.current_route().await, LOGIN_ROUTE);
    }

    #[tokio::test]
    async fn server_error_surfaces_message_without_side_effects() {
        // Scenario D
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", Some("R1".to_string())))
            .await
            .unwrap();
        h.transport.enqueue_json(
            Method::Get,
            &format!("{}/orders", BASE),
            500,
            json!({"message": "Internal error"}),
        );

        let err = h.gateway.get("/orders").await.unwrap_err();

        assert_eq!(err.to_string(), "Internal error");
        assert_eq!(h.transport.requests().len(), 1);
        assert_eq!(h.store.access_token().await.as_deref(), Some("T1"));
        assert_eq!(h.store.refresh_token().await.as_deref(), Some("R1"));
        assert_eq!(h.navigator.current_route().await, "/dashboard");
    }

    #[tokio::test]
    async fn non_json_success_resolves_to_absent_body() {
        let h = harness("/dashboard").await;
        h.transport.enqueue(
            Method::Get,
            &format!("{}/health", BASE),
            TransportResponse {
                status: 200,
                content_type: Some("text/plain".to_string()),
                body: "OK".to_string(),
            },
        );

        let value = h.gateway.get("/health").await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn non_json_error_uses_generic_fallback_message() {
        let h = harness("/dashboard").await;
        h.transport.enqueue(
            Method::Get,
            &format!("{}/orders", BASE),
            TransportResponse {
                status: 503,
                content_type: Some("text/html".to_string()),
                body: "<html>down</html>".to_string(),
            },
        );

        let err = h.gateway.get("/orders").await.unwrap_err();
        assert_eq!(err.to_string(), crate::error::GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn multipart_body_omits_content_type_header() {
        let h = harness("/dashboard").await;
        h.store
            .store_pair(&TokenPair::new("T1", None))
            .await
            .unwrap();
        let form = transport::MultipartForm::new()
            .text("name", "Lamps")
            .file("image", "lamps.png", "image/png", vec![0u8; 4]);
        h.transport.enqueue_json(
            Method::Post,
            &format!("{}/subcategories", BASE),
            201,
            json!({"data": {"_id": "9"}}),
        );

        h.gateway
            .request("/subcategories", RequestOptions::multipart(Method::Post, form))
            .await
            .unwrap();

        let requests = h.transport.requests();
        assert!(header(&requests[0], "content-type").is_none());
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer T1"));
    }

    #[tokio::test]
    async fn caller_headers_merge_but_cannot_override_content_type() {
        let h = harness("/dashboard").await;
        let mut options = RequestOptions::json(Method::Post, json!({"status": "Shipped"}));
        options.headers = vec![
            ("Content-Type".to_string(), "text/plain".to_string()),
            ("X-Request-Source".to_string(), "console".to_string()),
        ];
        let url = format!("{}/order/update-tracking/77", BASE);
        h.transport
            .enqueue_json(Method::Post, &url, 200, json!({"data": {}}));

        h.gateway
            .request("/order/update-tracking/77", options)
            .await
            .unwrap();

        let requests = h.transport.requests();
        assert_eq!(
            header(&requests[0], "content-type"),
            Some("application/json")
        );
        assert_eq!(header(&requests[0], "x-request-source"), Some("console"));
    }

    #[tokio::test]
    async fn identical_calls_do_not_share_request_state() {
        // Idempotence: two identical calls produce two independent outcomes.
        let h = harness("/dashboard").await;
        let url = format!("{}/categories", BASE);
        h.transport
            .enqueue_json(Method::Get, &url, 200, json!({"data": [1]}));
        h.transport
            .enqueue_json(Method::Get, &url, 200, json!({"data": [2]}));

        let first = h.gateway.get("/categories").await.unwrap();
        let second = h.gateway.get("/categories").await.unwrap();

        assert_eq!(first, json!({"data": [1]}));
        assert_eq!(second, json!({"data": [2]}));
        assert_eq!(h.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn asset_url_resolution() {
        let h = harness("/dashboard").await;
        assert_eq!(h.gateway.asset_url(""), "");
        assert_eq!(
            h.gateway.asset_url("https://cdn.example.com/x.png"),
            "https://cdn.example.com/x.png"
        );
        assert_eq!(
            h.gateway.asset_url("/uploads/products/x.png"),
            "https://shop.example.com/uploads/products/x.png"
        );
    }
}
