//! Authentication flows: credential login, best-effort logout, and the
//! forgot-password OTP sequence. Token persistence lives in [`store`];
//! the refresh path itself is owned by the gateway.

pub mod store;
pub mod token;

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{AdminError, Result};
use crate::gateway::transport::Method;
use crate::gateway::{ApiGateway, RequestOptions};
use store::TokenStore;
use token::TokenPair;

pub struct AuthService {
    gateway: Arc<ApiGateway>,
    store: Arc<TokenStore>,
}

impl AuthService {
    pub fn new(gateway: Arc<ApiGateway>, store: Arc<TokenStore>) -> Self {
        Self { gateway, store }
    }

    /// Whether a session is present. Says nothing about token validity;
    /// expiry is only ever discovered by a failed call.
    pub async fn is_logged_in(&self) -> bool {
        self.store.access_token().await.is_some()
    }

    /// Credential login. On success the server-issued pair is persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let payload = json!({
            "email": email.to_lowercase(),
            "password": password,
        });
        let response = self
            .gateway
            .request("/auth/login", RequestOptions::json(Method::Post, payload))
            .await?;

        let access_token = response
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AdminError::UnexpectedResponse("login response carried no token".to_string())
            })?;
        let refresh_token = response
            .get("refreshToken")
            .and_then(Value::as_str)
            .map(|t| t.to_string());

        self.store
            .store_pair(&TokenPair::new(access_token, refresh_token))
            .await?;
        info!("Logged in");
        Ok(())
    }

    /// Logout. The server call is best-effort; local credentials are
    /// destroyed regardless of its outcome.
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self
            .gateway
            .request("/auth/logout", RequestOptions::method(Method::Post))
            .await
        {
            warn!(error = %e, "Logout call failed, clearing local session anyway");
        }
        self.store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Ask the backend to mail a one-time password to the given address.
    pub async fn send_password_otp(&self, email: &str) -> Result<()> {
        let payload = json!({ "email": email.to_lowercase() });
        self.gateway
            .request(
                "/auth/forgot-password/send-otp",
                RequestOptions::json(Method::Post, payload),
            )
            .await?;
        Ok(())
    }

    /// Trade a verified OTP for a password-reset token.
    pub async fn verify_password_otp(&self, email: &str, otp: &str) -> Result<String> {
        let payload = json!({ "email": email.to_lowercase(), "otp": otp });
        let response = self
            .gateway
            .request(
                "/auth/forgot-password/verify-otp",
                RequestOptions::json(Method::Post, payload),
            )
            .await?;

        response
            .get("resetToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .ok_or_else(|| {
                AdminError::UnexpectedResponse(
                    "verify-otp response carried no reset token".to_string(),
                )
            })
    }

    /// Set a new password using the reset token from OTP verification.
    pub async fn reset_password(&self, reset_token: &str, password: &str) -> Result<()> {
        let payload = json!({ "token": reset_token, "password": password });
        self.gateway
            .request(
                "/auth/forgot-password/reset",
                RequestOptions::json(Method::Post, payload),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::gateway::transport::mock::MockTransport;
    use crate::gateway::AppNavigator;

    const BASE: &str = "https://shop.example.com/api";

    async fn service() -> (AuthService, Arc<MockTransport>, Arc<TokenStore>, tempfile::TempDir) {
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
        let navigator = Arc::new(AppNavigator::new("/login"));
        let gateway = Arc::new(ApiGateway::new(
            &config,
            transport.clone(),
            store.clone(),
            navigator,
        ));
        (
            AuthService::new(gateway, store.clone()),
            transport,
            store,
            dir,
        )
    }

    #[tokio::test]
    async fn login_persists_both_tokens_and_lowercases_email() {
        let (auth, transport, store, _dir) = service().await;
        transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/login", BASE),
            200,
            json!({"token": "A1", "refreshToken": "R1"}),
        );

        auth.login("Admin@Shop.COM", "hunter2").await.unwrap();

        assert_eq!(store.access_token().await.as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("R1"));
        let request = &transport.requests()[0];
        match request.body.as_ref().unwrap() {
            crate::gateway::transport::RequestBody::Json(body) => {
                assert_eq!(body["email"], "admin@shop.com");
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_without_token_in_response_is_an_error() {
        let (auth, transport, store, _dir) = service().await;
        transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/login", BASE),
            200,
            json!({"message": "ok"}),
        );

        let err = auth.login("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, AdminError::UnexpectedResponse(_)));
        assert!(store.access_token().await.is_none());
    }

    #[tokio::test]
    async fn logout_clears_session_even_when_server_call_fails() {
        let (auth, transport, store, _dir) = service().await;
        transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/login", BASE),
            200,
            json!({"token": "A1", "refreshToken": "R1"}),
        );
        auth.login("a@b.c", "pw").await.unwrap();

        transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/logout", BASE),
            500,
            json!({"message": "boom"}),
        );

        auth.logout().await.unwrap();
        assert!(store.access_token().await.is_none());
        assert!(store.refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn verify_otp_returns_reset_token() {
        let (auth, transport, _store, _dir) = service().await;
        transport.enqueue_json(
            Method::Post,
            &format!("{}/auth/forgot-password/verify-otp", BASE),
            200,
            json!({"resetToken": "RT9"}),
        );

        let token = auth.verify_password_otp("a@b.c", "123456").await.unwrap();
        assert_eq!(token, "RT9");
    }
}
