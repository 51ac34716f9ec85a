//! Admin client for the storefront backend.
//!
//! Everything the console does goes through [`gateway::ApiGateway`], which
//! owns bearer attachment, the one-shot silent token refresh, and the
//! clear-and-return-to-login path on terminal authentication failure. The
//! `api` modules are thin per-resource consumers on top of it; `export`
//! renders reports and invoices from data those consumers return.

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod gateway;

use std::sync::Arc;

use auth::store::TokenStore;
use auth::AuthService;
use config::Config;
use error::Result;
use gateway::transport::ReqwestTransport;
use gateway::{ApiGateway, AppNavigator, Navigator, LOGIN_ROUTE};

/// Everything a console command needs, wired together once at startup.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<TokenStore>,
    pub gateway: Arc<ApiGateway>,
    pub auth: AuthService,
    pub navigator: Arc<AppNavigator>,
}

impl AppContext {
    /// Open the token store and assemble the gateway and services around it.
    /// The session starts on the dashboard when a stored token exists and on
    /// the login screen otherwise.
    pub async fn initialize(config: Config) -> Result<Self> {
        let store = Arc::new(TokenStore::open(config.token_store_path.clone()).await?);
        let initial_route = if store.access_token().await.is_some() {
            "/dashboard"
        } else {
            LOGIN_ROUTE
        };
        let navigator = Arc::new(AppNavigator::new(initial_route));
        let transport = Arc::new(ReqwestTransport::new());
        let gateway = Arc::new(ApiGateway::new(
            &config,
            transport,
            store.clone(),
            navigator.clone() as Arc<dyn Navigator>,
        ));
        let auth = AuthService::new(gateway.clone(), store.clone());

        Ok(Self {
            config,
            store,
            gateway,
            auth,
            navigator,
        })
    }
}
