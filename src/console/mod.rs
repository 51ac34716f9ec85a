//! Command definitions and dispatch for the terminal admin console. Every
//! screen of the admin surface maps to a subcommand here; the actual backend
//! work lives in the `api` consumers behind the gateway.

pub mod output;

mod auth;
mod category;
mod dashboard;
mod order;
mod payment;
mod product;
mod subcategory;
mod user;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{AdminError, Result};
use crate::AppContext;
pub use output::OutputFormat;

/// Storefront administration console
#[derive(Debug, Parser)]
#[command(name = "shopadmin", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "shopadmin.config.json")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in with admin credentials
    Login(auth::LoginArgs),
    /// Log out and destroy the local session
    Logout,
    /// Recover a forgotten password via emailed OTP
    ForgotPassword(auth::ForgotPasswordArgs),
    /// Store overview: revenue, orders, catalogue counts
    Dashboard,
    /// Category management
    Category(category::CategoryArgs),
    /// Subcategory management
    Subcategory(subcategory::SubcategoryArgs),
    /// Product catalogue management
    Product(product::ProductArgs),
    /// Order listing, refunds, tracking and invoices
    Order(order::OrderArgs),
    /// Customer listing
    User(user::UserArgs),
    /// Payment history
    Payment(payment::PaymentArgs),
}

impl Cli {
    /// Execute the parsed command against a freshly assembled application
    /// context.
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(Path::new(&self.config))?;
        let ctx = AppContext::initialize(config).await?;

        let result = match &self.command {
            Commands::Login(args) => auth::login(&ctx, args).await,
            Commands::Logout => auth::logout(&ctx).await,
            Commands::ForgotPassword(args) => auth::forgot_password(&ctx, args).await,
            Commands::Dashboard => dashboard::execute(&ctx, self.format).await,
            Commands::Category(args) => category::execute(&ctx, args, self.format).await,
            Commands::Subcategory(args) => subcategory::execute(&ctx, args, self.format).await,
            Commands::Product(args) => product::execute(&ctx, args, self.format).await,
            Commands::Order(args) => order::execute(&ctx, args, self.format).await,
            Commands::User(args) => user::execute(&ctx, args, self.format).await,
            Commands::Payment(args) => payment::execute(&ctx, args, self.format).await,
        };

        if let Err(e) = &result {
            // The gateway has already cleared the credential pair and routed
            // back to the login screen by the time this surfaces.
            if e.is_auth_failure() {
                output::print_warning("Session expired. Log in again with `shopadmin login`.");
            }
        }
        result
    }
}

/// Commands that read or mutate store data need a stored session first.
/// Whether the token is still valid is only ever discovered by the call.
async fn require_session(ctx: &AppContext) -> Result<()> {
    if !ctx.auth.is_logged_in().await {
        return Err(AdminError::Api {
            status: 401,
            code: None,
            message: "Not logged in. Run `shopadmin login` first.".to_string(),
        });
    }
    Ok(())
}

fn prompt_input(label: &str) -> Result<String> {
    dialoguer::Input::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| AdminError::Input(e.to_string()))
}

fn prompt_password(label: &str) -> Result<String> {
    dialoguer::Password::new()
        .with_prompt(label)
        .interact()
        .map_err(|e| AdminError::Input(e.to_string()))
}

fn prompt_confirm(label: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(label)
        .default(false)
        .interact()
        .map_err(|e| AdminError::Input(e.to_string()))
}
