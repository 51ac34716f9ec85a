//! Customer listing commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::users::UsersApi;
use crate::console::{output, require_session, OutputFormat};
use crate::error::Result;
use crate::export::{self, reports};
use crate::AppContext;

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all customers
    List,
    /// Write the printable users report
    Export,
}

#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    joined: String,
    orders: i64,
    total_spent: String,
}

pub async fn execute(ctx: &AppContext, args: &UserArgs, format: OutputFormat) -> Result<()> {
    require_session(ctx).await?;
    let api = UsersApi::new(ctx.gateway.clone());

    match &args.command {
        UserCommand::List => {
            let users = api.list().await?;
            let rows: Vec<UserRow> = users
                .iter()
                .map(|u| UserRow {
                    id: u.id.clone().unwrap_or_default(),
                    name: u.name.clone().unwrap_or_default(),
                    email: u.email.clone().unwrap_or_default(),
                    phone: u.phone.clone().unwrap_or_default(),
                    joined: u
                        .join_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                    orders: u.orders,
                    total_spent: format!("₹{}", u.total_spent),
                })
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::Export => {
            let users = api.list().await?;
            let html = reports::users_report(&users);
            let path =
                export::write_artifact(&ctx.config.export_dir, "users-report.html", html.as_bytes())
                    .await?;
            output::print_success(&format!("Users report written to {}", path.display()));
        }
    }

    Ok(())
}
