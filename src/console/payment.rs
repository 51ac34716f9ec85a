//! Payment history commands. Rows are flattened client-side from the orders
//! listing; there is no dedicated payments endpoint.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::orders::OrdersApi;
use crate::api::payments::{flatten_payments, PaymentRecord};
use crate::console::{output, require_session, OutputFormat};
use crate::error::Result;
use crate::export::{self, reports};
use crate::AppContext;

#[derive(Debug, Args)]
pub struct PaymentArgs {
    #[command(subcommand)]
    pub command: PaymentCommand,
}

#[derive(Debug, Subcommand)]
pub enum PaymentCommand {
    /// List payment history across all orders
    List,
    /// Write the printable payment history report
    Export,
}

#[derive(Debug, Serialize, Tabled)]
struct PaymentRow {
    order: String,
    customer: String,
    amount: String,
    method: String,
    status: String,
    transaction: String,
    date: String,
}

fn payment_row(record: &PaymentRecord) -> PaymentRow {
    PaymentRow {
        order: record.order_id.clone(),
        customer: record.user.clone(),
        amount: format!("₹{}", record.amount),
        method: record.method.clone(),
        status: record.status.clone(),
        transaction: record.transaction_id.clone(),
        date: record
            .created_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
    }
}

pub async fn execute(ctx: &AppContext, args: &PaymentArgs, format: OutputFormat) -> Result<()> {
    require_session(ctx).await?;
    let api = OrdersApi::new(ctx.gateway.clone());

    match &args.command {
        PaymentCommand::List => {
            let orders = api.list().await?;
            let records = flatten_payments(&orders);
            let rows: Vec<PaymentRow> = records.iter().map(payment_row).collect();
            output::print_list(&rows, format);
        }
        PaymentCommand::Export => {
            let orders = api.list().await?;
            let records = flatten_payments(&orders);
            let html = reports::payments_report(&records);
            let path = export::write_artifact(
                &ctx.config.export_dir,
                "payments-report.html",
                html.as_bytes(),
            )
            .await?;
            output::print_success(&format!("Payment report written to {}", path.display()));
        }
    }

    Ok(())
}
