//! Order commands: listing, detail, refunds, shipment tracking, the printable
//! report and the multi-up invoice PDF.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::api::orders::{Order, OrdersApi, Tracking};
use crate::console::{output, prompt_confirm, require_session, OutputFormat};
use crate::error::{AdminError, Result};
use crate::export::{self, invoices, reports};
use crate::AppContext;

#[derive(Debug, Args)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// List orders, optionally for a single day
    List {
        /// Only orders placed on this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show one order in full
    Show {
        /// Order id
        id: String,
    },
    /// Refund an order's payment
    Refund {
        /// Order id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show shipment tracking for an order
    Tracking {
        /// Order id
        id: String,
    },
    /// Set shipment tracking on an order
    SetTracking {
        /// Order id
        id: String,
        /// Courier name
        #[arg(long)]
        courier: Option<String>,
        /// Tracking number
        #[arg(long)]
        number: Option<String>,
        /// Shipment status
        #[arg(long)]
        status: Option<String>,
        /// Tracking URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Write the printable orders report
    Export,
    /// Write the invoice PDF for one day's orders
    Invoices {
        /// Day to invoice (YYYY-MM-DD)
        date: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct OrderRow {
    id: String,
    customer: String,
    amount: String,
    payment: String,
    status: String,
    date: String,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AdminError::Input(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

fn order_row(order: &Order) -> OrderRow {
    OrderRow {
        id: order.order_id.clone().unwrap_or_default(),
        customer: order.customer_name(),
        amount: format!("₹{}", order.total_amount),
        payment: format!(
            "{} / {}",
            order.payment_method.as_deref().unwrap_or("N/A"),
            order.payment_status.as_deref().unwrap_or("Pending")
        ),
        status: order.status.clone().unwrap_or_else(|| "Pending".to_string()),
        date: invoices::format_order_datetime(order.created_at),
    }
}

fn show_order(order: &Order) {
    output::print_kv("Order ID", order.order_id.as_deref().unwrap_or("-"));
    output::print_kv("Customer", &order.customer_name());
    output::print_kv("Status", order.status.as_deref().unwrap_or("Pending"));
    output::print_kv(
        "Payment",
        &format!(
            "{} / {}",
            order.payment_method.as_deref().unwrap_or("N/A"),
            order.payment_status.as_deref().unwrap_or("Pending")
        ),
    );
    output::print_kv("Total", &format!("₹{}", order.total_amount));
    output::print_kv("Placed", &invoices::format_order_datetime(order.created_at));
    if let Some(address) = &order.address {
        output::print_kv("Mobile", address.mobile.as_deref().unwrap_or("-"));
        output::print_kv(
            "Address",
            &format!(
                "{}, {}, {}, {} - {}",
                address.address.as_deref().unwrap_or(""),
                address.area.as_deref().unwrap_or(""),
                address.city.as_deref().unwrap_or(""),
                address.state.as_deref().unwrap_or(""),
                address.postal.as_deref().unwrap_or(""),
            ),
        );
    }
    for item in &order.cart {
        output::print_kv(
            "Item",
            &format!(
                "{} x {} @ ₹{}",
                item.name.as_deref().unwrap_or("Product"),
                item.quantity.max(1),
                item.price
            ),
        );
    }
}

fn show_tracking(tracking: &Tracking) {
    output::print_kv("Courier", tracking.courier.as_deref().unwrap_or("-"));
    output::print_kv(
        "Tracking number",
        tracking.tracking_number.as_deref().unwrap_or("-"),
    );
    output::print_kv("Status", tracking.status.as_deref().unwrap_or("-"));
    output::print_kv("URL", tracking.url.as_deref().unwrap_or("-"));
}

pub async fn execute(ctx: &AppContext, args: &OrderArgs, format: OutputFormat) -> Result<()> {
    require_session(ctx).await?;
    let api = OrdersApi::new(ctx.gateway.clone());

    match &args.command {
        OrderCommand::List { date } => {
            let orders = api.list().await?;
            let rows: Vec<OrderRow> = match date {
                Some(raw) => {
                    let day = parse_date(raw)?;
                    orders
                        .iter()
                        .filter(|o| o.created_at.map(|dt| dt.date_naive() == day).unwrap_or(false))
                        .map(order_row)
                        .collect()
                }
                None => orders.iter().map(order_row).collect(),
            };
            output::print_list(&rows, format);
        }
        OrderCommand::Show { id } => {
            let order = api.get(id).await?;
            show_order(&order);
        }
        OrderCommand::Refund { id, yes } => {
            if !yes && !prompt_confirm(&format!("Refund order {}?", id))? {
                output::print_warning("Aborted");
                return Ok(());
            }
            let response = api.refund(id).await?;
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Refund initiated");
            output::print_success(message);
        }
        OrderCommand::Tracking { id } => {
            let tracking = api.tracking(id).await?;
            show_tracking(&tracking);
        }
        OrderCommand::SetTracking {
            id,
            courier,
            number,
            status,
            url,
        } => {
            let tracking = Tracking {
                courier: courier.clone(),
                tracking_number: number.clone(),
                status: status.clone(),
                url: url.clone(),
            };
            api.update_tracking(id, &tracking).await?;
            output::print_success(&format!("Tracking updated for order {}", id));
        }
        OrderCommand::Export => {
            let orders = api.list().await?;
            let html = reports::orders_report(&orders);
            let path =
                export::write_artifact(&ctx.config.export_dir, "orders-report.html", html.as_bytes())
                    .await?;
            output::print_success(&format!("Orders report written to {}", path.display()));
        }
        OrderCommand::Invoices { date } => {
            let day = parse_date(date)?;
            let orders = api.list().await?;
            let eligible = invoices::eligible_orders(&orders, day);
            if eligible.is_empty() {
                output::print_warning(&format!("No orders found for {}", day));
                return Ok(());
            }
            let count = eligible.len();
            let bytes = invoices::render_invoices(&eligible, day)?;
            let path = export::write_artifact(
                &ctx.config.export_dir,
                &format!("invoices-{}.pdf", day),
                &bytes,
            )
            .await?;
            output::print_success(&format!(
                "{} invoice(s) written to {}",
                count,
                path.display()
            ));
        }
    }

    Ok(())
}
