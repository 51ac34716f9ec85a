//! Store overview: the headline numbers the admin landing screen shows.

use serde::Serialize;
use tabled::Tabled;

use crate::api::orders::OrdersApi;
use crate::api::products::ProductsApi;
use crate::api::users::UsersApi;
use crate::console::{output, require_session, OutputFormat};
use crate::error::Result;
use crate::AppContext;

#[derive(Debug, Serialize, Tabled)]
struct StatRow {
    metric: String,
    value: String,
}

pub async fn execute(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    require_session(ctx).await?;

    let orders = OrdersApi::new(ctx.gateway.clone()).list().await?;
    let products = ProductsApi::new(ctx.gateway.clone()).list().await?;
    let users = UsersApi::new(ctx.gateway.clone()).list().await?;

    // Cancelled orders count toward volume but not revenue
    let revenue: f64 = orders
        .iter()
        .filter(|o| !o.is_cancelled())
        .map(|o| o.total_amount)
        .sum();
    let pending = orders
        .iter()
        .filter(|o| matches!(o.status.as_deref(), Some("Pending") | None))
        .count();
    let cancelled = orders.iter().filter(|o| o.is_cancelled()).count();

    let rows = vec![
        StatRow {
            metric: "Total orders".to_string(),
            value: orders.len().to_string(),
        },
        StatRow {
            metric: "Pending orders".to_string(),
            value: pending.to_string(),
        },
        StatRow {
            metric: "Cancelled orders".to_string(),
            value: cancelled.to_string(),
        },
        StatRow {
            metric: "Revenue".to_string(),
            value: format!("₹{}", revenue),
        },
        StatRow {
            metric: "Products".to_string(),
            value: products.len().to_string(),
        },
        StatRow {
            metric: "Customers".to_string(),
            value: users.len().to_string(),
        },
    ];
    output::print_list(&rows, format);

    Ok(())
}
