//! Printable HTML report documents. The layout (columns, inline styles,
//! summary line) matches what the order/user/payment screens print.

use crate::api::orders::Order;
use crate::api::payments::PaymentRecord;
use crate::api::users::AdminUser;

/// Shared document shell for every report
fn report_document(title: &str, summary: &str, headers: &[&str], rows: &str) -> String {
    let head_cells: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", h))
        .collect();

    format!(
        r#"<html>
  <head>
    <title>{title}</title>
    <style>
      body {{ font-family: Arial, sans-serif; padding: 24px; color: #1f2937; }}
      h2 {{ margin-bottom: 12px; }}
      table {{ width: 100%; border-collapse: collapse; font-size: 12px; }}
      th, td {{ border: 1px solid #e5e7eb; padding: 8px; text-align: left; vertical-align: top; }}
      th {{ background: #f3f4f6; }}
      .summary {{ margin-bottom: 16px; font-size: 13px; }}
    </style>
  </head>
  <body>
    <h2>{title}</h2>
    <div class="summary">{summary}</div>
    <table>
      <thead><tr>{head_cells}</tr></thead>
      <tbody>{rows}</tbody>
    </table>
  </body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn cell(text: &str) -> String {
    format!("<td>{}</td>", escape(text))
}

/// Orders report: one row per order, items joined with line breaks
pub fn orders_report(orders: &[Order]) -> String {
    let total_revenue: f64 = orders.iter().map(|o| o.total_amount).sum();
    let rows: String = orders
        .iter()
        .map(|order| {
            let items = if order.cart.is_empty() {
                "-".to_string()
            } else {
                order
                    .cart
                    .iter()
                    .map(|item| {
                        format!(
                            "{} x {}",
                            escape(item.name.as_deref().unwrap_or("Product")),
                            item.quantity.max(1)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("<br/>")
            };
            let date = order
                .created_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .or_else(|| order.date.clone())
                .unwrap_or_default();
            format!(
                "<tr>{}{}<td>{}</td>{}{}{}{}</tr>",
                cell(order.order_id.as_deref().unwrap_or("")),
                cell(&order.customer_name()),
                items,
                cell(&format!("₹{}", order.total_amount)),
                cell(&format!(
                    "{} / {}",
                    order.payment_method.as_deref().unwrap_or("N/A"),
                    order.payment_status.as_deref().unwrap_or("Pending")
                )),
                cell(&date),
                cell(order.status.as_deref().unwrap_or("Pending")),
            )
        })
        .collect();

    report_document(
        "Orders Report",
        &format!(
            "Total Orders: {} | Revenue: ₹{}",
            orders.len(),
            total_revenue
        ),
        &[
            "Order ID", "Customer", "Items", "Amount", "Payment", "Date", "Status",
        ],
        &rows,
    )
}

/// Users report mirroring the customer listing
pub fn users_report(users: &[AdminUser]) -> String {
    let total_orders: i64 = users.iter().map(|u| u.orders).sum();
    let total_spent: f64 = users.iter().map(|u| u.total_spent).sum();
    let rows: String = users
        .iter()
        .map(|user| {
            format!(
                "<tr>{}{}{}{}{}{}</tr>",
                cell(user.name.as_deref().unwrap_or("")),
                cell(user.email.as_deref().unwrap_or("")),
                cell(user.phone.as_deref().unwrap_or("")),
                cell(
                    &user
                        .join_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                ),
                cell(&user.orders.to_string()),
                cell(&format!("₹{}", user.total_spent)),
            )
        })
        .collect();

    report_document(
        "Users Report",
        &format!(
            "Total Users: {} | Orders: {} | Revenue: ₹{}",
            users.len(),
            total_orders,
            total_spent
        ),
        &["Name", "Email", "Phone", "Joined", "Orders", "Total Spent"],
        &rows,
    )
}

/// Payment history report over the flattened records
pub fn payments_report(records: &[PaymentRecord]) -> String {
    let total: f64 = records.iter().map(|r| r.amount).sum();
    let rows: String = records
        .iter()
        .map(|record| {
            format!(
                "<tr>{}{}{}{}{}{}{}</tr>",
                cell(&record.order_id),
                cell(&record.user),
                cell(&format!("₹{}", record.amount)),
                cell(&record.method),
                cell(&record.status),
                cell(&record.transaction_id),
                cell(
                    &record
                        .created_at
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default()
                ),
            )
        })
        .collect();

    report_document(
        "Payment History",
        &format!("Total Payments: {} | Amount: ₹{}", records.len(), total),
        &[
            "Order ID",
            "Customer",
            "Amount",
            "Method",
            "Status",
            "Transaction",
            "Date",
        ],
        &rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn orders_report_contains_rows_and_summary() {
        let orders: Vec<Order> = serde_json::from_value(json!([{
            "orderId": "ORD-1",
            "totalAmount": 500,
            "status": "Shipped",
            "address": {"name": "Asha"},
            "cart": [{"name": "Lamp <deluxe>", "quantity": 2, "price": 250}]
        }]))
        .unwrap();

        let html = orders_report(&orders);
        assert!(html.contains("Orders Report"));
        assert!(html.contains("Total Orders: 1 | Revenue: ₹500"));
        assert!(html.contains("ORD-1"));
        // Markup in data is escaped
        assert!(html.contains("Lamp &lt;deluxe&gt; x 2"));
        assert!(!html.contains("<deluxe>"));
    }

    #[test]
    fn empty_listing_still_renders_a_document() {
        let html = users_report(&[]);
        assert!(html.contains("<tbody></tbody>"));
        assert!(html.contains("Total Users: 0"));
    }
}
