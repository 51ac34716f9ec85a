//! Payment history is not a backend resource of its own: the screen
//! flattens the per-order `paymentHistory` lists, with a fallback row per
//! order when no entries exist.

use chrono::{DateTime, Utc};

use crate::api::orders::Order;

#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// Synthetic row id, `<orderId>-<index>` or `<orderId>-fallback`
    pub id: String,
    pub user: String,
    pub amount: f64,
    pub method: String,
    pub status: String,
    pub order_id: String,
    pub transaction_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Flatten orders into payment rows the way the payment-history screen does.
pub fn flatten_payments(orders: &[Order]) -> Vec<PaymentRecord> {
    let mut records = Vec::new();

    for order in orders {
        let customer = order.customer_name();
        let order_id = order.order_id.clone().unwrap_or_default();

        if !order.payment_history.is_empty() {
            for (index, entry) in order.payment_history.iter().enumerate() {
                records.push(PaymentRecord {
                    id: format!("{}-{}", order_id, index),
                    user: customer.clone(),
                    amount: if entry.amount > 0.0 {
                        entry.amount
                    } else {
                        order.total_amount
                    },
                    method: entry
                        .provider
                        .clone()
                        .or_else(|| order.payment_method.clone())
                        .unwrap_or_else(|| "N/A".to_string()),
                    status: entry
                        .status
                        .clone()
                        .or_else(|| order.payment_status.clone())
                        .unwrap_or_else(|| "Pending".to_string()),
                    order_id: order_id.clone(),
                    transaction_id: entry
                        .txn_id
                        .clone()
                        .or_else(|| order.razorpay_payment_id.clone())
                        .unwrap_or_else(|| "N/A".to_string()),
                    created_at: entry.created_at.or(order.created_at),
                });
            }
            continue;
        }

        records.push(PaymentRecord {
            id: format!("{}-fallback", order_id),
            user: customer,
            amount: order.total_amount,
            method: order
                .payment_method
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            status: order
                .payment_status
                .clone()
                .unwrap_or_else(|| "Pending".to_string()),
            order_id: order_id.clone(),
            transaction_id: order
                .razorpay_payment_id
                .clone()
                .or_else(|| order.razorpay_order_id.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            created_at: order.created_at,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders_from(value: serde_json::Value) -> Vec<Order> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn history_entries_become_individual_rows() {
        let orders = orders_from(json!([{
            "orderId": "ORD-1",
            "totalAmount": 500,
            "paymentMethod": "UPI",
            "paymentStatus": "Paid",
            "user": {"name": "Asha"},
            "paymentHistory": [
                {"amount": 200, "provider": "razorpay", "status": "Captured", "txnId": "T1"},
                {"amount": 0, "status": "Refunded"}
            ]
        }]));

        let records = flatten_payments(&orders);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "ORD-1-0");
        assert_eq!(records[0].amount, 200.0);
        assert_eq!(records[0].method, "razorpay");
        // Zero amounts fall back to the order total, provider to the order's
        // payment method
        assert_eq!(records[1].amount, 500.0);
        assert_eq!(records[1].method, "UPI");
        assert_eq!(records[1].status, "Refunded");
    }

    #[test]
    fn orders_without_history_produce_a_fallback_row() {
        let orders = orders_from(json!([{
            "orderId": "ORD-2",
            "totalAmount": 750,
            "razorpayOrderId": "RZP-9",
            "address": {"name": "Ravi"}
        }]));

        let records = flatten_payments(&orders);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ORD-2-fallback");
        assert_eq!(records[0].user, "Ravi");
        assert_eq!(records[0].status, "Pending");
        assert_eq!(records[0].transaction_id, "RZP-9");
    }
}
