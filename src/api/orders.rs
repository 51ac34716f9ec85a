use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::de;
use crate::error::Result;
use crate::gateway::transport::Method;
use crate::gateway::{ApiGateway, RequestOptions};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderAddress {
    pub name: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub postal: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CartItem {
    pub name: Option<String>,
    #[serde(deserialize_with = "de::loose_i64")]
    pub quantity: i64,
    #[serde(deserialize_with = "de::loose_f64")]
    pub price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentEntry {
    #[serde(deserialize_with = "de::loose_f64")]
    pub amount: f64,
    pub provider: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "txnId", deserialize_with = "de::loose_string")]
    pub txn_id: Option<String>,
    #[serde(rename = "createdAt", deserialize_with = "de::loose_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Order {
    #[serde(rename = "orderId", deserialize_with = "de::loose_string")]
    pub order_id: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(rename = "paymentStatus")]
    pub payment_status: Option<String>,
    #[serde(rename = "totalAmount", deserialize_with = "de::loose_f64")]
    pub total_amount: f64,
    #[serde(rename = "createdAt", deserialize_with = "de::loose_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    /// Legacy display date some orders carry instead of `createdAt`
    pub date: Option<String>,
    pub user: Option<OrderUser>,
    pub address: Option<OrderAddress>,
    pub cart: Vec<CartItem>,
    #[serde(rename = "paymentHistory")]
    pub payment_history: Vec<PaymentEntry>,
    #[serde(rename = "razorpayPaymentId")]
    pub razorpay_payment_id: Option<String>,
    #[serde(rename = "razorpayOrderId")]
    pub razorpay_order_id: Option<String>,
}

impl Order {
    /// Customer name with the same fallbacks the order screens use
    pub fn customer_name(&self) -> String {
        self.address
            .as_ref()
            .and_then(|a| a.name.clone())
            .or_else(|| self.user.as_ref().and_then(|u| u.name.clone()))
            .unwrap_or_else(|| "Customer".to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status.as_deref(), Some("Cancelled") | Some("Canceled"))
    }
}

/// Shipment tracking fields for one order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tracking {
    pub courier: Option<String>,
    #[serde(rename = "trackingNumber", deserialize_with = "de::loose_string")]
    pub tracking_number: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
}

/// Order listing, refunds and tracking
pub struct OrdersApi {
    gateway: Arc<ApiGateway>,
}

impl OrdersApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Order>> {
        let envelope = self.gateway.get("/admin/orders").await?;
        super::data_list(&envelope)
    }

    pub async fn get(&self, order_id: &str) -> Result<Order> {
        let envelope = self
            .gateway
            .get(&format!("/admin/orders/{}", order_id))
            .await?;
        super::data_item(&envelope)
    }

    /// Issue a refund for an order. The refund itself happens server-side;
    /// the response message is surfaced to the operator.
    pub async fn refund(&self, order_id: &str) -> Result<Value> {
        self.gateway
            .request(
                &format!("/admin/orders/{}/refund", order_id),
                RequestOptions::method(Method::Post),
            )
            .await
    }

    pub async fn tracking(&self, order_id: &str) -> Result<Tracking> {
        let envelope = self
            .gateway
            .get(&format!("/order/get-tracking/{}", order_id))
            .await?;
        super::data_item(&envelope)
    }

    pub async fn update_tracking(&self, order_id: &str, tracking: &Tracking) -> Result<()> {
        let payload = json!({
            "courier": tracking.courier,
            "trackingNumber": tracking.tracking_number,
            "status": tracking.status,
            "url": tracking.url,
        });
        self.gateway
            .request(
                &format!("/order/update-tracking/{}", order_id),
                RequestOptions::json(Method::Post, payload),
            )
            .await?;
        Ok(())
    }
}
