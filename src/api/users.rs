use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::de;
use crate::error::Result;
use crate::gateway::ApiGateway;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminUser {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub phone: Option<String>,
    #[serde(rename = "joinDate", deserialize_with = "de::loose_datetime")]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de::loose_i64")]
    pub orders: i64,
    #[serde(rename = "totalSpent", deserialize_with = "de::loose_f64")]
    pub total_spent: f64,
    #[serde(rename = "lastUpdated", deserialize_with = "de::loose_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Read-only customer listing for the users screen
pub struct UsersApi {
    gateway: Arc<ApiGateway>,
}

impl UsersApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<AdminUser>> {
        let envelope = self.gateway.get("/admin/users").await?;
        super::data_list(&envelope)
    }
}
