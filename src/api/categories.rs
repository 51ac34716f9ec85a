use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::gateway::transport::Method;
use crate::gateway::{ApiGateway, RequestOptions};

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Category CRUD
pub struct CategoriesApi {
    gateway: Arc<ApiGateway>,
}

impl CategoriesApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let envelope = self.gateway.get("/categories").await?;
        super::data_list(&envelope)
    }

    pub async fn create(&self, name: &str) -> Result<()> {
        self.gateway
            .request(
                "/categories",
                RequestOptions::json(Method::Post, json!({ "name": name.trim() })),
            )
            .await?;
        Ok(())
    }

    pub async fn update(&self, id: &str, name: &str) -> Result<()> {
        self.gateway
            .request(
                &format!("/categories/{}", id),
                RequestOptions::json(Method::Put, json!({ "name": name.trim() })),
            )
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.gateway
            .request(
                &format!("/categories/{}", id),
                RequestOptions::method(Method::Delete),
            )
            .await?;
        Ok(())
    }
}
