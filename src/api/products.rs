use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::api::de;
use crate::api::subcategories::ImageUpload;
use crate::error::Result;
use crate::gateway::transport::{Method, MultipartForm};
use crate::gateway::{ApiGateway, RequestOptions};

/// SKU prefix for generated product codes
const SKU_PREFIX: &str = "Choisex";
/// How many random SKUs to try before falling back to a timestamp suffix
const MAX_SKU_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Rating {
    #[serde(default, deserialize_with = "de::loose_i64")]
    pub star: i64,
    #[serde(rename = "Review", default)]
    pub review: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub userimage: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de::loose_f64")]
    pub price: f64,
    /// Strike-through list price
    #[serde(default, deserialize_with = "de::loose_f64")]
    pub markprice: f64,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub category: Option<String>,
    #[serde(rename = "Availability", default)]
    pub availability: Option<String>,
    #[serde(rename = "Waterproof", default)]
    pub waterproof: Option<String>,
    #[serde(rename = "Rechargeable", default)]
    pub rechargeable: Option<String>,
    #[serde(rename = "Material", default)]
    pub material: Option<String>,
    #[serde(rename = "Feature", default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub customerrating: Vec<Rating>,
}

/// Everything the create/update form submits. Images ride along as raw
/// multipart file parts; existing media paths are echoed back so the backend
/// keeps them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub price: String,
    pub markprice: String,
    pub category: String,
    pub availability: String,
    pub waterproof: String,
    pub rechargeable: String,
    pub material: String,
    pub feature: String,
    pub description: String,
    #[serde(skip)]
    pub main_image: Option<ImageUpload>,
    #[serde(skip)]
    pub gallery: Vec<ImageUpload>,
    pub existing_main_image: String,
    pub existing_gallery: Vec<String>,
}

impl ProductDraft {
    fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("SKU", self.sku.clone())
            .text("name", self.name.clone())
            .text("price", self.price.clone())
            .text("markprice", self.markprice.clone())
            .text("category", self.category.clone())
            .text("Availability", self.availability.clone())
            .text("Waterproof", self.waterproof.clone())
            .text("Rechargeable", self.rechargeable.clone())
            .text("Material", self.material.clone())
            .text("Feature", self.feature.clone())
            .text("description", self.description.clone())
            // The default review slot the add-product form always submits
            .text(
                "customerrating",
                json!([{"star": 5, "Review": "", "username": "", "userimage": ""}]).to_string(),
            );

        if let Some(main) = &self.main_image {
            form = form.file("mainImage", main.file_name.clone(), main.mime.clone(), main.data.clone());
        }
        for file in &self.gallery {
            form = form.file("gallery", file.file_name.clone(), file.mime.clone(), file.data.clone());
        }

        form = form.text("existingMainImage", self.existing_main_image.clone());
        form.text(
            "existingGallery",
            serde_json::to_string(&self.existing_gallery).unwrap_or_else(|_| "[]".to_string()),
        )
    }
}

/// Product CRUD plus the SKU generator the add-product screen relies on
pub struct ProductsApi {
    gateway: Arc<ApiGateway>,
}

impl ProductsApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        let envelope = self.gateway.get("/products").await?;
        super::data_list(&envelope)
    }

    pub async fn get(&self, id: &str) -> Result<Product> {
        let envelope = self.gateway.get(&format!("/products/{}", id)).await?;
        super::data_item(&envelope)
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<()> {
        self.gateway
            .request(
                "/products",
                RequestOptions::multipart(Method::Post, draft.to_form()),
            )
            .await?;
        Ok(())
    }

    pub async fn update(&self, id: &str, draft: &ProductDraft) -> Result<()> {
        self.gateway
            .request(
                &format!("/products/{}", id),
                RequestOptions::multipart(Method::Put, draft.to_form()),
            )
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.gateway
            .request(
                &format!("/products/{}", id),
                RequestOptions::method(Method::Delete),
            )
            .await?;
        Ok(())
    }

    /// Generate an SKU not already taken by an existing product. When the
    /// product list cannot be fetched, a random candidate is returned anyway;
    /// the backend is the final arbiter of uniqueness.
    pub async fn generate_unique_sku(&self) -> String {
        let existing: HashSet<String> = match self.list().await {
            Ok(products) => products
                .iter()
                .filter_map(|p| p.sku.as_ref())
                .map(|s| s.to_lowercase())
                .collect(),
            Err(e) => {
                warn!(error = %e, "Could not fetch products for SKU check");
                return random_sku();
            }
        };

        for _ in 0..MAX_SKU_ATTEMPTS {
            let candidate = random_sku();
            if !existing.contains(&candidate.to_lowercase()) {
                return candidate;
            }
        }

        // Too many collisions: suffix with the clock to force uniqueness
        let stamp = chrono::Utc::now().timestamp_millis().to_string();
        let tail = &stamp[stamp.len().saturating_sub(4)..];
        format!("{}{}", SKU_PREFIX, tail)
    }
}

fn random_sku() -> String {
    format!("{}{:02}", SKU_PREFIX, fastrand::u32(1..=99))
}
