use std::sync::Arc;

use serde::Deserialize;

use crate::api::de;
use crate::error::Result;
use crate::gateway::transport::{Method, MultipartForm};
use crate::gateway::{ApiGateway, RequestOptions};

#[derive(Debug, Clone, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Parent category: the backend sends either an id or a populated object
    #[serde(default, deserialize_with = "de::loose_string")]
    pub category: Option<String>,
    /// Stored media path, resolved for display via the gateway asset helper
    #[serde(default)]
    pub image: Option<String>,
}

/// An image picked for upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk, deriving the mime type from the extension
    pub async fn from_path(path: &std::path::Path) -> Result<Self> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            crate::error::AdminError::Storage(format!("failed to read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let mime = match path.extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        };
        Ok(Self {
            file_name,
            mime: mime.to_string(),
            data,
        })
    }
}

/// Subcategory CRUD; create/update carry the image as multipart
pub struct SubcategoriesApi {
    gateway: Arc<ApiGateway>,
}

impl SubcategoriesApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Subcategory>> {
        let envelope = self.gateway.get("/subcategories").await?;
        super::data_list(&envelope)
    }

    pub async fn create(
        &self,
        name: &str,
        category_id: &str,
        image: Option<ImageUpload>,
    ) -> Result<()> {
        let form = build_form(name, category_id, image);
        self.gateway
            .request("/subcategories", RequestOptions::multipart(Method::Post, form))
            .await?;
        Ok(())
    }

    pub async fn update(
        &self,
        id: &str,
        name: &str,
        category_id: &str,
        image: Option<ImageUpload>,
    ) -> Result<()> {
        let form = build_form(name, category_id, image);
        self.gateway
            .request(
                &format!("/subcategories/{}", id),
                RequestOptions::multipart(Method::Put, form),
            )
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.gateway
            .request(
                &format!("/subcategories/{}", id),
                RequestOptions::method(Method::Delete),
            )
            .await?;
        Ok(())
    }
}

fn build_form(name: &str, category_id: &str, image: Option<ImageUpload>) -> MultipartForm {
    let mut form = MultipartForm::new()
        .text("name", name.trim())
        .text("category", category_id);
    if let Some(image) = image {
        form = form.file("image", image.file_name, image.mime, image.data);
    }
    form
}
