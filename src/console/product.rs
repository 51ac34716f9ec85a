//! Product catalogue commands: listing, detail view, create/update with
//! image uploads, deletion, and the SKU generator.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::products::{Product, ProductDraft, ProductsApi};
use crate::api::subcategories::ImageUpload;
use crate::console::{output, prompt_confirm, require_session, OutputFormat};
use crate::error::Result;
use crate::AppContext;

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

/// Shared field flags for `add` and `update`
#[derive(Debug, Args, Default)]
pub struct ProductFields {
    /// Selling price
    #[arg(long)]
    pub price: Option<String>,
    /// Strike-through list price
    #[arg(long)]
    pub markprice: Option<String>,
    /// Category id
    #[arg(long)]
    pub category: Option<String>,
    /// Stock availability, e.g. "In Stock"
    #[arg(long)]
    pub availability: Option<String>,
    /// Waterproof rating
    #[arg(long)]
    pub waterproof: Option<String>,
    /// Rechargeable or not
    #[arg(long)]
    pub rechargeable: Option<String>,
    /// Build material
    #[arg(long)]
    pub material: Option<String>,
    /// Headline feature
    #[arg(long)]
    pub feature: Option<String>,
    /// Long description
    #[arg(long)]
    pub description: Option<String>,
    /// Main image file to upload
    #[arg(long)]
    pub main_image: Option<PathBuf>,
    /// Gallery image files, repeatable
    #[arg(long)]
    pub gallery: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List the catalogue
    List,
    /// Show one product in full
    Show {
        /// Product id
        id: String,
    },
    /// Create a product
    Add {
        /// Product name
        name: String,
        /// SKU; generated when omitted
        #[arg(long)]
        sku: Option<String>,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Update a product; omitted flags keep their current values
    Update {
        /// Product id
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Generate a fresh unused SKU
    GenerateSku,
}

#[derive(Debug, Serialize, Tabled)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    price: String,
    markprice: String,
    availability: String,
}

async fn load_uploads(fields: &ProductFields) -> Result<(Option<ImageUpload>, Vec<ImageUpload>)> {
    let main_image = match &fields.main_image {
        Some(path) => Some(ImageUpload::from_path(path).await?),
        None => None,
    };
    let mut gallery = Vec::with_capacity(fields.gallery.len());
    for path in &fields.gallery {
        gallery.push(ImageUpload::from_path(path).await?);
    }
    Ok((main_image, gallery))
}

fn show_product(ctx: &AppContext, product: &Product) {
    output::print_kv("Id", &product.id);
    output::print_kv("SKU", product.sku.as_deref().unwrap_or("-"));
    output::print_kv("Name", &product.name);
    output::print_kv("Price", &product.price.to_string());
    output::print_kv("Mark price", &product.markprice.to_string());
    output::print_kv("Category", product.category.as_deref().unwrap_or("-"));
    output::print_kv(
        "Availability",
        product.availability.as_deref().unwrap_or("-"),
    );
    output::print_kv("Waterproof", product.waterproof.as_deref().unwrap_or("-"));
    output::print_kv(
        "Rechargeable",
        product.rechargeable.as_deref().unwrap_or("-"),
    );
    output::print_kv("Material", product.material.as_deref().unwrap_or("-"));
    output::print_kv("Feature", product.feature.as_deref().unwrap_or("-"));
    output::print_kv(
        "Description",
        product.description.as_deref().unwrap_or("-"),
    );
    output::print_kv(
        "Main image",
        &ctx.gateway
            .asset_url(product.main_image.as_deref().unwrap_or_default()),
    );
    for path in &product.gallery {
        output::print_kv("Gallery", &ctx.gateway.asset_url(path));
    }
    output::print_kv("Reviews", &product.customerrating.len().to_string());
}

pub async fn execute(ctx: &AppContext, args: &ProductArgs, format: OutputFormat) -> Result<()> {
    require_session(ctx).await?;
    let api = ProductsApi::new(ctx.gateway.clone());

    match &args.command {
        ProductCommand::List => {
            let products = api.list().await?;
            let rows: Vec<ProductRow> = products
                .iter()
                .map(|p| ProductRow {
                    id: p.id.clone(),
                    sku: p.sku.clone().unwrap_or_default(),
                    name: p.name.clone(),
                    price: p.price.to_string(),
                    markprice: p.markprice.to_string(),
                    availability: p.availability.clone().unwrap_or_default(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        ProductCommand::Show { id } => {
            let product = api.get(id).await?;
            show_product(ctx, &product);
        }
        ProductCommand::Add { name, sku, fields } => {
            let sku = match sku {
                Some(sku) => sku.clone(),
                None => api.generate_unique_sku().await,
            };
            let (main_image, gallery) = load_uploads(fields).await?;
            let draft = ProductDraft {
                sku: sku.clone(),
                name: name.clone(),
                price: fields.price.clone().unwrap_or_default(),
                markprice: fields.markprice.clone().unwrap_or_default(),
                category: fields.category.clone().unwrap_or_default(),
                availability: fields.availability.clone().unwrap_or_default(),
                waterproof: fields.waterproof.clone().unwrap_or_default(),
                rechargeable: fields.rechargeable.clone().unwrap_or_default(),
                material: fields.material.clone().unwrap_or_default(),
                feature: fields.feature.clone().unwrap_or_default(),
                description: fields.description.clone().unwrap_or_default(),
                main_image,
                gallery,
                ..ProductDraft::default()
            };
            api.create(&draft).await?;
            output::print_success(&format!("Product '{}' created with SKU {}", name, sku));
        }
        ProductCommand::Update { id, name, fields } => {
            // Start from the stored product so omitted flags keep their
            // values and existing media is echoed back.
            let current = api.get(id).await?;
            let (main_image, gallery) = load_uploads(fields).await?;
            let pick = |new: &Option<String>, old: Option<&str>| {
                new.clone().unwrap_or_else(|| old.unwrap_or_default().to_string())
            };
            let draft = ProductDraft {
                sku: current.sku.clone().unwrap_or_default(),
                name: name.clone().unwrap_or_else(|| current.name.clone()),
                price: fields
                    .price
                    .clone()
                    .unwrap_or_else(|| current.price.to_string()),
                markprice: fields
                    .markprice
                    .clone()
                    .unwrap_or_else(|| current.markprice.to_string()),
                category: pick(&fields.category, current.category.as_deref()),
                availability: pick(&fields.availability, current.availability.as_deref()),
                waterproof: pick(&fields.waterproof, current.waterproof.as_deref()),
                rechargeable: pick(&fields.rechargeable, current.rechargeable.as_deref()),
                material: pick(&fields.material, current.material.as_deref()),
                feature: pick(&fields.feature, current.feature.as_deref()),
                description: pick(&fields.description, current.description.as_deref()),
                main_image,
                gallery,
                existing_main_image: current.main_image.clone().unwrap_or_default(),
                existing_gallery: current.gallery.clone(),
            };
            api.update(id, &draft).await?;
            output::print_success(&format!("Product {} updated", id));
        }
        ProductCommand::Delete { id, yes } => {
            if !yes && !prompt_confirm(&format!("Delete product {}?", id))? {
                output::print_warning("Aborted");
                return Ok(());
            }
            api.remove(id).await?;
            output::print_success(&format!("Product {} deleted", id));
        }
        ProductCommand::GenerateSku => {
            let sku = api.generate_unique_sku().await;
            println!("{}", sku);
        }
    }

    Ok(())
}
