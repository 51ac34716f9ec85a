//! Subcategory management commands. Create and update carry the optional
//! image upload as multipart.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::subcategories::{ImageUpload, SubcategoriesApi};
use crate::console::{output, prompt_confirm, require_session, OutputFormat};
use crate::error::Result;
use crate::AppContext;

#[derive(Debug, Args)]
pub struct SubcategoryArgs {
    #[command(subcommand)]
    pub command: SubcategoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubcategoryCommand {
    /// List all subcategories
    List,
    /// Create a subcategory under a category
    Add {
        /// Subcategory name
        name: String,
        /// Parent category id
        #[arg(short, long)]
        category: String,
        /// Image file to upload
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Update a subcategory
    Update {
        /// Subcategory id
        id: String,
        /// New name
        #[arg(short, long)]
        name: String,
        /// Parent category id
        #[arg(short, long)]
        category: String,
        /// Replacement image file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete a subcategory
    Delete {
        /// Subcategory id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct SubcategoryRow {
    id: String,
    name: String,
    category: String,
    image: String,
}

async fn load_image(path: &Option<PathBuf>) -> Result<Option<ImageUpload>> {
    match path {
        Some(path) => Ok(Some(ImageUpload::from_path(path).await?)),
        None => Ok(None),
    }
}

pub async fn execute(ctx: &AppContext, args: &SubcategoryArgs, format: OutputFormat) -> Result<()> {
    require_session(ctx).await?;
    let api = SubcategoriesApi::new(ctx.gateway.clone());

    match &args.command {
        SubcategoryCommand::List => {
            let subcategories = api.list().await?;
            let rows: Vec<SubcategoryRow> = subcategories
                .iter()
                .map(|s| SubcategoryRow {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    category: s.category.clone().unwrap_or_default(),
                    image: ctx
                        .gateway
                        .asset_url(s.image.as_deref().unwrap_or_default()),
                })
                .collect();
            output::print_list(&rows, format);
        }
        SubcategoryCommand::Add {
            name,
            category,
            image,
        } => {
            let upload = load_image(image).await?;
            api.create(name, category, upload).await?;
            output::print_success(&format!("Subcategory '{}' created", name.trim()));
        }
        SubcategoryCommand::Update {
            id,
            name,
            category,
            image,
        } => {
            let upload = load_image(image).await?;
            api.update(id, name, category, upload).await?;
            output::print_success(&format!("Subcategory {} updated", id));
        }
        SubcategoryCommand::Delete { id, yes } => {
            if !yes && !prompt_confirm(&format!("Delete subcategory {}?", id))? {
                output::print_warning("Aborted");
                return Ok(());
            }
            api.remove(id).await?;
            output::print_success(&format!("Subcategory {} deleted", id));
        }
    }

    Ok(())
}
