//! Category management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::api::categories::CategoriesApi;
use crate::console::{output, prompt_confirm, require_session, OutputFormat};
use crate::error::Result;
use crate::AppContext;

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// List all categories
    List,
    /// Create a category
    Add {
        /// Category name
        name: String,
    },
    /// Rename a category
    Rename {
        /// Category id
        id: String,
        /// New name
        name: String,
    },
    /// Delete a category
    Delete {
        /// Category id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    id: String,
    name: String,
}

pub async fn execute(ctx: &AppContext, args: &CategoryArgs, format: OutputFormat) -> Result<()> {
    require_session(ctx).await?;
    let api = CategoriesApi::new(ctx.gateway.clone());

    match &args.command {
        CategoryCommand::List => {
            let categories = api.list().await?;
            let rows: Vec<CategoryRow> = categories
                .iter()
                .map(|c| CategoryRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        CategoryCommand::Add { name } => {
            api.create(name).await?;
            output::print_success(&format!("Category '{}' created", name.trim()));
        }
        CategoryCommand::Rename { id, name } => {
            api.update(id, name).await?;
            output::print_success(&format!("Category {} renamed to '{}'", id, name.trim()));
        }
        CategoryCommand::Delete { id, yes } => {
            if !yes && !prompt_confirm(&format!("Delete category {}?", id))? {
                output::print_warning("Aborted");
                return Ok(());
            }
            api.remove(id).await?;
            output::print_success(&format!("Category {} deleted", id));
        }
    }

    Ok(())
}
