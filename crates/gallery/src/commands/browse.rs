//! Browse command - read gallery content through the server-side client.

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use serde_json::json;

use gallery_content::gallery::{self, DEFAULT_CONCURRENCY, PREVIEW_ITEMS_PER_CATEGORY};
use gallery_content::{CallContext, ClientFactory, ContentClient};

use super::Context;

/// Arguments for the browse command.
#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[command(subcommand)]
    pub command: BrowseCommand,
}

#[derive(Subcommand, Debug)]
pub enum BrowseCommand {
    /// List categories of all taxonomies with item previews
    Categories {
        /// Items to preview per category
        #[arg(long, default_value_t = PREVIEW_ITEMS_PER_CATEGORY)]
        limit: u32,

        /// Maximum concurrent requests
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },

    /// Show one item and its renditions
    Item {
        /// Item ID
        id: String,
    },
}

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let auth = ctx.auth_resolver(&config)?;
    let factory = ClientFactory::from_config(&config, auth)?;
    let client = factory.get_client(CallContext::Server)?;

    match args.command {
        BrowseCommand::Categories { limit, concurrency } => {
            cmd_categories(&client, limit, concurrency, ctx).await
        }
        BrowseCommand::Item { id } => cmd_item(&client, &id, ctx).await,
    }
}

async fn cmd_categories(
    client: &ContentClient,
    limit: u32,
    concurrency: usize,
    ctx: &Context,
) -> Result<()> {
    let taxonomies = gallery::fetch_taxonomies(client)
        .await
        .context("Could not load taxonomies (see log for details)")?;
    let categories = gallery::fetch_all_categories(client, &taxonomies, concurrency).await;
    let previews = gallery::fetch_category_previews(client, &categories, limit, concurrency).await;

    if ctx.json_output {
        let output: Vec<_> = categories
            .iter()
            .zip(&previews)
            .map(|(category, preview)| {
                json!({
                    "id": category.id,
                    "name": category.name,
                    "total_results": preview.as_ref().map(|p| p.total_results),
                    "items": preview.as_ref().map(|p| &p.items),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    for (category, preview) in categories.iter().zip(&previews) {
        match preview {
            Some(preview) => {
                println!("{} ({} items)", category.name, preview.total_results);
                for item in &preview.items {
                    println!("  {}  {}", item.id, item.name);
                }
            }
            None => println!("{} (unavailable)", category.name),
        }
    }

    Ok(())
}

async fn cmd_item(client: &ContentClient, id: &str, ctx: &Context) -> Result<()> {
    let Some(item) = gallery::fetch_item(client, id).await else {
        bail!("Item '{}' could not be loaded", id);
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    println!("{} ({})", item.name, item.id);
    println!("Type: {}", item.item_type);
    if let Some(description) = &item.description {
        println!("Description: {}", description);
    }

    if item.fields.renditions.is_empty() {
        println!("No renditions.");
    }
    for rendition in &item.fields.renditions {
        println!("Rendition: {}", rendition.name);
        for format in &rendition.formats {
            if let Some(url) = item.rendition_url(&rendition.name, &format.format) {
                println!("  {:<5} {}", format.format, url);
            }
        }
    }

    Ok(())
}
