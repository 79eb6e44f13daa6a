//! Catalog and review commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use storefront::{ProductId, Route};

use crate::handlers::product as handlers;
use crate::output::{print_item, print_table, OutputFormat};
use crate::shell::Shell;

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products
    #[command(alias = "ls")]
    List {
        /// Filter by category name
        #[arg(short, long)]
        category: Option<String>,
        /// Search term
        #[arg(short, long)]
        search: Option<String>,
        /// Page number
        #[arg(short, long)]
        page: Option<u32>,
        /// Fetch every page
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },

    /// Show a product with its reviews
    Show {
        /// Product ID
        id: ProductId,
    },

    /// List categories
    Categories,

    /// Review a product
    Review {
        /// Product ID
        id: ProductId,
        /// Stars, 1 to 5
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long, default_value = "")]
        comment: String,
    },

    /// Delete one of your reviews
    Unreview {
        /// Review ID
        id: i64,
    },
}

pub async fn handle(action: ProductAction, shell: &mut Shell, format: OutputFormat) -> Result<()> {
    match action {
        ProductAction::List {
            category,
            search,
            page,
            all,
        } => {
            if all {
                return list_all(shell, format).await;
            }
            let outcome = shell
                .visit(Route::Home, |client| async move {
                    handlers::list_products(&client, category.as_deref(), search.as_deref(), page)
                        .await
                })
                .await?;
            if let Some(result) = outcome.done() {
                let (total, has_next) = (result.total, result.has_next);
                print_table(result.products, format);
                if matches!(format, OutputFormat::Plain) {
                    println!("{}", format!("{total} products").dimmed());
                    if has_next {
                        println!("{}", format!("more: --page {}", page.unwrap_or(1) + 1).dimmed());
                    }
                }
            }
            Ok(())
        }
        ProductAction::Show { id } => {
            let outcome = shell
                .visit(Route::Product(id), |client| async move {
                    handlers::show_product(&client, id).await
                })
                .await?;
            if let Some(detail) = outcome.done() {
                print_item(detail, format);
            }
            Ok(())
        }
        ProductAction::Categories => {
            let outcome = shell
                .visit(Route::Home, |client| async move {
                    handlers::list_categories(&client).await
                })
                .await?;
            if let Some(categories) = outcome.done() {
                print_table(categories, format);
            }
            Ok(())
        }
        ProductAction::Review {
            id,
            rating,
            comment,
        } => {
            let outcome = shell
                .visit(Route::Product(id), |client| async move {
                    handlers::add_review(&client, id, rating, &comment).await
                })
                .await?;
            if let Some(review) = outcome.done() {
                println!("{}", "Review added".green());
                print_item(review, format);
            }
            Ok(())
        }
        ProductAction::Unreview { id } => {
            let outcome = shell
                .visit(Route::Home, |client| async move {
                    handlers::delete_review(&client, id).await
                })
                .await?;
            if outcome.done().is_some() {
                println!("{}", "Review deleted".green());
            }
            Ok(())
        }
    }
}

async fn list_all(shell: &mut Shell, format: OutputFormat) -> Result<()> {
    let outcome = shell
        .visit(Route::Home, |client| async move {
            handlers::list_all_products(&client).await
        })
        .await?;
    if let Some(products) = outcome.done() {
        print_table(products, format);
    }
    Ok(())
}
