//! Favorite commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use storefront::{ProductId, Route};

use crate::handlers::product as handlers;
use crate::output::{print_table, OutputFormat};
use crate::shell::Shell;

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// List favorite products
    #[command(alias = "ls")]
    List,

    /// Add a product to favorites
    Add {
        /// Product ID
        id: ProductId,
    },

    /// Remove a product from favorites
    #[command(alias = "rm")]
    Remove {
        /// Product ID
        id: ProductId,
    },

    /// Add or remove, whichever applies
    Toggle {
        /// Product ID
        id: ProductId,
    },
}

pub async fn handle(action: FavoriteAction, shell: &mut Shell, format: OutputFormat) -> Result<()> {
    match action {
        FavoriteAction::List => {
            let outcome = shell
                .visit(Route::Favorites, |client| async move {
                    handlers::list_favorites(&client).await
                })
                .await?;
            if let Some(products) = outcome.done() {
                print_table(products, format);
            }
        }
        FavoriteAction::Add { id } => {
            let outcome = shell
                .visit(Route::Favorites, |client| async move {
                    handlers::add_favorite(&client, id).await
                })
                .await?;
            if outcome.done().is_some() {
                println!("{}", "Added to favorites".green());
            }
        }
        FavoriteAction::Remove { id } => {
            let outcome = shell
                .visit(Route::Favorites, |client| async move {
                    handlers::remove_favorite(&client, id).await
                })
                .await?;
            if outcome.done().is_some() {
                println!("{}", "Removed from favorites".green());
            }
        }
        FavoriteAction::Toggle { id } => {
            let outcome = shell
                .visit(Route::Favorites, |client| async move {
                    handlers::toggle_favorite(&client, id).await
                })
                .await?;
            match outcome.done() {
                Some(true) => println!("{}", "Added to favorites".green()),
                Some(false) => println!("{}", "Removed from favorites".green()),
                None => {}
            }
        }
    }
    Ok(())
}
