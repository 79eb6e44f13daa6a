//! Cart commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use storefront::{ProductId, Route};

use crate::handlers::cart as handlers;
use crate::output::{format_price, print_table, OutputFormat};
use crate::shell::Shell;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,

    /// Add a product
    Add {
        /// Product ID
        id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Change the quantity of a cart item
    Update {
        /// Cart item ID
        item: i64,
        quantity: u32,
    },

    /// Remove a cart item
    #[command(alias = "rm")]
    Remove {
        /// Cart item ID
        item: i64,
    },

    /// Empty the cart
    Clear,

    /// Print the item count shown on the navigation badge
    Badge,
}

pub async fn handle(action: CartAction, shell: &mut Shell, format: OutputFormat) -> Result<()> {
    match action {
        CartAction::Show => {
            let outcome = shell
                .visit(Route::Cart, |client| async move { handlers::show(&client).await })
                .await?;
            let Some(cart) = outcome.done() else {
                return Ok(());
            };
            if matches!(format, OutputFormat::Json) {
                println!("{}", serde_json::to_string_pretty(&cart)?);
                return Ok(());
            }
            if cart.items.is_empty() {
                println!("Your cart is empty");
                return Ok(());
            }
            print_table(cart.items, format);
            println!(
                "{} items, total {}",
                cart.count,
                format_price(cart.total).green().bold()
            );
        }
        CartAction::Add { id, quantity } => {
            let outcome = shell
                .visit(Route::Cart, |client| async move {
                    handlers::add(&client, id, quantity).await
                })
                .await?;
            if let Some(count) = outcome.done() {
                println!("{} ({count} in cart)", "Added to cart".green());
            }
        }
        CartAction::Update { item, quantity } => {
            let outcome = shell
                .visit(Route::Cart, |client| async move {
                    handlers::update(&client, item, quantity).await
                })
                .await?;
            if let Some(count) = outcome.done() {
                println!("{} ({count} in cart)", "Cart updated".green());
            }
        }
        CartAction::Remove { item } => {
            let outcome = shell
                .visit(Route::Cart, |client| async move {
                    handlers::remove(&client, item).await
                })
                .await?;
            if let Some(count) = outcome.done() {
                println!("{} ({count} in cart)", "Item removed".green());
            }
        }
        CartAction::Clear => {
            let outcome = shell
                .visit(Route::Cart, |client| async move { handlers::clear(&client).await })
                .await?;
            if outcome.done().is_some() {
                println!("{}", "Cart cleared".green());
            }
        }
        CartAction::Badge => {
            // Outside the cart view; signed-out users just see zero.
            let outcome = shell
                .visit(Route::Home, |client| async move { handlers::badge(&client).await })
                .await?;
            if let Some(count) = outcome.done() {
                println!("{count}");
            }
        }
    }
    Ok(())
}
