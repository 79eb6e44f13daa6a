//! Admin dashboard commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use storefront::models::ImageUpload;
use storefront::{OrderId, OrderStatus, ProductForm, ProductId, Route};

use crate::handlers::{order, product};
use crate::output::{print_item, print_table, OutputFormat};
use crate::shell::Shell;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Catalog statistics
    Stats,

    /// Every product, including inactive ones
    Products,

    /// Add a product
    Create(ProductArgs),

    /// Edit a product; unset options keep their current value
    Edit {
        /// Product ID
        id: ProductId,
        #[command(flatten)]
        fields: ProductArgs,
    },

    /// Delete a product
    Delete {
        /// Product ID
        id: ProductId,
    },

    /// Every order
    Orders,

    /// Set an order's status
    Status {
        /// Order ID
        id: OrderId,
        /// pending, processing, shipped, delivered or cancelled
        status: OrderStatus,
    },
}

#[derive(Args, Default)]
pub struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<String>,
    /// Category ID
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    stock: Option<String>,
    #[arg(long)]
    size: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    material: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    /// Up to three image files
    #[arg(long = "image", num_args = 1..=3)]
    images: Vec<PathBuf>,
}

impl ProductArgs {
    /// Read the image files.
    fn load(self) -> Result<ProductEdit> {
        let images = self
            .images
            .iter()
            .map(|path| product::load_image(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(ProductEdit { args: self, images })
    }
}

/// Form changes ready to apply.
struct ProductEdit {
    args: ProductArgs,
    images: Vec<ImageUpload>,
}

impl ProductEdit {
    /// Write the set options into `form`; unset ones keep their value.
    fn apply(self, form: &mut ProductForm) {
        let args = self.args;
        let fields = [
            (args.name, &mut form.name),
            (args.description, &mut form.description),
            (args.price, &mut form.price),
            (args.category, &mut form.category),
            (args.stock, &mut form.stock),
            (args.size, &mut form.size),
            (args.color, &mut form.color),
            (args.material, &mut form.material),
            (args.brand, &mut form.brand),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }

        let slots = [&mut form.image, &mut form.image2, &mut form.image3];
        for (image, slot) in self.images.into_iter().zip(slots) {
            *slot = Some(image);
        }
    }
}

pub async fn handle(action: AdminAction, shell: &mut Shell, format: OutputFormat) -> Result<()> {
    match action {
        AdminAction::Stats => {
            let outcome = shell
                .visit(Route::Admin, |client| async move { product::stats(&client).await })
                .await?;
            if let Some(stats) = outcome.done() {
                print_item(stats, format);
            }
        }
        AdminAction::Products => {
            let outcome = shell
                .visit(Route::Admin, |client| async move {
                    product::admin_products(&client).await
                })
                .await?;
            if let Some(products) = outcome.done() {
                print_table(products, format);
            }
        }
        AdminAction::Create(args) => {
            let mut form = ProductForm::default();
            args.load()?.apply(&mut form);
            let outcome = shell
                .visit(Route::Admin, |client| async move {
                    product::create_product(&client, &form).await
                })
                .await?;
            if let Some(created) = outcome.done() {
                println!("{}", "Product created".green());
                print_item(created, format);
            }
        }
        AdminAction::Edit { id, fields } => {
            let edit = fields.load()?;
            let outcome = shell
                .visit(Route::Admin, |client| async move {
                    product::update_product(&client, id, |form| edit.apply(form)).await
                })
                .await?;
            if let Some(updated) = outcome.done() {
                println!("{}", "Product updated".green());
                print_item(updated, format);
            }
        }
        AdminAction::Delete { id } => {
            let outcome = shell
                .visit(Route::Admin, |client| async move {
                    product::delete_product(&client, id).await
                })
                .await?;
            if outcome.done().is_some() {
                println!("{}", "Product deleted".green());
            }
        }
        AdminAction::Orders => {
            let outcome = shell
                .visit(Route::Admin, |client| async move { order::admin_all(&client).await })
                .await?;
            if let Some(orders) = outcome.done() {
                print_table(orders, format);
            }
        }
        AdminAction::Status { id, status } => {
            let outcome = shell
                .visit(Route::Admin, |client| async move {
                    order::update_status(&client, id, status).await
                })
                .await?;
            if outcome.done().is_some() {
                println!("{} {}", "Order status set to".green(), status);
            }
        }
    }
    Ok(())
}
