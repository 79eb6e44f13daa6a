//! Cart handlers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use storefront::{AddToCart, Cart, CartItem, ProductId, StorefrontClient};

use crate::output::{format_price, PlainPrint, TableRow};

/// One cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub subtotal: f64,
}

impl From<&CartItem> for CartLine {
    fn from(item: &CartItem) -> Self {
        let product = &item.product_details;
        Self {
            id: item.id.get(),
            product_id: item.product.unwrap_or(product.id).get(),
            name: product.name.clone(),
            price: product.price,
            quantity: item.quantity,
            subtotal: item.subtotal,
        }
    }
}

impl TableRow for CartLine {
    fn headers() -> Vec<&'static str> {
        vec!["Item", "Product", "Price", "Qty", "Subtotal"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format_price(self.price),
            self.quantity.to_string(),
            format_price(self.subtotal),
        ]
    }
}

impl PlainPrint for CartLine {
    fn plain_print(&self) {
        println!(
            "[{}] {} x{} {}",
            self.id.to_string().cyan(),
            self.name.bold(),
            self.quantity,
            format_price(self.subtotal).green()
        );
    }
}

/// Cart contents.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    pub count: u32,
    pub total: f64,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.cart_items.iter().map(CartLine::from).collect(),
            count: cart.count,
            total: cart.total,
        }
    }
}

pub async fn show(client: &StorefrontClient) -> Result<CartSummary> {
    let cart = client.cart().get().await?;
    Ok(CartSummary::from(&cart))
}

pub async fn add(client: &StorefrontClient, product: ProductId, quantity: u32) -> Result<u32> {
    let cart = client.cart();
    cart.add(AddToCart::new(product, quantity)).await?;
    Ok(cart.refresh_badge().await?)
}

pub async fn update(client: &StorefrontClient, item: i64, quantity: u32) -> Result<u32> {
    let cart = client.cart();
    cart.update(item, quantity).await?;
    Ok(cart.refresh_badge().await?)
}

pub async fn remove(client: &StorefrontClient, item: i64) -> Result<u32> {
    let cart = client.cart();
    cart.remove(item).await?;
    Ok(cart.refresh_badge().await?)
}

pub async fn clear(client: &StorefrontClient) -> Result<()> {
    client.cart().clear().await?;
    Ok(())
}

/// Navigation badge count; zero when signed out.
pub async fn badge(client: &StorefrontClient) -> Result<u32> {
    Ok(client.cart().refresh_badge().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_summary() {
        let cart: Cart = serde_json::from_value(json!({
            "cart_items": [{
                "id": 9,
                "product": 3,
                "product_details": {"id": 3, "name": "Cap", "price": "10.00"},
                "quantity": 2,
                "subtotal": "20.00"
            }],
            "total": "20.00",
            "count": 2
        }))
        .unwrap();

        let summary = CartSummary::from(&cart);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.items[0].product_id, 3);
        assert_eq!(summary.items[0].row()[4], "₹20.00");
    }
}
