//! Cart models.

use serde::{Deserialize, Serialize};

use super::{amount, CartItemId, Product, ProductId};

/// The signed-in user's cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cart {
    pub cart_items: Vec<CartItem>,
    #[serde(deserialize_with = "amount::deserialize")]
    pub total: f64,
    /// Item count shown in the navigation badge.
    pub count: u32,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.cart_items.is_empty()
    }
}

/// One line of the cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Option<ProductId>,
    pub product_details: Product,
    pub quantity: u32,
    #[serde(deserialize_with = "amount::deserialize")]
    pub subtotal: f64,
}

/// Add-to-cart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl AddToCart {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}
