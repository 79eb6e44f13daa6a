//! Cart API.

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use crate::{
    client::ClientInner,
    error::Result,
    models::{AddToCart, Cart, CartItemId},
    validation,
};

/// API for the signed-in user's cart.
pub struct CartApi {
    client: Arc<ClientInner>,
}

impl CartApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// Current cart contents.
    pub async fn get(&self) -> Result<Cart> {
        let cart: Cart = self.client.get("orders/cart/").await?;
        self.client.session.set_cart_count(cart.count);
        Ok(cart)
    }

    /// Add a product.
    pub async fn add(&self, item: AddToCart) -> Result<()> {
        validation::quantity(item.quantity)?;
        let request = self
            .client
            .request(Method::POST, "orders/cart/add/")?
            .json(&item)?;
        self.client.call_unit(request).await
    }

    /// Change the quantity of a cart line.
    pub async fn update(&self, item: impl Into<CartItemId>, quantity: u32) -> Result<()> {
        validation::quantity(quantity)?;
        let item = item.into();
        let request = self
            .client
            .request(Method::PUT, &format!("orders/cart/{item}/update/"))?
            .json(&json!({ "quantity": quantity }))?;
        self.client.call_unit(request).await
    }

    /// Remove a cart line.
    pub async fn remove(&self, item: impl Into<CartItemId>) -> Result<()> {
        let item = item.into();
        let request = self
            .client
            .request(Method::DELETE, &format!("orders/cart/{item}/remove/"))?;
        self.client.call_unit(request).await
    }

    /// Empty the cart.
    pub async fn clear(&self) -> Result<()> {
        let request = self.client.request(Method::DELETE, "orders/cart/clear/")?;
        self.client.call_unit(request).await?;
        self.client.session.set_cart_count(0);
        Ok(())
    }

    /// Refetch the navigation badge count. Signed out, the badge is zero and
    /// nothing is fetched.
    pub async fn refresh_badge(&self) -> Result<u32> {
        if self.client.require_auth().is_err() {
            return Ok(0);
        }
        Ok(self.get().await?.count)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::mock::MockTransport;
    use crate::models::{AddToCart, TokenPair, User, AuthPayload};
    use crate::StorefrontClient;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn signed_in(transport: Arc<MockTransport>) -> StorefrontClient {
        let client = StorefrontClient::builder()
            .transport(transport)
            .build()
            .unwrap();
        client
            .inner
            .session
            .establish(AuthPayload {
                user: User::new(1, "alice"),
                tokens: TokenPair {
                    access: "A".into(),
                    refresh: "R".into(),
                },
            })
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_badge_skips_request_when_signed_out() {
        let transport = Arc::new(MockTransport::new());
        let client = StorefrontClient::builder()
            .transport(transport.clone())
            .build()
            .unwrap();

        assert_eq!(client.cart().refresh_badge().await.unwrap(), 0);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_badge_caches_count() {
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::GET, "/api/orders/cart/", 200, json!({"cart_items": [], "total": 0, "count": 3}));
        let client = signed_in(transport);

        assert_eq!(client.cart_badge(), 0);
        assert_eq!(client.cart().refresh_badge().await.unwrap(), 3);
        assert_eq!(client.cart_badge(), 3);
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let transport = Arc::new(MockTransport::new());
        let client = signed_in(transport.clone());

        assert!(client.cart().add(AddToCart::new(5, 0)).await.is_err());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_business_error_surfaces_message() {
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::POST, "/api/orders/cart/add/", 400, json!({"error": "Only 2 items in stock"}));
        let client = signed_in(transport);

        let err = client.cart().add(AddToCart::new(5, 3)).await.unwrap_err();
        assert_eq!(err.user_message("Failed to add to cart"), "Only 2 items in stock");
        assert!(client.is_authenticated());
    }
}
