//! Favorites API.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    error::Result,
    models::{Favorite, FavoriteStatus, ProductId},
};

/// API for the signed-in user's favorites.
pub struct FavoriteApi {
    client: Arc<ClientInner>,
}

impl FavoriteApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// All favorites.
    pub async fn list(&self) -> Result<Vec<Favorite>> {
        self.client.get("products/favorites/").await
    }

    /// Add a product to favorites.
    pub async fn add(&self, product: impl Into<ProductId>) -> Result<()> {
        let product = product.into();
        let request = self
            .client
            .request(Method::POST, &format!("products/favorites/{product}/add/"))?;
        self.client.call_unit(request).await
    }

    /// Remove a product from favorites.
    pub async fn remove(&self, product: impl Into<ProductId>) -> Result<()> {
        let product = product.into();
        let request = self
            .client
            .request(Method::DELETE, &format!("products/favorites/{product}/remove/"))?;
        self.client.call_unit(request).await
    }

    /// Whether a product is a favorite. Always false when signed out, without a request.
    pub async fn check(&self, product: impl Into<ProductId>) -> Result<bool> {
        if self.client.require_auth().is_err() {
            return Ok(false);
        }
        let product = product.into();
        let status: FavoriteStatus = self
            .client
            .get(&format!("products/favorites/{product}/check/"))
            .await?;
        Ok(status.is_favorite)
    }

    /// Flip favorite state; returns the new state.
    pub async fn toggle(&self, product: impl Into<ProductId>) -> Result<bool> {
        self.client.require_auth()?;
        let product = product.into();
        if self.check(product).await? {
            self.remove(product).await?;
            Ok(false)
        } else {
            self.add(product).await?;
            Ok(true)
        }
    }
}
