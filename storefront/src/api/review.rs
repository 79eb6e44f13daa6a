//! Review API.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    error::Result,
    models::{NewReview, ProductId, Review, ReviewId},
    validation,
};

/// API for product reviews.
pub struct ReviewApi {
    client: Arc<ClientInner>,
}

impl ReviewApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// Reviews of a product.
    pub async fn list(&self, product: impl Into<ProductId>) -> Result<Vec<Review>> {
        let product = product.into();
        self.client.get(&format!("products/{product}/reviews/")).await
    }

    /// Review a product.
    pub async fn create(&self, product: impl Into<ProductId>, review: &NewReview) -> Result<Review> {
        validation::review(review)?;
        let product = product.into();
        let request = self
            .client
            .request(Method::POST, &format!("products/{product}/reviews/create/"))?
            .json(review)?;
        self.client.call(request).await
    }

    /// Delete one of the user's reviews.
    pub async fn delete(&self, review: impl Into<ReviewId>) -> Result<()> {
        let review = review.into();
        let request = self
            .client
            .request(Method::DELETE, &format!("products/reviews/{review}/delete/"))?;
        self.client.call_unit(request).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::mock::MockTransport;
    use crate::client::RequestBody;
    use crate::models::NewReview;
    use crate::StorefrontClient;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>) -> StorefrontClient {
        StorefrontClient::builder()
            .transport(transport)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_posts_rating_and_comment() {
        let transport = Arc::new(MockTransport::new());
        transport.on(
            Method::POST,
            "/api/products/4/reviews/create/",
            201,
            json!({"id": 8, "user_name": "alice", "rating": 5, "comment": "great"}),
        );

        let review = client(transport.clone())
            .reviews()
            .create(4, &NewReview::new(5, "great"))
            .await
            .unwrap();

        assert_eq!(review.rating, 5);
        assert_eq!(
            transport.requests()[0].body,
            RequestBody::Json(json!({"rating": 5, "comment": "great"}))
        );
    }

    #[tokio::test]
    async fn test_create_rejects_bad_rating() {
        let transport = Arc::new(MockTransport::new());
        let err = client(transport.clone())
            .reviews()
            .create(4, &NewReview::new(0, ""))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Rating must be between 1 and 5");
        assert!(transport.requests().is_empty());
    }
}
