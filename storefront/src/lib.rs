//! Rust client library for the storefront REST service.
//!
//! A [`StorefrontClient`] owns one session. Every request goes through its
//! [`RequestDispatcher`], which attaches the stored access token and tears
//! the session down when the service rejects it.

pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod session;
pub mod storage;
pub mod validation;

// Re-export main types
pub use client::{
    HttpConfig, RequestDispatcher, RequestScope, Scoped, StorefrontClient,
    StorefrontClientBuilder, Transport,
};
pub use error::{Error, Result};
pub use notify::{LogNotifier, MemoryNotifier, Notice, NoticeLevel, Notifier};
pub use routes::{navigate, Access, Navigation, Route};
pub use session::{Session, SessionEvent, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};

// Re-export commonly used models
pub use models::{
    AddToCart, Cart, CartItem, Category, CheckoutForm, Credentials, Favorite, NewReview, Order,
    OrderId, OrderStatus, Page, PaymentMethod, Product, ProductForm, ProductId, Registration,
    Review, User, UserId,
};

// Re-export API types
pub use api::{CartApi, CategoryApi, FavoriteApi, OrderApi, ProductApi, ProductListBuilder, ReviewApi};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_client_builder() {
        let client = StorefrontClient::builder().build();
        assert!(client.is_ok());

        let client = client.unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(client.cart_badge(), 0);
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let client = StorefrontClient::builder().base_url("not a url").build();
        assert!(matches!(client, Err(Error::Url(_))));
    }

    #[test]
    fn test_client_restores_stored_session() {
        let storage = Arc::new(MemoryStorage::with_entries([
            (storage::ACCESS_TOKEN_KEY, "A"),
            (storage::REFRESH_TOKEN_KEY, "R"),
            (storage::USER_KEY, r#"{"id": 3, "username": "carol", "is_admin": true}"#),
        ]));

        let client = StorefrontClient::builder().storage(storage).build().unwrap();

        let session = client.current_session();
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.user_id(), Some(UserId(3)));
    }
}
