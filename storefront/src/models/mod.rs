//! Data models for storefront entities.

pub mod amount;
mod cart;
mod ids;
mod order;
mod product;
mod review;
mod user;

pub use cart::{AddToCart, Cart, CartItem};
pub use ids::{CartItemId, CategoryId, FavoriteId, OrderId, ProductId, ReviewId, UserId};
pub use order::{
    CardDetails, CheckoutForm, Order, OrderCreated, OrderItem, OrderStatus, PaymentMethod,
    StatusUpdate,
};
pub use product::{
    Category, Favorite, FavoriteStatus, ImageUpload, Page, Product, ProductForm, ProductStats,
};
pub use review::{NewReview, Review};
pub use user::{AuthPayload, Credentials, PasswordChange, ProfileUpdate, Registration, TokenPair, User};
