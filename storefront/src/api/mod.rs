//! API modules.

mod account;
mod cart;
mod favorite;
mod order;
mod product;
mod review;

pub(crate) use account::AccountApi;
pub use cart::CartApi;
pub use favorite::FavoriteApi;
pub use order::OrderApi;
pub use product::{CategoryApi, ProductApi, ProductListBuilder};
pub use review::ReviewApi;
