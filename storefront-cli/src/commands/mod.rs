//! CLI commands.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod favorite;
pub mod order;
pub mod product;
