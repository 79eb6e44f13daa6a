//! Business logic handlers shared by the commands.

pub mod account;
pub mod cart;
pub mod order;
pub mod product;
