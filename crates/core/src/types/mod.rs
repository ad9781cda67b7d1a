//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{Cart, CartItem, QuantityChange};
pub use id::*;
pub use price::Price;
pub use product::Product;
pub use status::*;
