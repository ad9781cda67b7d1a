//! Bazaar storefront client library.
//!
//! Talks to the Bazaar REST backend and holds the state of the products
//! page: catalog and search, the cart, the UPI checkout workflow and the
//! notification banner. Front-ends (the `bazaar` CLI, tests) drive it
//! through [`page::ProductsPage`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notification;
pub mod page;
pub mod session;

#[cfg(test)]
mod test_support;
