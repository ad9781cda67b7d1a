//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types used across all Bazaar components:
//! - `storefront` - REST client, checkout workflow and page controller
//! - `cli` - Terminal front-end over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async runtime. Anything that talks to the backend lives in
//! `bazaar-storefront`.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, rupee prices, statuses, products and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
