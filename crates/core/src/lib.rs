//! Mercado Core - Shared domain types.
//!
//! This crate provides the common types used across the Mercado storefront
//! components:
//! - `storefront` - cart and account session layer over the commerce API
//! - `integration-tests` - live-backend test suite
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! stateful (session stores, API clients) lives in the consuming crates.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails, money, and the cart/customer domain model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
