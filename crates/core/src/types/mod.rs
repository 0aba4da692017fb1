//! Core types for the Mercado storefront.
//!
//! Type-safe wrappers for the domain concepts shared between the session
//! layer and the commerce API client.

pub mod cart;
pub mod customer;
pub mod email;
pub mod id;
pub mod money;
pub mod product;

pub use cart::{Cart, CartItem, Coupon};
pub use customer::Customer;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{CurrencyCode, Money, UnknownCurrency};
pub use product::{Product, ProductKind};
