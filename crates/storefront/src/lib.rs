//! Mercado Storefront - cart and account session layer.
//!
//! This crate implements the client-side state of a headless storefront on
//! top of a Magento-compatible GraphQL commerce API. It owns no business
//! logic of its own: pricing, authentication and persistence all live in
//! the backend. What lives here is the request sequencing around them:
//!
//! - cart-identity resolution (guest cart id vs. customer token),
//! - cart merge when a guest logs in,
//! - per-operation error slots and a shared loading flag around each chain
//!   of remote calls.
//!
//! # Architecture
//!
//! - [`commerce`] - GraphQL client for the commerce API, behind the
//!   [`commerce::CommerceApi`] trait so the session layer can be tested
//!   against a scripted backend
//! - [`session`] - the persisted customer-token / cart-id pair (the
//!   storefront cookies), behind [`session::SessionStore`]
//! - [`cart`] - the cart composable, [`cart::CartSession`]
//! - [`user`] - the account composable, [`user::UserSession`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mercado_storefront::commerce::CommerceClient;
//! use mercado_storefront::config::StorefrontConfig;
//! use mercado_storefront::cart::CartSession;
//! use mercado_storefront::session::MemorySession;
//!
//! let config = StorefrontConfig::from_env()?;
//! let session = Arc::new(MemorySession::default());
//! let client = CommerceClient::new(&config, session.clone())?;
//!
//! let mut cart = CartSession::new(client.clone(), session.clone());
//! cart.load().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod commerce;
pub mod config;
pub mod session;
pub mod user;
