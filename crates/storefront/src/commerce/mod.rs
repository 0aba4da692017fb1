//! Commerce API client for the Mercado backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth - no local sync, direct GraphQL
//!   calls over `reqwest`
//! - Queries are inline documents deserialized with `serde`; there is no
//!   codegen step
//! - The session layer talks to [`CommerceApi`], a trait seam; the real
//!   implementation is [`CommerceClient`]
//!
//! # Authentication
//!
//! The client reads the customer token from the shared
//! [`SessionStore`](crate::session::SessionStore) on every request and sends
//! it as the `Authorization` bearer. Operations like `customerCart` or
//! `customer` are only meaningful when a token is present; the session layer
//! checks that before calling.

mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::{
    CartItemInput, CartItemUpdateInput, ConfigurableCartItemInput, CustomerInput,
    CustomerUpdateInput, SimpleCartItemInput,
};

use std::sync::Arc;

use thiserror::Error;

use mercado_core::{Cart, CartId, CartItemId, CouponCode, Customer, Email};

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The response parsed but did not have the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A product kind the cart cannot add.
    #[error("Product type '{0}' is not supported in the cart")]
    UnsupportedProduct(String),
}

/// A GraphQL error returned by the commerce API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Magento error category from `extensions.category`, e.g.
    /// `graphql-authorization` or `graphql-no-such-entity`.
    pub category: Option<String>,
}

impl GraphQLError {
    /// Whether the backend rejected the request for lack of authorization.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        self.category.as_deref() == Some("graphql-authorization")
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| match &e.category {
            Some(category) => format!("{} [{category}]", e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// The remote operations the session layer sequences.
///
/// Mirrors the commerce schema one procedure per method. Implemented by
/// [`CommerceClient`] for the real backend and by scripted mocks in tests.
#[allow(async_fn_in_trait)]
pub trait CommerceApi: Send + Sync {
    // ── Cart ────────────────────────────────────────────────────────────

    /// Create an empty guest cart and return its id (`createEmptyCart`).
    async fn create_empty_cart(&self) -> Result<CartId, CommerceError>;

    /// Fetch a cart by id (`cart`).
    async fn cart(&self, cart_id: &CartId) -> Result<Cart, CommerceError>;

    /// Fetch the authenticated customer's cart (`customerCart`).
    async fn customer_cart(&self) -> Result<Cart, CommerceError>;

    /// Merge a guest cart into a customer cart (`mergeCarts`).
    async fn merge_carts(
        &self,
        source: &CartId,
        destination: &CartId,
    ) -> Result<Cart, CommerceError>;

    /// Add simple products (`addSimpleProductsToCart`).
    async fn add_simple_products(
        &self,
        cart_id: &CartId,
        items: Vec<SimpleCartItemInput>,
    ) -> Result<Cart, CommerceError>;

    /// Add configurable product variants (`addConfigurableProductsToCart`).
    async fn add_configurable_products(
        &self,
        cart_id: &CartId,
        items: Vec<ConfigurableCartItemInput>,
    ) -> Result<Cart, CommerceError>;

    /// Remove a line item (`removeItemFromCart`).
    async fn remove_item_from_cart(
        &self,
        cart_id: &CartId,
        item_id: CartItemId,
    ) -> Result<Cart, CommerceError>;

    /// Update line item quantities (`updateCartItems`).
    async fn update_cart_items(
        &self,
        cart_id: &CartId,
        updates: Vec<CartItemUpdateInput>,
    ) -> Result<Cart, CommerceError>;

    /// Apply a coupon (`applyCouponToCart`).
    async fn apply_coupon(
        &self,
        cart_id: &CartId,
        code: &CouponCode,
    ) -> Result<Cart, CommerceError>;

    /// Remove the applied coupon (`removeCouponFromCart`).
    async fn remove_coupon(&self, cart_id: &CartId) -> Result<Cart, CommerceError>;

    // ── Customer ────────────────────────────────────────────────────────

    /// Authenticate and return a customer token (`generateCustomerToken`).
    async fn generate_customer_token(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<String, CommerceError>;

    /// Revoke the current customer token (`revokeCustomerToken`).
    async fn revoke_customer_token(&self) -> Result<(), CommerceError>;

    /// Create a customer account (`createCustomerV2`).
    async fn create_customer(&self, input: CustomerInput) -> Result<Customer, CommerceError>;

    /// Fetch the authenticated customer's profile (`customer`).
    async fn customer(&self) -> Result<Customer, CommerceError>;

    /// Update profile fields (`updateCustomerV2`).
    async fn update_customer(
        &self,
        input: CustomerUpdateInput,
    ) -> Result<Customer, CommerceError>;

    /// Change the account email; requires the current password
    /// (`updateCustomerEmail`).
    async fn update_customer_email(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(), CommerceError>;

    /// Change the account password (`changeCustomerPassword`).
    async fn change_customer_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Customer, CommerceError>;
}

/// Delegation so sessions and tests can share one client behind an `Arc`.
impl<A: CommerceApi> CommerceApi for Arc<A> {
    async fn create_empty_cart(&self) -> Result<CartId, CommerceError> {
        (**self).create_empty_cart().await
    }

    async fn cart(&self, cart_id: &CartId) -> Result<Cart, CommerceError> {
        (**self).cart(cart_id).await
    }

    async fn customer_cart(&self) -> Result<Cart, CommerceError> {
        (**self).customer_cart().await
    }

    async fn merge_carts(
        &self,
        source: &CartId,
        destination: &CartId,
    ) -> Result<Cart, CommerceError> {
        (**self).merge_carts(source, destination).await
    }

    async fn add_simple_products(
        &self,
        cart_id: &CartId,
        items: Vec<SimpleCartItemInput>,
    ) -> Result<Cart, CommerceError> {
        (**self).add_simple_products(cart_id, items).await
    }

    async fn add_configurable_products(
        &self,
        cart_id: &CartId,
        items: Vec<ConfigurableCartItemInput>,
    ) -> Result<Cart, CommerceError> {
        (**self).add_configurable_products(cart_id, items).await
    }

    async fn remove_item_from_cart(
        &self,
        cart_id: &CartId,
        item_id: CartItemId,
    ) -> Result<Cart, CommerceError> {
        (**self).remove_item_from_cart(cart_id, item_id).await
    }

    async fn update_cart_items(
        &self,
        cart_id: &CartId,
        updates: Vec<CartItemUpdateInput>,
    ) -> Result<Cart, CommerceError> {
        (**self).update_cart_items(cart_id, updates).await
    }

    async fn apply_coupon(
        &self,
        cart_id: &CartId,
        code: &CouponCode,
    ) -> Result<Cart, CommerceError> {
        (**self).apply_coupon(cart_id, code).await
    }

    async fn remove_coupon(&self, cart_id: &CartId) -> Result<Cart, CommerceError> {
        (**self).remove_coupon(cart_id).await
    }

    async fn generate_customer_token(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<String, CommerceError> {
        (**self).generate_customer_token(email, password).await
    }

    async fn revoke_customer_token(&self) -> Result<(), CommerceError> {
        (**self).revoke_customer_token().await
    }

    async fn create_customer(&self, input: CustomerInput) -> Result<Customer, CommerceError> {
        (**self).create_customer(input).await
    }

    async fn customer(&self) -> Result<Customer, CommerceError> {
        (**self).customer().await
    }

    async fn update_customer(
        &self,
        input: CustomerUpdateInput,
    ) -> Result<Customer, CommerceError> {
        (**self).update_customer(input).await
    }

    async fn update_customer_email(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(), CommerceError> {
        (**self).update_customer_email(email, password).await
    }

    async fn change_customer_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Customer, CommerceError> {
        (**self)
            .change_customer_password(current_password, new_password)
            .await
    }
}
