//! Persisted session state: the customer token and the guest cart id.
//!
//! In the deployed storefront these two values live in cookies managed by
//! the HTTP layer; this module only defines the access seam. The rule the
//! rest of the crate relies on: a customer token present in the store means
//! the visitor is authenticated, and the cart id always names the cart the
//! visitor is currently working with (guest or merged).

use std::sync::RwLock;

use mercado_core::CartId;

/// Cookie names, shared with the edge/UI layer.
pub mod cookie_names {
    /// Cookie holding the customer auth token.
    pub const CUSTOMER: &str = "vsf-customer";

    /// Cookie holding the active cart id.
    pub const CART: &str = "vsf-cart";
}

/// Access to the persisted customer-token / cart-id pair.
///
/// Implementations must tolerate `set_*(None)` as "delete". Reads after a
/// delete return `None`.
pub trait SessionStore: Send + Sync {
    /// The persisted customer token, if the visitor is authenticated.
    fn customer_token(&self) -> Option<String>;

    /// Persist or delete the customer token.
    fn set_customer_token(&self, token: Option<String>);

    /// The persisted cart id, if any.
    fn cart_id(&self) -> Option<CartId>;

    /// Persist or delete the cart id.
    fn set_cart_id(&self, cart_id: Option<CartId>);
}

/// In-memory session store.
///
/// The default store for tools and tests; the deployed storefront wires in
/// a cookie-backed implementation at the edge.
#[derive(Debug, Default)]
pub struct MemorySession {
    state: RwLock<SessionState>,
}

#[derive(Debug, Default)]
struct SessionState {
    customer_token: Option<String>,
    cart_id: Option<CartId>,
}

impl MemorySession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn customer_token(&self) -> Option<String> {
        self.state
            .read()
            .map(|s| s.customer_token.clone())
            .unwrap_or_default()
    }

    fn set_customer_token(&self, token: Option<String>) {
        if let Ok(mut state) = self.state.write() {
            state.customer_token = token;
        }
    }

    fn cart_id(&self) -> Option<CartId> {
        self.state
            .read()
            .map(|s| s.cart_id.clone())
            .unwrap_or_default()
    }

    fn set_cart_id(&self, cart_id: Option<CartId>) {
        if let Ok(mut state) = self.state.write() {
            state.cart_id = cart_id;
        }
    }
}
