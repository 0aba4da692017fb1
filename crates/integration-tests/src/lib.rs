//! Live-backend integration tests for the Mercado storefront.
//!
//! All tests in this crate are `#[ignore]`d by default; they need a
//! reachable Magento-compatible GraphQL endpoint.
//!
//! # Running
//!
//! ```bash
//! export COMMERCE_GRAPHQL_URL=https://backend.example/graphql
//! # Account tests additionally need a disposable test account:
//! export COMMERCE_TEST_EMAIL=test@example.com
//! export COMMERCE_TEST_PASSWORD=...
//!
//! cargo test -p mercado-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use mercado_core::Email;
use mercado_storefront::commerce::CommerceClient;
use mercado_storefront::config::StorefrontConfig;
use mercado_storefront::session::MemorySession;

/// A client plus the session store backing it, wired against the backend
/// named by `COMMERCE_GRAPHQL_URL`.
pub struct LiveBackend {
    pub store: Arc<MemorySession>,
    pub client: CommerceClient,
}

impl LiveBackend {
    /// Connect to the configured backend. Panics on missing configuration;
    /// tests using this are `#[ignore]`d exactly because of that.
    #[must_use]
    pub fn connect() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let config = StorefrontConfig::from_env().expect("COMMERCE_GRAPHQL_URL must be set");
        let store = Arc::new(MemorySession::new());
        let client = CommerceClient::new(&config, Arc::clone(&store) as _)
            .expect("failed to build commerce client");

        Self { store, client }
    }
}

/// Credentials of the disposable test account, from the environment.
#[must_use]
pub fn test_credentials() -> (Email, String) {
    let email = std::env::var("COMMERCE_TEST_EMAIL").expect("COMMERCE_TEST_EMAIL must be set");
    let password =
        std::env::var("COMMERCE_TEST_PASSWORD").expect("COMMERCE_TEST_PASSWORD must be set");
    (
        Email::parse(&email).expect("COMMERCE_TEST_EMAIL is not a valid address"),
        password,
    )
}
