//! Account flows against a live backend.
//!
//! These tests need a disposable test account (`COMMERCE_TEST_EMAIL`,
//! `COMMERCE_TEST_PASSWORD`) on the backend named by
//! `COMMERCE_GRAPHQL_URL`. They log in and out with it; they do not change
//! its email or password.
//!
//! Run with: cargo test -p mercado-integration-tests -- --ignored

#![allow(clippy::expect_used, clippy::unwrap_used)]

use mercado_core::Email;
use mercado_integration_tests::{LiveBackend, test_credentials};
use mercado_storefront::cart::CartSession;
use mercado_storefront::session::SessionStore;
use mercado_storefront::user::UserSession;

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running commerce backend and a test account"]
async fn test_login_and_logout_roundtrip() {
    let backend = LiveBackend::connect();
    let mut user = UserSession::new(backend.client.clone(), backend.store.clone() as _);
    let (email, password) = test_credentials();

    user.login(&email, &password).await;

    assert!(user.errors().login.is_none(), "login failed: {:?}", user.errors().login);
    assert!(user.is_authenticated());
    assert!(backend.store.customer_token().is_some());
    assert_eq!(user.user().and_then(|u| u.email.as_ref()), Some(&email));

    user.logout().await;

    assert!(user.errors().logout.is_none());
    assert!(!user.is_authenticated());
    assert!(backend.store.customer_token().is_none());
    assert!(backend.store.cart_id().is_none());
    assert!(user.user().is_none());
}

#[tokio::test]
#[ignore = "Requires a running commerce backend and a test account"]
async fn test_wrong_password_records_login_error() {
    let backend = LiveBackend::connect();
    let mut user = UserSession::new(backend.client.clone(), backend.store.clone() as _);
    let (email, _) = test_credentials();

    user.login(&email, "definitely-wrong-password").await;

    assert!(user.errors().login.is_some());
    assert!(!user.is_authenticated());
}

#[tokio::test]
#[ignore = "Requires a running commerce backend and a test account"]
async fn test_load_restores_profile_from_token() {
    let backend = LiveBackend::connect();
    let (email, password) = test_credentials();

    {
        let mut user = UserSession::new(backend.client.clone(), backend.store.clone() as _);
        user.login(&email, &password).await;
        assert!(user.errors().login.is_none());
    }

    // A fresh composable over the same session store picks the profile up
    // from the persisted token alone.
    let mut restored = UserSession::new(backend.client.clone(), backend.store.clone() as _);
    restored.load().await;

    assert!(restored.errors().load.is_none());
    assert_eq!(restored.user().and_then(|u| u.email.as_ref()), Some(&email));

    restored.logout().await;
}

// ============================================================================
// Cart Merge On Login
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running commerce backend and a test account"]
async fn test_guest_cart_id_is_replaced_on_login() {
    let backend = LiveBackend::connect();
    let (email, password) = test_credentials();

    // Build a guest cart first.
    let mut cart = CartSession::new(backend.client.clone(), backend.store.clone() as _);
    cart.load().await;
    let guest_id = backend.store.cart_id().expect("guest cart id");

    let mut user = UserSession::new(backend.client.clone(), backend.store.clone() as _);
    user.login(&email, &password).await;
    assert!(user.errors().login.is_none());

    // The session now points at the customer-owned (possibly merged) cart,
    // and the cart composable resolves it as authenticated.
    let active_id = backend.store.cart_id().expect("active cart id after login");
    assert_ne!(active_id, guest_id);

    cart.load().await;
    assert!(cart.errors().load.is_none());
    assert_eq!(cart.cart().map(|c| &c.id), Some(&active_id));

    user.logout().await;
}

// ============================================================================
// Stale Token
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running commerce backend (COMMERCE_GRAPHQL_URL)"]
async fn test_stale_token_is_cleared_on_load() {
    let backend = LiveBackend::connect();
    backend
        .store
        .set_customer_token(Some("not-a-real-token".to_string()));
    let mut user = UserSession::new(backend.client.clone(), backend.store.clone() as _);

    user.load().await;

    assert!(user.errors().load.is_some());
    assert!(!user.is_authenticated());
    assert!(backend.store.customer_token().is_none());
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn test_credentials_parse_as_email() {
    // Exercised without the backend: only checks the env contract when set.
    if std::env::var("COMMERCE_TEST_EMAIL").is_ok()
        && std::env::var("COMMERCE_TEST_PASSWORD").is_ok()
    {
        let (email, _) = test_credentials();
        assert!(Email::parse(email.as_str()).is_ok());
    }
}
