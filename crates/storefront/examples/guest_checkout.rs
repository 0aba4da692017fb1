//! Walks the guest cart flow against a real backend.
//!
//! ```bash
//! COMMERCE_GRAPHQL_URL=https://backend.example/graphql \
//! DEMO_SKU=WSH-09 \
//!     cargo run -p mercado-storefront --example guest_checkout
//! ```
//!
//! Optionally set `COMMERCE_TEST_EMAIL` / `COMMERCE_TEST_PASSWORD` to also
//! demonstrate the merge-on-login flow.

use std::sync::Arc;

use tracing::info;

use mercado_core::{Email, ProductId, Sku};
use mercado_storefront::cart::CartSession;
use mercado_storefront::commerce::CommerceClient;
use mercado_storefront::config::StorefrontConfig;
use mercado_storefront::session::{MemorySession, SessionStore};
use mercado_storefront::user::UserSession;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mercado_storefront=debug".into()),
        )
        .init();

    let config = StorefrontConfig::from_env()?;
    let store: Arc<MemorySession> = Arc::new(MemorySession::new());
    let client = CommerceClient::new(&config, store.clone() as Arc<dyn SessionStore>)?;

    let mut cart = CartSession::new(client.clone(), store.clone() as Arc<dyn SessionStore>);
    cart.load().await;
    if let Some(error) = &cart.errors().load {
        return Err(format!("cart load failed: {error}").into());
    }
    info!(cart_id = ?store.cart_id(), "guest cart ready");

    if let Ok(sku) = std::env::var("DEMO_SKU") {
        let product = mercado_core::Product::simple(ProductId::new(0), Sku::new(&sku), &sku);
        cart.add_item(&product, 1).await;
        match &cart.errors().add_item {
            None => info!(
                %sku,
                quantity = cart.cart().map_or(0, |c| c.total_quantity()),
                "added to cart"
            ),
            Some(error) => info!(%sku, %error, "add to cart failed"),
        }
    }

    let credentials = std::env::var("COMMERCE_TEST_EMAIL")
        .ok()
        .zip(std::env::var("COMMERCE_TEST_PASSWORD").ok());
    if let Some((email, password)) = credentials {
        let email = Email::parse(&email)?;
        let mut user = UserSession::new(client.clone(), store.clone() as Arc<dyn SessionStore>);

        user.login(&email, &password).await;
        match &user.errors().login {
            None => {
                info!(
                    name = %user.user().map(|u| u.full_name()).unwrap_or_default(),
                    cart_id = ?store.cart_id(),
                    "logged in, guest cart merged"
                );
                user.logout().await;
            }
            Some(error) => info!(%error, "login failed"),
        }
    }

    Ok(())
}
