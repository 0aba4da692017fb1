//! The cart composable.
//!
//! [`CartSession`] owns the in-memory cart snapshot and sequences the remote
//! calls that keep it in sync with the backend. Operations never return
//! errors; each failure is caught at the operation boundary, logged, and
//! stored in the per-operation slot on [`CartErrors`] so the caller can
//! render it.
//!
//! Cart identity lives in the [`SessionStore`]: a guest cart is addressed by
//! the stored cart id, an authenticated cart is resolved server-side from
//! the customer token. `load` handles both, with a bounded fallback chain
//! for stale tokens and stale guest ids.

use std::sync::Arc;

use tracing::warn;

use mercado_core::{Cart, CartId, CouponCode, Product, ProductId, ProductKind};

use crate::commerce::{
    CartItemUpdateInput, CommerceApi, CommerceError, ConfigurableCartItemInput,
    SimpleCartItemInput,
};
use crate::session::SessionStore;

/// Last error per cart operation, `None` when the most recent run succeeded.
///
/// Each operation resets its own slot on entry, so a slot always reflects
/// the latest attempt.
#[derive(Debug, Default)]
pub struct CartErrors {
    pub load: Option<CommerceError>,
    pub add_item: Option<CommerceError>,
    pub remove_item: Option<CommerceError>,
    pub update_item_qty: Option<CommerceError>,
    pub clear: Option<CommerceError>,
    pub apply_coupon: Option<CommerceError>,
    pub remove_coupon: Option<CommerceError>,
}

/// Cart state plus the operations that mutate it.
///
/// Operations take `&mut self` and await sequentially; there is no internal
/// locking and no reentrancy. Share the API client and session store, not
/// the session itself.
pub struct CartSession<A: CommerceApi> {
    api: A,
    session: Arc<dyn SessionStore>,
    cart: Option<Cart>,
    errors: CartErrors,
    loading: bool,
}

impl<A: CommerceApi> CartSession<A> {
    /// Create a cart session over the given API client and session store.
    pub fn new(api: A, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session,
            cart: None,
            errors: CartErrors::default(),
            loading: false,
        }
    }

    /// The current in-memory cart, if one has been loaded.
    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Per-operation error slots.
    pub const fn errors(&self) -> &CartErrors {
        &self.errors
    }

    /// Whether an operation is currently in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the in-memory cart has a line for the given product.
    pub fn is_on_cart(&self, product_id: ProductId) -> bool {
        self.cart
            .as_ref()
            .is_some_and(|cart| cart.contains(product_id))
    }

    /// Load the cart for the current session.
    ///
    /// Authenticated path: fetch the customer cart; if the backend rejects
    /// it the token is assumed stale, the session is demoted to guest and
    /// the guest path runs. Guest path: fetch the stored cart id; if that
    /// fails the id is discarded and one fresh cart is created. The chain
    /// is bounded; it never retries a leg that already failed.
    pub async fn load(&mut self) {
        self.errors.load = None;
        self.loading = true;

        match self.resolve().await {
            Ok(cart) => {
                self.session.set_cart_id(Some(cart.id.clone()));
                self.cart = Some(cart);
            }
            Err(error) => {
                warn!(%error, "cart load failed");
                self.errors.load = Some(error);
            }
        }

        self.loading = false;
    }

    /// Add a product to the cart, creating a cart first when the session
    /// has none. Only simple and configurable products can be added; other
    /// kinds record an [`CommerceError::UnsupportedProduct`] error.
    pub async fn add_item(&mut self, product: &Product, quantity: u32) {
        self.errors.add_item = None;
        self.loading = true;

        match self.add_item_inner(product, quantity).await {
            Ok(cart) => self.cart = Some(cart),
            Err(error) => {
                warn!(%error, sku = %product.sku, "add to cart failed");
                self.errors.add_item = Some(error);
            }
        }

        self.loading = false;
    }

    /// Remove the line item referencing the given product. A product with
    /// no line in the in-memory cart is a no-op; nothing is sent.
    pub async fn remove_item(&mut self, product_id: ProductId) {
        self.errors.remove_item = None;
        self.loading = true;

        let target = self
            .cart
            .as_ref()
            .and_then(|cart| cart.find_item(product_id))
            .map(|item| item.id);

        if let (Some(item_id), Some(cart_id)) = (target, self.session.cart_id()) {
            match self.api.remove_item_from_cart(&cart_id, item_id).await {
                Ok(cart) => self.cart = Some(cart),
                Err(error) => {
                    warn!(%error, %item_id, "remove from cart failed");
                    self.errors.remove_item = Some(error);
                }
            }
        }

        self.loading = false;
    }

    /// Set the quantity of the line item referencing the given product.
    /// A product with no line in the in-memory cart is a no-op.
    pub async fn update_item_qty(&mut self, product_id: ProductId, quantity: u32) {
        self.errors.update_item_qty = None;
        self.loading = true;

        let target = self
            .cart
            .as_ref()
            .and_then(|cart| cart.find_item(product_id))
            .map(|item| item.id);

        if let (Some(item_id), Some(cart_id)) = (target, self.session.cart_id()) {
            let updates = vec![CartItemUpdateInput {
                cart_item_id: item_id,
                quantity,
            }];
            match self.api.update_cart_items(&cart_id, updates).await {
                Ok(cart) => self.cart = Some(cart),
                Err(error) => {
                    warn!(%error, %item_id, quantity, "cart quantity update failed");
                    self.errors.update_item_qty = Some(error);
                }
            }
        }

        self.loading = false;
    }

    /// Abandon the current cart and start a fresh one.
    pub async fn clear(&mut self) {
        self.errors.clear = None;
        self.loading = true;

        self.cart = None;
        self.session.set_cart_id(None);

        match self.resolve().await {
            Ok(cart) => {
                self.session.set_cart_id(Some(cart.id.clone()));
                self.cart = Some(cart);
            }
            Err(error) => {
                warn!(%error, "cart clear failed");
                self.errors.clear = Some(error);
            }
        }

        self.loading = false;
    }

    /// Apply a coupon code to the cart.
    pub async fn apply_coupon(&mut self, code: &CouponCode) {
        self.errors.apply_coupon = None;
        self.loading = true;

        let outcome = match self.ensure_cart_id().await {
            Ok(cart_id) => self.api.apply_coupon(&cart_id, code).await,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(cart) => self.cart = Some(cart),
            Err(error) => {
                warn!(%error, code = %code, "coupon apply failed");
                self.errors.apply_coupon = Some(error);
            }
        }

        self.loading = false;
    }

    /// Remove the coupon currently applied to the cart.
    pub async fn remove_coupon(&mut self) {
        self.errors.remove_coupon = None;
        self.loading = true;

        let outcome = match self.ensure_cart_id().await {
            Ok(cart_id) => self.api.remove_coupon(&cart_id).await,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(cart) => self.cart = Some(cart),
            Err(error) => {
                warn!(%error, "coupon remove failed");
                self.errors.remove_coupon = Some(error);
            }
        }

        self.loading = false;
    }

    async fn add_item_inner(
        &mut self,
        product: &Product,
        quantity: u32,
    ) -> Result<Cart, CommerceError> {
        let cart_id = self.ensure_cart_id().await?;

        match &product.kind {
            ProductKind::Simple => {
                let items = vec![SimpleCartItemInput::new(product.sku.clone(), quantity)];
                self.api.add_simple_products(&cart_id, items).await
            }
            ProductKind::Configurable { variant_sku } => {
                let items = vec![ConfigurableCartItemInput::new(
                    product.sku.clone(),
                    variant_sku.clone(),
                    quantity,
                )];
                self.api.add_configurable_products(&cart_id, items).await
            }
            other => Err(CommerceError::UnsupportedProduct(
                other.type_id().to_string(),
            )),
        }
    }

    /// The cart id for the session, resolving a cart first when none is
    /// stored yet.
    async fn ensure_cart_id(&mut self) -> Result<CartId, CommerceError> {
        if let Some(cart_id) = self.session.cart_id() {
            return Ok(cart_id);
        }

        let cart = self.resolve().await?;
        let cart_id = cart.id.clone();
        self.session.set_cart_id(Some(cart_id.clone()));
        self.cart = Some(cart);
        Ok(cart_id)
    }

    /// The bounded identity-resolution chain behind `load` and `clear`.
    async fn resolve(&mut self) -> Result<Cart, CommerceError> {
        if self.session.customer_token().is_some() {
            match self.api.customer_cart().await {
                Ok(cart) => return Ok(cart),
                Err(error) => {
                    warn!(%error, "customer cart fetch failed, demoting session to guest");
                    self.session.set_customer_token(None);
                    self.session.set_cart_id(None);
                }
            }
        }

        self.resolve_guest().await
    }

    async fn resolve_guest(&mut self) -> Result<Cart, CommerceError> {
        if let Some(cart_id) = self.session.cart_id() {
            match self.api.cart(&cart_id).await {
                Ok(cart) => return Ok(cart),
                Err(error) => {
                    warn!(%error, %cart_id, "stored guest cart unusable, creating a fresh one");
                    self.session.set_cart_id(None);
                }
            }
        }

        let cart_id = self.api.create_empty_cart().await?;
        self.session.set_cart_id(Some(cart_id.clone()));
        self.api.cart(&cart_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use mercado_core::{CartItem, CartItemId, Coupon, Customer, Email, Sku};

    use super::*;
    use crate::commerce::{CustomerInput, CustomerUpdateInput};
    use crate::session::MemorySession;

    fn scripted_error() -> CommerceError {
        CommerceError::NotFound("scripted failure".to_string())
    }

    fn cart_with_items(id: &str, items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::new(id),
            items,
            applied_coupon: None,
            grand_total: None,
        }
    }

    fn line(item_id: i64, product_id: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(item_id),
            product_id: ProductId::new(product_id),
            sku: Sku::new(format!("SKU-{product_id}")),
            name: format!("Product {product_id}"),
            kind: ProductKind::Simple,
            quantity,
            row_total: None,
        }
    }

    /// Scripted [`CommerceApi`] for branch coverage. Each queue holds the
    /// results for successive calls to that method; calling a method with
    /// an empty queue fails the test.
    #[derive(Default)]
    struct MockApi {
        calls: Mutex<Vec<&'static str>>,
        create_empty_cart: Mutex<VecDeque<Result<CartId, CommerceError>>>,
        cart: Mutex<VecDeque<Result<Cart, CommerceError>>>,
        customer_cart: Mutex<VecDeque<Result<Cart, CommerceError>>>,
        add_simple: Mutex<VecDeque<Result<Cart, CommerceError>>>,
        add_configurable: Mutex<VecDeque<Result<Cart, CommerceError>>>,
        remove_item: Mutex<VecDeque<Result<Cart, CommerceError>>>,
        update_items: Mutex<VecDeque<Result<Cart, CommerceError>>>,
        apply_coupon: Mutex<VecDeque<Result<Cart, CommerceError>>>,
        remove_coupon: Mutex<VecDeque<Result<Cart, CommerceError>>>,
    }

    impl MockApi {
        fn record(&self, method: &'static str) {
            self.calls.lock().unwrap().push(method);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn pop<T>(queue: &Mutex<VecDeque<Result<T, CommerceError>>>, method: &str) -> Result<T, CommerceError> {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted call to {method}"))
        }
    }

    impl CommerceApi for MockApi {
        async fn create_empty_cart(&self) -> Result<CartId, CommerceError> {
            self.record("create_empty_cart");
            Self::pop(&self.create_empty_cart, "create_empty_cart")
        }

        async fn cart(&self, _cart_id: &CartId) -> Result<Cart, CommerceError> {
            self.record("cart");
            Self::pop(&self.cart, "cart")
        }

        async fn customer_cart(&self) -> Result<Cart, CommerceError> {
            self.record("customer_cart");
            Self::pop(&self.customer_cart, "customer_cart")
        }

        async fn merge_carts(
            &self,
            _source: &CartId,
            _destination: &CartId,
        ) -> Result<Cart, CommerceError> {
            unimplemented!("not used by cart session tests")
        }

        async fn add_simple_products(
            &self,
            _cart_id: &CartId,
            _items: Vec<SimpleCartItemInput>,
        ) -> Result<Cart, CommerceError> {
            self.record("add_simple_products");
            Self::pop(&self.add_simple, "add_simple_products")
        }

        async fn add_configurable_products(
            &self,
            _cart_id: &CartId,
            _items: Vec<ConfigurableCartItemInput>,
        ) -> Result<Cart, CommerceError> {
            self.record("add_configurable_products");
            Self::pop(&self.add_configurable, "add_configurable_products")
        }

        async fn remove_item_from_cart(
            &self,
            _cart_id: &CartId,
            _item_id: CartItemId,
        ) -> Result<Cart, CommerceError> {
            self.record("remove_item_from_cart");
            Self::pop(&self.remove_item, "remove_item_from_cart")
        }

        async fn update_cart_items(
            &self,
            _cart_id: &CartId,
            _updates: Vec<CartItemUpdateInput>,
        ) -> Result<Cart, CommerceError> {
            self.record("update_cart_items");
            Self::pop(&self.update_items, "update_cart_items")
        }

        async fn apply_coupon(
            &self,
            _cart_id: &CartId,
            _code: &CouponCode,
        ) -> Result<Cart, CommerceError> {
            self.record("apply_coupon");
            Self::pop(&self.apply_coupon, "apply_coupon")
        }

        async fn remove_coupon(&self, _cart_id: &CartId) -> Result<Cart, CommerceError> {
            self.record("remove_coupon");
            Self::pop(&self.remove_coupon, "remove_coupon")
        }

        async fn generate_customer_token(
            &self,
            _email: &Email,
            _password: &str,
        ) -> Result<String, CommerceError> {
            unimplemented!("not used by cart session tests")
        }

        async fn revoke_customer_token(&self) -> Result<(), CommerceError> {
            unimplemented!("not used by cart session tests")
        }

        async fn create_customer(
            &self,
            _input: CustomerInput,
        ) -> Result<Customer, CommerceError> {
            unimplemented!("not used by cart session tests")
        }

        async fn customer(&self) -> Result<Customer, CommerceError> {
            unimplemented!("not used by cart session tests")
        }

        async fn update_customer(
            &self,
            _input: CustomerUpdateInput,
        ) -> Result<Customer, CommerceError> {
            unimplemented!("not used by cart session tests")
        }

        async fn update_customer_email(
            &self,
            _email: &Email,
            _password: &str,
        ) -> Result<(), CommerceError> {
            unimplemented!("not used by cart session tests")
        }

        async fn change_customer_password(
            &self,
            _current_password: &str,
            _new_password: &str,
        ) -> Result<Customer, CommerceError> {
            unimplemented!("not used by cart session tests")
        }
    }

    fn session_pair(api: MockApi) -> (Arc<MockApi>, Arc<MemorySession>, CartSession<Arc<MockApi>>) {
        let api = Arc::new(api);
        let store = Arc::new(MemorySession::new());
        let session = CartSession::new(
            Arc::clone(&api),
            Arc::clone(&store) as Arc<dyn SessionStore>,
        );
        (api, store, session)
    }

    #[tokio::test]
    async fn test_guest_load_creates_cart_when_none_stored() {
        let mock = MockApi::default();
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Ok(CartId::new("fresh")));
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("fresh", vec![])));
        let (api, store, mut cart) = session_pair(mock);

        cart.load().await;

        assert!(cart.errors().load.is_none());
        assert!(!cart.is_loading());
        assert_eq!(cart.cart().map(|c| c.id.as_str()), Some("fresh"));
        assert_eq!(store.cart_id(), Some(CartId::new("fresh")));
        assert_eq!(api.calls(), vec!["create_empty_cart", "cart"]);
    }

    #[tokio::test]
    async fn test_guest_load_reuses_stored_cart_id() {
        let mock = MockApi::default();
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("stored", vec![line(1, 10, 2)])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("stored")));

        cart.load().await;

        assert_eq!(cart.cart().map(|c| c.total_quantity()), Some(2));
        assert_eq!(api.calls(), vec!["cart"]);
    }

    #[tokio::test]
    async fn test_guest_load_recovers_from_stale_cart_id() {
        let mock = MockApi::default();
        mock.cart.lock().unwrap().push_back(Err(scripted_error()));
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Ok(CartId::new("replacement")));
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("replacement", vec![])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("stale")));

        cart.load().await;

        assert!(cart.errors().load.is_none());
        assert_eq!(store.cart_id(), Some(CartId::new("replacement")));
        assert_eq!(api.calls(), vec!["cart", "create_empty_cart", "cart"]);
    }

    #[tokio::test]
    async fn test_authenticated_load_uses_customer_cart() {
        let mock = MockApi::default();
        mock.customer_cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("customer-cart", vec![])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_customer_token(Some("token-1".to_string()));

        cart.load().await;

        assert_eq!(store.cart_id(), Some(CartId::new("customer-cart")));
        assert_eq!(api.calls(), vec!["customer_cart"]);
    }

    #[tokio::test]
    async fn test_stale_token_demotes_session_to_guest() {
        let mock = MockApi::default();
        mock.customer_cart
            .lock()
            .unwrap()
            .push_back(Err(scripted_error()));
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Ok(CartId::new("guest-cart")));
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("guest-cart", vec![])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_customer_token(Some("expired".to_string()));
        store.set_cart_id(Some(CartId::new("old")));

        cart.load().await;

        assert!(store.customer_token().is_none());
        assert_eq!(store.cart_id(), Some(CartId::new("guest-cart")));
        assert_eq!(api.calls(), vec!["customer_cart", "create_empty_cart", "cart"]);
    }

    #[tokio::test]
    async fn test_load_failure_is_recorded_not_propagated() {
        let mock = MockApi::default();
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Err(scripted_error()));
        let (_api, _store, mut cart) = session_pair(mock);

        cart.load().await;

        assert!(cart.errors().load.is_some());
        assert!(cart.cart().is_none());
        assert!(!cart.is_loading());
    }

    #[tokio::test]
    async fn test_add_simple_item_resolves_cart_lazily() {
        let mock = MockApi::default();
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Ok(CartId::new("lazy")));
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("lazy", vec![])));
        mock.add_simple
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("lazy", vec![line(1, 10, 1)])));
        let (api, _store, mut cart) = session_pair(mock);

        let product = Product::simple(ProductId::new(10), Sku::new("SKU-10"), "Cafetera");
        cart.add_item(&product, 1).await;

        assert!(cart.errors().add_item.is_none());
        assert!(cart.is_on_cart(ProductId::new(10)));
        assert_eq!(
            api.calls(),
            vec!["create_empty_cart", "cart", "add_simple_products"]
        );
    }

    #[tokio::test]
    async fn test_add_configurable_item_dispatches_variant_mutation() {
        let mock = MockApi::default();
        mock.add_configurable
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("c1", vec![line(1, 20, 1)])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("c1")));

        let product = Product::configurable(
            ProductId::new(20),
            Sku::new("TEE"),
            Sku::new("TEE-M-AZUL"),
            "Camiseta",
        );
        cart.add_item(&product, 1).await;

        assert!(cart.errors().add_item.is_none());
        assert_eq!(api.calls(), vec!["add_configurable_products"]);
    }

    #[tokio::test]
    async fn test_add_unsupported_kind_records_error_without_calling() {
        let mock = MockApi::default();
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("c1")));

        let product = Product {
            id: ProductId::new(30),
            sku: Sku::new("BUNDLE-1"),
            name: "Paquete".to_string(),
            kind: ProductKind::Bundle,
            price: None,
        };
        cart.add_item(&product, 1).await;

        assert!(matches!(
            cart.errors().add_item,
            Some(CommerceError::UnsupportedProduct(_))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_item_resolves_line_by_product() {
        let mock = MockApi::default();
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("c1", vec![line(7, 10, 1)])));
        mock.remove_item
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("c1", vec![])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("c1")));
        cart.load().await;

        cart.remove_item(ProductId::new(10)).await;

        assert!(cart.errors().remove_item.is_none());
        assert!(!cart.is_on_cart(ProductId::new(10)));
        assert_eq!(api.calls(), vec!["cart", "remove_item_from_cart"]);
    }

    #[tokio::test]
    async fn test_remove_absent_item_is_silent_noop() {
        let mock = MockApi::default();
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("c1", vec![line(7, 10, 1)])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("c1")));
        cart.load().await;

        cart.remove_item(ProductId::new(99)).await;

        assert!(cart.errors().remove_item.is_none());
        assert_eq!(api.calls(), vec!["cart"]);
    }

    #[tokio::test]
    async fn test_update_item_qty_sends_line_update() {
        let mock = MockApi::default();
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("c1", vec![line(7, 10, 1)])));
        mock.update_items
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("c1", vec![line(7, 10, 5)])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("c1")));
        cart.load().await;

        cart.update_item_qty(ProductId::new(10), 5).await;

        assert_eq!(cart.cart().map(|c| c.total_quantity()), Some(5));
        assert_eq!(api.calls(), vec!["cart", "update_cart_items"]);
    }

    #[tokio::test]
    async fn test_update_qty_of_absent_item_is_silent_noop() {
        let mock = MockApi::default();
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("c1")));

        cart.update_item_qty(ProductId::new(42), 3).await;

        assert!(cart.errors().update_item_qty.is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_discards_cart_and_starts_fresh() {
        let mock = MockApi::default();
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("old", vec![line(1, 10, 2)])));
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Ok(CartId::new("fresh")));
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("fresh", vec![])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("old")));
        cart.load().await;

        cart.clear().await;

        assert!(cart.errors().clear.is_none());
        assert_eq!(store.cart_id(), Some(CartId::new("fresh")));
        assert_eq!(cart.cart().map(|c| c.total_quantity()), Some(0));
        assert_eq!(api.calls(), vec!["cart", "create_empty_cart", "cart"]);
    }

    #[tokio::test]
    async fn test_apply_and_remove_coupon() {
        let mock = MockApi::default();
        let mut discounted = cart_with_items("c1", vec![line(1, 10, 1)]);
        discounted.applied_coupon = Some(Coupon::new("VERANO20"));
        mock.apply_coupon.lock().unwrap().push_back(Ok(discounted));
        mock.remove_coupon
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("c1", vec![line(1, 10, 1)])));
        let (api, store, mut cart) = session_pair(mock);
        store.set_cart_id(Some(CartId::new("c1")));

        cart.apply_coupon(&CouponCode::new("VERANO20")).await;
        assert!(cart.errors().apply_coupon.is_none());
        assert!(
            cart.cart()
                .and_then(|c| c.applied_coupon.as_ref())
                .is_some()
        );

        cart.remove_coupon().await;
        assert!(cart.errors().remove_coupon.is_none());
        assert!(cart.cart().and_then(|c| c.applied_coupon.as_ref()).is_none());
        assert_eq!(api.calls(), vec!["apply_coupon", "remove_coupon"]);
    }

    #[tokio::test]
    async fn test_error_slot_resets_on_next_attempt() {
        let mock = MockApi::default();
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Err(scripted_error()));
        mock.create_empty_cart
            .lock()
            .unwrap()
            .push_back(Ok(CartId::new("second-try")));
        mock.cart
            .lock()
            .unwrap()
            .push_back(Ok(cart_with_items("second-try", vec![])));
        let (_api, _store, mut cart) = session_pair(mock);

        cart.load().await;
        assert!(cart.errors().load.is_some());

        cart.load().await;
        assert!(cart.errors().load.is_none());
        assert_eq!(cart.cart().map(|c| c.id.as_str()), Some("second-try"));
    }

    #[tokio::test]
    async fn test_is_on_cart_without_loaded_cart() {
        let mock = MockApi::default();
        let (_api, _store, cart) = session_pair(mock);
        assert!(!cart.is_on_cart(ProductId::new(1)));
    }
}
