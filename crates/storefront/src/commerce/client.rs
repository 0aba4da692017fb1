//! The commerce API client.
//!
//! One GraphQL endpoint, inline query documents, `serde`-typed responses.
//! Cart mutations all return the updated cart, so every method here hands
//! the session layer a fresh [`Cart`] snapshot.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;

use mercado_core::{Cart, CartId, CartItemId, CouponCode, Customer, Email};

use crate::config::StorefrontConfig;
use crate::session::SessionStore;

use super::types::{
    CartData, CartItemUpdateInput, ConfigurableCartItemInput, CustomerData, CustomerInput,
    CustomerUpdateInput, SimpleCartItemInput,
};
use super::{CommerceApi, CommerceError, GraphQLError};

// ─────────────────────────────────────────────────────────────────────────────
// GraphQL Plumbing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorData>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorData {
    message: String,
    extensions: Option<GraphQLErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorExtensions {
    category: Option<String>,
}

impl<T> GraphQLResponse<T> {
    fn into_result(self) -> Result<T, CommerceError> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            return Err(CommerceError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        category: e.extensions.and_then(|ext| ext.category),
                    })
                    .collect(),
            ));
        }

        self.data
            .ok_or_else(|| CommerceError::UnexpectedResponse("no data in response".to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CommerceClient
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the commerce GraphQL API.
///
/// Cheaply cloneable; both session composables hold a clone backed by the
/// same connection pool and session store.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    endpoint: String,
    store_code: Option<String>,
    integration_token: Option<SecretString>,
    session: Arc<dyn SessionStore>,
}

impl CommerceClient {
    /// Create a new client.
    ///
    /// The session store is consulted on every request for the customer
    /// token, so a login performed through one composable authenticates the
    /// other's calls immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &StorefrontConfig,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, CommerceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                client,
                endpoint: config.graphql_url.to_string(),
                store_code: config.store_code.clone(),
                integration_token: config.integration_token.clone(),
                session,
            }),
        })
    }

    /// Execute a GraphQL document against the endpoint.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<T, CommerceError> {
        let mut request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("Content-Type", "application/json");

        // Customer token wins over the server-side integration token.
        if let Some(token) = self.inner.session.customer_token() {
            request = request.bearer_auth(token);
        } else if let Some(token) = &self.inner.integration_token {
            request = request.bearer_auth(token.expose_secret());
        }

        if let Some(store_code) = &self.inner.store_code {
            request = request.header("Store", store_code);
        }

        let response = request
            .json(&GraphQLRequest { query, variables })
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CommerceError::RateLimited(retry_after));
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "commerce API returned non-success status"
            );
            return Err(CommerceError::GraphQL(vec![GraphQLError {
                message: format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
                category: None,
            }]));
        }

        let parsed: GraphQLResponse<T> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "failed to parse commerce GraphQL response"
            );
            CommerceError::Parse(e)
        })?;

        parsed.into_result()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CommerceApi Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl CommerceApi for CommerceClient {
    #[instrument(skip(self))]
    async fn create_empty_cart(&self) -> Result<CartId, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "createEmptyCart")]
            create_empty_cart: String,
        }

        const QUERY: &str = r"
            mutation createEmptyCart {
                createEmptyCart
            }
        ";

        let response: Response = self.execute(QUERY, None).await?;
        Ok(CartId::new(response.create_empty_cart))
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn cart(&self, cart_id: &CartId) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            cart: Option<CartData>,
        }

        const QUERY: &str = r"
            query cart($cartId: String!) {
                cart(cart_id: $cartId) {
                    id
                    items {
                        id
                        quantity
                        product {
                            id
                            sku
                            name
                            type_id
                        }
                        prices {
                            row_total {
                                value
                                currency
                            }
                        }
                    }
                    applied_coupons {
                        code
                    }
                    prices {
                        grand_total {
                            value
                            currency
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "cartId": cart_id });
        let response: Response = self.execute(QUERY, Some(variables)).await?;

        response
            .cart
            .ok_or_else(|| CommerceError::NotFound(format!("cart {cart_id}")))
            .and_then(Cart::try_from)
    }

    #[instrument(skip(self))]
    async fn customer_cart(&self) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "customerCart")]
            customer_cart: CartData,
        }

        const QUERY: &str = r"
            query customerCart {
                customerCart {
                    id
                    items {
                        id
                        quantity
                        product {
                            id
                            sku
                            name
                            type_id
                        }
                        prices {
                            row_total {
                                value
                                currency
                            }
                        }
                    }
                    applied_coupons {
                        code
                    }
                    prices {
                        grand_total {
                            value
                            currency
                        }
                    }
                }
            }
        ";

        let response: Response = self.execute(QUERY, None).await?;
        Cart::try_from(response.customer_cart)
    }

    #[instrument(skip(self), fields(source = %source, destination = %destination))]
    async fn merge_carts(
        &self,
        source: &CartId,
        destination: &CartId,
    ) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "mergeCarts")]
            merge_carts: CartData,
        }

        const QUERY: &str = r"
            mutation mergeCarts($sourceCartId: String!, $destinationCartId: String!) {
                mergeCarts(
                    source_cart_id: $sourceCartId
                    destination_cart_id: $destinationCartId
                ) {
                    id
                    items {
                        id
                        quantity
                        product {
                            id
                            sku
                            name
                            type_id
                        }
                        prices {
                            row_total {
                                value
                                currency
                            }
                        }
                    }
                    applied_coupons {
                        code
                    }
                    prices {
                        grand_total {
                            value
                            currency
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({
            "sourceCartId": source,
            "destinationCartId": destination,
        });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Cart::try_from(response.merge_carts)
    }

    #[instrument(skip(self, items), fields(cart_id = %cart_id))]
    async fn add_simple_products(
        &self,
        cart_id: &CartId,
        items: Vec<SimpleCartItemInput>,
    ) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "addSimpleProductsToCart")]
            add_simple_products_to_cart: CartEnvelope,
        }

        const QUERY: &str = r"
            mutation addSimpleProductsToCart(
                $cartId: String!
                $cartItems: [SimpleProductCartItemInput!]!
            ) {
                addSimpleProductsToCart(input: { cart_id: $cartId, cart_items: $cartItems }) {
                    cart {
                        id
                        items {
                            id
                            quantity
                            product {
                                id
                                sku
                                name
                                type_id
                            }
                            prices {
                                row_total {
                                    value
                                    currency
                                }
                            }
                        }
                        applied_coupons {
                            code
                        }
                        prices {
                            grand_total {
                                value
                                currency
                            }
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "cartId": cart_id, "cartItems": items });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Cart::try_from(response.add_simple_products_to_cart.cart)
    }

    #[instrument(skip(self, items), fields(cart_id = %cart_id))]
    async fn add_configurable_products(
        &self,
        cart_id: &CartId,
        items: Vec<ConfigurableCartItemInput>,
    ) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "addConfigurableProductsToCart")]
            add_configurable_products_to_cart: CartEnvelope,
        }

        const QUERY: &str = r"
            mutation addConfigurableProductsToCart(
                $cartId: String!
                $cartItems: [ConfigurableProductCartItemInput!]!
            ) {
                addConfigurableProductsToCart(
                    input: { cart_id: $cartId, cart_items: $cartItems }
                ) {
                    cart {
                        id
                        items {
                            id
                            quantity
                            product {
                                id
                                sku
                                name
                                type_id
                            }
                            prices {
                                row_total {
                                    value
                                    currency
                                }
                            }
                        }
                        applied_coupons {
                            code
                        }
                        prices {
                            grand_total {
                                value
                                currency
                            }
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "cartId": cart_id, "cartItems": items });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Cart::try_from(response.add_configurable_products_to_cart.cart)
    }

    #[instrument(skip(self), fields(cart_id = %cart_id, item_id = %item_id))]
    async fn remove_item_from_cart(
        &self,
        cart_id: &CartId,
        item_id: CartItemId,
    ) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "removeItemFromCart")]
            remove_item_from_cart: CartEnvelope,
        }

        const QUERY: &str = r"
            mutation removeItemFromCart($cartId: String!, $cartItemId: Int!) {
                removeItemFromCart(input: { cart_id: $cartId, cart_item_id: $cartItemId }) {
                    cart {
                        id
                        items {
                            id
                            quantity
                            product {
                                id
                                sku
                                name
                                type_id
                            }
                            prices {
                                row_total {
                                    value
                                    currency
                                }
                            }
                        }
                        applied_coupons {
                            code
                        }
                        prices {
                            grand_total {
                                value
                                currency
                            }
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "cartId": cart_id, "cartItemId": item_id });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Cart::try_from(response.remove_item_from_cart.cart)
    }

    #[instrument(skip(self, updates), fields(cart_id = %cart_id))]
    async fn update_cart_items(
        &self,
        cart_id: &CartId,
        updates: Vec<CartItemUpdateInput>,
    ) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "updateCartItems")]
            update_cart_items: CartEnvelope,
        }

        const QUERY: &str = r"
            mutation updateCartItems($cartId: String!, $cartItems: [CartItemUpdateInput!]!) {
                updateCartItems(input: { cart_id: $cartId, cart_items: $cartItems }) {
                    cart {
                        id
                        items {
                            id
                            quantity
                            product {
                                id
                                sku
                                name
                                type_id
                            }
                            prices {
                                row_total {
                                    value
                                    currency
                                }
                            }
                        }
                        applied_coupons {
                            code
                        }
                        prices {
                            grand_total {
                                value
                                currency
                            }
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "cartId": cart_id, "cartItems": updates });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Cart::try_from(response.update_cart_items.cart)
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn apply_coupon(
        &self,
        cart_id: &CartId,
        code: &CouponCode,
    ) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "applyCouponToCart")]
            apply_coupon_to_cart: CartEnvelope,
        }

        const QUERY: &str = r"
            mutation applyCouponToCart($cartId: String!, $couponCode: String!) {
                applyCouponToCart(input: { cart_id: $cartId, coupon_code: $couponCode }) {
                    cart {
                        id
                        items {
                            id
                            quantity
                            product {
                                id
                                sku
                                name
                                type_id
                            }
                            prices {
                                row_total {
                                    value
                                    currency
                                }
                            }
                        }
                        applied_coupons {
                            code
                        }
                        prices {
                            grand_total {
                                value
                                currency
                            }
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "cartId": cart_id, "couponCode": code });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Cart::try_from(response.apply_coupon_to_cart.cart)
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn remove_coupon(&self, cart_id: &CartId) -> Result<Cart, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "removeCouponFromCart")]
            remove_coupon_from_cart: CartEnvelope,
        }

        const QUERY: &str = r"
            mutation removeCouponFromCart($cartId: String!) {
                removeCouponFromCart(input: { cart_id: $cartId }) {
                    cart {
                        id
                        items {
                            id
                            quantity
                            product {
                                id
                                sku
                                name
                                type_id
                            }
                            prices {
                                row_total {
                                    value
                                    currency
                                }
                            }
                        }
                        applied_coupons {
                            code
                        }
                        prices {
                            grand_total {
                                value
                                currency
                            }
                        }
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "cartId": cart_id });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Cart::try_from(response.remove_coupon_from_cart.cart)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn generate_customer_token(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<String, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "generateCustomerToken")]
            generate_customer_token: TokenData,
        }

        #[derive(Deserialize)]
        struct TokenData {
            token: String,
        }

        const QUERY: &str = r"
            mutation generateCustomerToken($email: String!, $password: String!) {
                generateCustomerToken(email: $email, password: $password) {
                    token
                }
            }
        ";

        let variables = serde_json::json!({ "email": email, "password": password });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Ok(response.generate_customer_token.token)
    }

    #[instrument(skip(self))]
    async fn revoke_customer_token(&self) -> Result<(), CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "revokeCustomerToken")]
            revoke_customer_token: RevokeData,
        }

        #[derive(Deserialize)]
        struct RevokeData {
            result: bool,
        }

        const QUERY: &str = r"
            mutation revokeCustomerToken {
                revokeCustomerToken {
                    result
                }
            }
        ";

        let response: Response = self.execute(QUERY, None).await?;
        if response.revoke_customer_token.result {
            Ok(())
        } else {
            Err(CommerceError::UnexpectedResponse(
                "backend declined to revoke the token".to_string(),
            ))
        }
    }

    #[instrument(skip(self, input))]
    async fn create_customer(&self, input: CustomerInput) -> Result<Customer, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "createCustomerV2")]
            create_customer: CustomerEnvelope,
        }

        const QUERY: &str = r"
            mutation createCustomerV2($input: CustomerCreateInput!) {
                createCustomerV2(input: $input) {
                    customer {
                        id
                        email
                        firstname
                        lastname
                        is_subscribed
                        created_at
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "input": input });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Ok(Customer::from(response.create_customer.customer))
    }

    #[instrument(skip(self))]
    async fn customer(&self) -> Result<Customer, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            customer: CustomerData,
        }

        const QUERY: &str = r"
            query customer {
                customer {
                    id
                    email
                    firstname
                    lastname
                    is_subscribed
                    created_at
                }
            }
        ";

        let response: Response = self.execute(QUERY, None).await?;
        Ok(Customer::from(response.customer))
    }

    #[instrument(skip(self, input))]
    async fn update_customer(
        &self,
        input: CustomerUpdateInput,
    ) -> Result<Customer, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "updateCustomerV2")]
            update_customer: CustomerEnvelope,
        }

        const QUERY: &str = r"
            mutation updateCustomerV2($input: CustomerUpdateInput!) {
                updateCustomerV2(input: $input) {
                    customer {
                        id
                        email
                        firstname
                        lastname
                        is_subscribed
                        created_at
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "input": input });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Ok(Customer::from(response.update_customer.customer))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn update_customer_email(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(), CommerceError> {
        const QUERY: &str = r"
            mutation updateCustomerEmail($email: String!, $password: String!) {
                updateCustomerEmail(email: $email, password: $password) {
                    customer {
                        email
                    }
                }
            }
        ";

        let variables = serde_json::json!({ "email": email, "password": password });
        let _: serde_json::Value = self.execute(QUERY, Some(variables)).await?;
        Ok(())
    }

    #[instrument(skip(self, current_password, new_password))]
    async fn change_customer_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Customer, CommerceError> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "changeCustomerPassword")]
            change_customer_password: CustomerData,
        }

        const QUERY: &str = r"
            mutation changeCustomerPassword($currentPassword: String!, $newPassword: String!) {
                changeCustomerPassword(
                    currentPassword: $currentPassword
                    newPassword: $newPassword
                ) {
                    id
                    email
                    firstname
                    lastname
                    is_subscribed
                    created_at
                }
            }
        ";

        let variables = serde_json::json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        });
        let response: Response = self.execute(QUERY, Some(variables)).await?;
        Ok(Customer::from(response.change_customer_password))
    }
}

/// The `{ cart { ... } }` envelope every cart mutation replies with.
#[derive(Deserialize)]
struct CartEnvelope {
    cart: CartData,
}

/// The `{ customer { ... } }` envelope the customer mutations reply with.
#[derive(Deserialize)]
struct CustomerEnvelope {
    customer: CustomerData,
}
