//! Wire types for the commerce GraphQL schema.
//!
//! Inputs serialize to the exact variable shapes the schema expects;
//! response data deserializes into `*Data` structs here and is converted to
//! the domain types from `mercado-core`. The conversion is fallible because
//! the backend sends line-item ids as strings and money values as floats.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use mercado_core::{
    Cart, CartId, CartItem, CartItemId, Coupon, CurrencyCode, Customer, CustomerId, Email, Money,
    ProductId, ProductKind, Sku,
};

use super::CommerceError;

// =============================================================================
// Input Types
// =============================================================================

/// The `data` block common to both add-to-cart mutations.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemInput {
    /// Quantity to add.
    pub quantity: u32,
    /// SKU of the line being added (variant SKU for configurables).
    pub sku: Sku,
}

/// One entry of `addSimpleProductsToCart.cart_items`.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleCartItemInput {
    pub data: CartItemInput,
}

impl SimpleCartItemInput {
    /// Build the input for one simple product line.
    #[must_use]
    pub const fn new(sku: Sku, quantity: u32) -> Self {
        Self {
            data: CartItemInput { quantity, sku },
        }
    }
}

/// One entry of `addConfigurableProductsToCart.cart_items`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurableCartItemInput {
    pub parent_sku: Sku,
    pub variant_sku: Sku,
    pub data: CartItemInput,
}

impl ConfigurableCartItemInput {
    /// Build the input for one configurable variant line. The `data` block
    /// carries the variant SKU, as the schema requires.
    #[must_use]
    pub fn new(parent_sku: Sku, variant_sku: Sku, quantity: u32) -> Self {
        Self {
            parent_sku,
            data: CartItemInput {
                quantity,
                sku: variant_sku.clone(),
            },
            variant_sku,
        }
    }
}

/// One entry of `updateCartItems.cart_items`.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemUpdateInput {
    pub cart_item_id: CartItemId,
    pub quantity: u32,
}

/// Input for `createCustomerV2`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerInput {
    pub email: Email,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

/// Input for `updateCustomerV2`. Only profile fields - email and password
/// changes go through their dedicated mutations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

// =============================================================================
// Response Data
// =============================================================================

/// A cart as it appears on the wire.
#[derive(Debug, Deserialize)]
pub struct CartData {
    pub id: String,
    #[serde(default)]
    pub items: Vec<CartItemData>,
    #[serde(default)]
    pub applied_coupons: Option<Vec<CouponData>>,
    pub prices: Option<CartPricesData>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemData {
    /// Line item id; the schema types this as a string even though the
    /// backend assigns numeric ids.
    #[serde(deserialize_with = "de_i64_lenient")]
    pub id: i64,
    /// Quantity; the schema types this as a float.
    #[serde(deserialize_with = "de_u32_lenient")]
    pub quantity: u32,
    pub product: ProductData,
    pub prices: Option<ItemPricesData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub type_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CouponData {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CartPricesData {
    pub grand_total: Option<MoneyData>,
}

#[derive(Debug, Deserialize)]
pub struct ItemPricesData {
    pub row_total: Option<MoneyData>,
}

#[derive(Debug, Deserialize)]
pub struct MoneyData {
    pub value: f64,
    pub currency: String,
}

/// A customer profile as it appears on the wire.
#[derive(Debug, Deserialize)]
pub struct CustomerData {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    #[serde(default)]
    pub is_subscribed: Option<bool>,
    pub created_at: Option<String>,
}

// =============================================================================
// Conversions
// =============================================================================

impl TryFrom<CartData> for Cart {
    type Error = CommerceError;

    fn try_from(data: CartData) -> Result<Self, Self::Error> {
        let items = data
            .items
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let applied_coupon = data
            .applied_coupons
            .and_then(|coupons| coupons.into_iter().next())
            .map(|coupon| Coupon::new(coupon.code));

        let grand_total = data
            .prices
            .and_then(|prices| prices.grand_total)
            .map(Money::try_from)
            .transpose()?;

        Ok(Self {
            id: CartId::new(data.id),
            items,
            applied_coupon,
            grand_total,
        })
    }
}

impl TryFrom<CartItemData> for CartItem {
    type Error = CommerceError;

    fn try_from(data: CartItemData) -> Result<Self, Self::Error> {
        let sku = Sku::new(data.product.sku);
        let kind = ProductKind::from_type_id(&data.product.type_id, &sku).ok_or_else(|| {
            CommerceError::UnexpectedResponse(format!(
                "unknown product type_id '{}'",
                data.product.type_id
            ))
        })?;

        let row_total = data
            .prices
            .and_then(|prices| prices.row_total)
            .map(Money::try_from)
            .transpose()?;

        Ok(Self {
            id: CartItemId::new(data.id),
            product_id: ProductId::new(data.product.id),
            sku,
            name: data.product.name,
            kind,
            quantity: data.quantity,
            row_total,
        })
    }
}

impl TryFrom<MoneyData> for Money {
    type Error = CommerceError;

    fn try_from(data: MoneyData) -> Result<Self, Self::Error> {
        let amount = Decimal::try_from(data.value).map_err(|e| {
            CommerceError::UnexpectedResponse(format!("bad money value {}: {e}", data.value))
        })?;
        let currency = data.currency.parse::<CurrencyCode>().map_err(|e| {
            CommerceError::UnexpectedResponse(e.to_string())
        })?;
        Ok(Self::new(amount, currency))
    }
}

impl From<CustomerData> for Customer {
    fn from(data: CustomerData) -> Self {
        Self {
            id: data.id.map(CustomerId::new),
            // The backend validated the address; a parse failure here would
            // only drop the field, not the profile.
            email: data.email.and_then(|e| Email::parse(&e).ok()),
            firstname: data.firstname,
            lastname: data.lastname,
            is_subscribed: data.is_subscribed.unwrap_or(false),
            created_at: data.created_at.and_then(|raw| {
                NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        }
    }
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

/// Accept an i64 sent either as a number or as a decimal string.
fn de_i64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Accept a u32 sent either as an integer or as a float (`quantity: Float`).
fn de_u32_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "quantity {value} is not a non-negative integer"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(value as u32)
}
