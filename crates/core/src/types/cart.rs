//! The cart domain model.
//!
//! A cart is owned either by a guest session (its id persisted client-side)
//! or by a customer (resolved server-side from the auth token). The model is
//! the same in both modes; ownership is a property of how the id was
//! obtained, not of the data.

use serde::{Deserialize, Serialize};

use super::id::{CartId, CartItemId, CouponCode, ProductId, Sku};
use super::money::Money;
use super::product::ProductKind;

/// A shopping cart as returned by the commerce API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Masked cart id.
    pub id: CartId,
    /// Line items, in the order the backend reports them.
    pub items: Vec<CartItem>,
    /// Coupon currently applied to the cart, if any.
    pub applied_coupon: Option<Coupon>,
    /// Grand total including discounts and taxes.
    pub grand_total: Option<Money>,
}

impl Cart {
    /// An empty cart with the given id.
    #[must_use]
    pub const fn empty(id: CartId) -> Self {
        Self {
            id,
            items: Vec::new(),
            applied_coupon: None,
            grand_total: None,
        }
    }

    /// Find a line item by the product it references.
    #[must_use]
    pub fn find_item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Whether the cart has a line item for the given product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find_item(product_id).is_some()
    }

    /// Total quantity across all line items.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A single cart line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line item id, used for removal and quantity updates.
    pub id: CartItemId,
    /// Catalog id of the referenced product.
    pub product_id: ProductId,
    /// SKU of the line (the variant SKU for configurables).
    pub sku: Sku,
    /// Display name.
    pub name: String,
    /// Kind of the referenced product.
    pub kind: ProductKind,
    /// Quantity of this line.
    pub quantity: u32,
    /// Row total for the line, when priced.
    pub row_total: Option<Money>,
}

/// A coupon applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// The code the customer entered.
    pub code: CouponCode,
}

impl Coupon {
    /// Create a coupon from a code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: CouponCode::new(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, product_id: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(product_id),
            sku: Sku::new(format!("SKU-{product_id}")),
            name: format!("Product {product_id}"),
            kind: ProductKind::Simple,
            quantity,
            row_total: None,
        }
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty(CartId::new("abc123"));
        assert!(cart.items.is_empty());
        assert!(cart.applied_coupon.is_none());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_find_item_by_product() {
        let mut cart = Cart::empty(CartId::new("abc123"));
        cart.items.push(item(1, 10, 2));
        cart.items.push(item(2, 20, 1));

        let found = cart.find_item(ProductId::new(20)).map(|i| i.id);
        assert_eq!(found, Some(CartItemId::new(2)));
        assert!(cart.find_item(ProductId::new(99)).is_none());
    }

    #[test]
    fn test_contains_and_total_quantity() {
        let mut cart = Cart::empty(CartId::new("abc123"));
        cart.items.push(item(1, 10, 2));
        cart.items.push(item(2, 20, 3));

        assert!(cart.contains(ProductId::new(10)));
        assert!(!cart.contains(ProductId::new(30)));
        assert_eq!(cart.total_quantity(), 5);
    }
}
