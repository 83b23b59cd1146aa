//! Cart data model shared between the synchronization engine and its callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{CartSessionId, LineId, ProductId};
use crate::types::price::Price;
use crate::types::status::CartSessionStatus;

/// One line in the cart, keyed by product + variant.
///
/// `title`, `price`, and `image` are denormalized from the catalog at add
/// time so the cart renders without further lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique identifier for this line (distinct from the product ID when
    /// the same product appears with different variant selections).
    pub id: LineId,
    /// Identifier of the underlying purchasable product.
    pub product_id: ProductId,
    /// Display name, denormalized at add time.
    pub title: String,
    /// Unit price, denormalized at add time.
    pub price: Price,
    /// Positive line quantity.
    pub quantity: u32,
    /// Product image URL, if the catalog has one.
    pub image: Option<String>,
    /// Variant discriminator; combined with `product_id` to decide whether
    /// an add merges into an existing line or creates a new one.
    pub size: Option<String>,
}

impl CartItem {
    /// Create a new line with a freshly minted line ID.
    ///
    /// Quantity below 1 is clamped; a line never exists with zero quantity.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        title: impl Into<String>,
        price: Price,
        quantity: u32,
        image: Option<String>,
        size: Option<String>,
    ) -> Self {
        Self {
            id: LineId::new(uuid::Uuid::new_v4().to_string()),
            product_id,
            title: title.into(),
            price,
            quantity: quantity.max(1),
            image,
            size,
        }
    }

    /// Whether another line refers to the same `(product, size)` pair.
    ///
    /// Two lines with the same merge key must never coexist in a cart;
    /// adding a matching item increments the existing line's quantity.
    #[must_use]
    pub fn same_variant(&self, other: &Self) -> bool {
        self.product_id == other.product_id && self.size == other.size
    }

    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::new(
            self.price.amount * rust_decimal::Decimal::from(self.quantity),
            self.price.currency_code,
        )
    }
}

/// Opaque handle to the remote cart record for the active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSession {
    /// Platform-issued cart identifier.
    pub id: CartSessionId,
    /// Lifecycle status of the remote record.
    pub status: CartSessionStatus,
    /// When the platform created the record.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::CurrencyCode;

    fn item(product: &str, size: Option<&str>) -> CartItem {
        CartItem {
            id: LineId::new(format!("line-{product}")),
            product_id: ProductId::new(product),
            title: "Resistance Band Set".to_string(),
            price: Price::from_cents(2450, CurrencyCode::USD),
            quantity: 3,
            image: None,
            size: size.map(String::from),
        }
    }

    #[test]
    fn test_same_variant_requires_product_and_size() {
        let a = item("prd_1", Some("M"));
        let b = item("prd_1", Some("M"));
        let c = item("prd_1", Some("L"));
        let d = item("prd_2", Some("M"));
        assert!(a.same_variant(&b));
        assert!(!a.same_variant(&c));
        assert!(!a.same_variant(&d));
    }

    #[test]
    fn test_sizeless_items_merge_by_product() {
        let a = item("prd_1", None);
        let b = item("prd_1", None);
        assert!(a.same_variant(&b));
    }

    #[test]
    fn test_new_mints_unique_ids_and_clamps_quantity() {
        let a = CartItem::new(
            ProductId::new("prd_1"),
            "Foam Roller",
            Price::from_cents(1800, CurrencyCode::USD),
            0,
            None,
            None,
        );
        let b = CartItem::new(
            ProductId::new("prd_1"),
            "Foam Roller",
            Price::from_cents(1800, CurrencyCode::USD),
            2,
            None,
            None,
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.quantity, 1);
        assert_eq!(b.quantity, 2);
    }

    #[test]
    fn test_line_total() {
        let a = item("prd_1", None);
        assert_eq!(a.line_total().display(), "$73.50");
    }
}
