//! Remote cart persistence and product catalog contracts.
//!
//! The synchronizer never talks to the network directly; it drives these
//! traits. [`http::PlatformClient`] implements them against the hosted
//! Pulsefit platform API, and [`memory::InMemoryStore`] implements them
//! in-process for tests and the CLI simulator.
//!
//! Remote state is eventually consistent with local state: the remote cart
//! is a full-replace target, never a source of incremental patches.

pub mod http;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pulsefit_core::{CartItem, CartSession, CartSessionId, CartSessionStatus, Price, ProductId, UserId};

/// Errors that can occur when talking to the remote store or catalog.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform could not be reached at all.
    #[error("platform unreachable: {0}")]
    Unreachable(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl StoreError {
    /// Whether this failure looks like a connectivity problem rather than a
    /// platform-side rejection. Drives which message the user sees.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Unreachable(_))
    }
}

/// Persisted cart record as the platform returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    pub id: CartSessionId,
    pub status: CartSessionStatus,
    pub created_at: DateTime<Utc>,
}

impl CartRecord {
    /// Convert into the opaque session handle held in `CartState`.
    #[must_use]
    pub fn into_session(self) -> CartSession {
        CartSession {
            id: self.id,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// One persisted cart line.
///
/// Only the identity of the line is stored remotely; title, price, and
/// image are re-denormalized from the catalog on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: pulsefit_core::LineId,
    pub product_id: ProductId,
    pub size: Option<String>,
    pub quantity: u32,
}

impl From<&CartItem> for LineRecord {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            product_id: item.product_id.clone(),
            size: item.size.clone(),
            quantity: item.quantity,
        }
    }
}

/// Catalog product used to resolve persisted lines back into cart items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: Option<String>,
}

impl Product {
    /// Build a cart item for this product, minting a fresh line ID and
    /// denormalizing title, price, and image.
    #[must_use]
    pub fn to_cart_item(&self, size: Option<String>, quantity: u32) -> CartItem {
        CartItem::new(
            self.id.clone(),
            self.title.clone(),
            self.price,
            quantity,
            self.image.clone(),
            size,
        )
    }

    /// Rebuild a cart item from a persisted line, keeping the stored line ID.
    #[must_use]
    pub fn hydrate_line(&self, line: LineRecord) -> CartItem {
        CartItem {
            id: line.id,
            product_id: line.product_id,
            title: self.title.clone(),
            price: self.price,
            quantity: line.quantity.max(1),
            image: self.image.clone(),
            size: line.size,
        }
    }
}

/// Remote persistence for the active user's cart.
///
/// Implementations must be cheap to clone (`Arc` internally) because the
/// synchronizer clones them into spawned load and save tasks.
pub trait RemoteCartStore: Clone + Send + Sync + 'static {
    /// Probe basic platform reachability.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetch the user's active cart record, or `None` if they have none.
    fn get_active_cart(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<CartRecord>, StoreError>> + Send;

    /// Create a new empty cart record for the user.
    fn create_cart(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<CartRecord, StoreError>> + Send;

    /// List the persisted lines of a cart.
    fn list_items(
        &self,
        cart: &CartSessionId,
    ) -> impl Future<Output = Result<Vec<LineRecord>, StoreError>> + Send;

    /// Replace the full line set of the user's active cart. Idempotent.
    fn replace_items(
        &self,
        user: &UserId,
        items: &[CartItem],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Product lookup used to resolve persisted lines during hydration.
pub trait ProductCatalog: Clone + Send + Sync + 'static {
    /// Resolve a product by ID. `Ok(None)` means the product no longer
    /// exists; the referencing cart line is dropped silently.
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<Product>, StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsefit_core::CurrencyCode;

    fn product() -> Product {
        Product {
            id: ProductId::new("prd_band"),
            title: "Resistance Band Set".to_string(),
            price: Price::from_cents(2450, CurrencyCode::USD),
            image: Some("https://cdn.pulsefit.app/band.jpg".to_string()),
        }
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("cart-123".to_string());
        assert_eq!(err.to_string(), "Not found: cart-123");

        let err = StoreError::Api {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");
    }

    #[test]
    fn test_connectivity_classification() {
        assert!(StoreError::Unreachable("dns".to_string()).is_connectivity());
        assert!(
            !StoreError::Api {
                status: 500,
                message: String::new()
            }
            .is_connectivity()
        );
        assert!(!StoreError::Parse("bad json".to_string()).is_connectivity());
    }

    #[test]
    fn test_to_cart_item_denormalizes() {
        let item = product().to_cart_item(Some("M".to_string()), 2);
        assert_eq!(item.product_id, ProductId::new("prd_band"));
        assert_eq!(item.title, "Resistance Band Set");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.size.as_deref(), Some("M"));
        assert!(item.image.is_some());
    }

    #[test]
    fn test_hydrate_keeps_line_identity() {
        let p = product();
        let line = LineRecord {
            id: pulsefit_core::LineId::new("line_1"),
            product_id: p.id.clone(),
            size: None,
            quantity: 3,
        };
        let item = p.hydrate_line(line);
        assert_eq!(item.id.as_str(), "line_1");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_hydrate_repairs_zero_quantity() {
        let p = product();
        let line = LineRecord {
            id: pulsefit_core::LineId::new("line_1"),
            product_id: p.id.clone(),
            size: None,
            quantity: 0,
        };
        assert_eq!(p.hydrate_line(line).quantity, 1);
    }

    #[test]
    fn test_line_record_from_item() {
        let item = product().to_cart_item(Some("L".to_string()), 4);
        let line = LineRecord::from(&item);
        assert_eq!(line.product_id, item.product_id);
        assert_eq!(line.size.as_deref(), Some("L"));
        assert_eq!(line.quantity, 4);
    }
}
