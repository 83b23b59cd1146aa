//! In-memory store and catalog for tests and the CLI simulator.
//!
//! Records every call (with virtual timestamps) and supports failure
//! injection, so the synchronizer's retry, debounce, and cancellation
//! behavior can be asserted without a network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::time::Instant;

use pulsefit_core::{CartItem, CartSessionId, CartSessionStatus, ProductId, UserId};

use crate::store::{CartRecord, LineRecord, Product, ProductCatalog, RemoteCartStore, StoreError};

/// One recorded store call.
#[derive(Debug, Clone)]
pub struct Call {
    /// Operation name (`ping`, `get_active_cart`, ...).
    pub op: &'static str,
    /// Tokio instant at which the call arrived (virtual under paused time).
    pub at: Instant,
}

#[derive(Default)]
struct MemoryInner {
    carts: HashMap<UserId, CartRecord>,
    lines: HashMap<CartSessionId, Vec<LineRecord>>,
    products: HashMap<ProductId, Product>,
    calls: Vec<Call>,
    fail_remaining: u32,
    fail_all: bool,
    next_cart: u64,
}

/// In-memory implementation of [`RemoteCartStore`] and [`ProductCatalog`].
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a catalog product.
    pub fn insert_product(&self, product: Product) {
        self.lock().products.insert(product.id.clone(), product);
    }

    /// Remove a catalog product, leaving any persisted lines dangling.
    pub fn remove_product(&self, id: &ProductId) {
        self.lock().products.remove(id);
    }

    /// Fail every subsequent call until [`recover`](Self::recover).
    pub fn fail_all(&self) {
        self.lock().fail_all = true;
    }

    /// Fail exactly the next `n` calls, then behave normally.
    pub fn fail_next(&self, n: u32) {
        self.lock().fail_remaining = n;
    }

    /// Stop injected failures.
    pub fn recover(&self) {
        let mut inner = self.lock();
        inner.fail_all = false;
        inner.fail_remaining = 0;
    }

    /// All recorded calls, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls for one operation.
    #[must_use]
    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.op == op).count()
    }

    /// Persisted lines for a cart, if it exists.
    #[must_use]
    pub fn persisted_lines(&self, cart: &CartSessionId) -> Option<Vec<LineRecord>> {
        self.lock().lines.get(cart).cloned()
    }

    /// The user's active cart record, bypassing call recording.
    #[must_use]
    pub fn cart_for(&self, user: &UserId) -> Option<CartRecord> {
        self.lock().carts.get(user).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a call and consume one injected failure if armed.
    fn enter(&self, op: &'static str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(Call {
            op,
            at: Instant::now(),
        });
        if inner.fail_all {
            return Err(StoreError::Unreachable("injected failure".to_string()));
        }
        if inner.fail_remaining > 0 {
            inner.fail_remaining -= 1;
            return Err(StoreError::Unreachable("injected failure".to_string()));
        }
        Ok(())
    }

    fn get_or_create_cart(&self, user: &UserId) -> CartRecord {
        let mut inner = self.lock();
        if let Some(record) = inner.carts.get(user) {
            return record.clone();
        }
        inner.next_cart += 1;
        let record = CartRecord {
            id: CartSessionId::new(format!("cart_{}", inner.next_cart)),
            status: CartSessionStatus::Active,
            created_at: Utc::now(),
        };
        inner.carts.insert(user.clone(), record.clone());
        inner.lines.insert(record.id.clone(), Vec::new());
        record
    }
}

impl RemoteCartStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.enter("ping")
    }

    async fn get_active_cart(&self, user: &UserId) -> Result<Option<CartRecord>, StoreError> {
        self.enter("get_active_cart")?;
        Ok(self
            .lock()
            .carts
            .get(user)
            .filter(|r| r.status.is_active())
            .cloned())
    }

    async fn create_cart(&self, user: &UserId) -> Result<CartRecord, StoreError> {
        self.enter("create_cart")?;
        Ok(self.get_or_create_cart(user))
    }

    async fn list_items(&self, cart: &CartSessionId) -> Result<Vec<LineRecord>, StoreError> {
        self.enter("list_items")?;
        self.lock()
            .lines
            .get(cart)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("cart {cart}")))
    }

    async fn replace_items(&self, user: &UserId, items: &[CartItem]) -> Result<(), StoreError> {
        self.enter("replace_items")?;
        let record = self.get_or_create_cart(user);
        let lines = items.iter().map(LineRecord::from).collect();
        self.lock().lines.insert(record.id, lines);
        Ok(())
    }
}

impl ProductCatalog for InMemoryStore {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.enter("product")?;
        Ok(self.lock().products.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsefit_core::{CurrencyCode, Price};

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(2000, CurrencyCode::USD),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_lazy_cart_creation_and_round_trip() {
        let store = InMemoryStore::new();
        let user = UserId::new("usr_1");

        assert!(
            store
                .get_active_cart(&user)
                .await
                .expect("reachable")
                .is_none()
        );

        let record = store.create_cart(&user).await.expect("created");
        let item = product("prd_1").to_cart_item(Some("M".to_string()), 2);
        store.replace_items(&user, &[item]).await.expect("saved");

        let lines = store.list_items(&record.id).await.expect("listed");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].size.as_deref(), Some("M"));
    }

    #[tokio::test]
    async fn test_fail_next_consumes_then_recovers() {
        let store = InMemoryStore::new();
        store.fail_next(2);
        assert!(store.ping().await.is_err());
        assert!(store.ping().await.is_err());
        assert!(store.ping().await.is_ok());
        assert_eq!(store.call_count("ping"), 3);
    }

    #[tokio::test]
    async fn test_fail_all_until_recover() {
        let store = InMemoryStore::new();
        store.fail_all();
        assert!(store.ping().await.is_err());
        store.recover();
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_catalog_lookup_miss() {
        let store = InMemoryStore::new();
        store.insert_product(product("prd_1"));
        assert!(
            store
                .product(&ProductId::new("prd_1"))
                .await
                .expect("reachable")
                .is_some()
        );
        assert!(
            store
                .product(&ProductId::new("prd_missing"))
                .await
                .expect("reachable")
                .is_none()
        );
    }
}
