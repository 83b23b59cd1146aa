//! In-memory cart state and its reducer.
//!
//! `CartState` is the single authoritative snapshot of "what is in the cart
//! right now". It is owned exclusively by the synchronizer task; everything
//! else observes clones through a watch channel and mutates only by
//! dispatching [`CartIntent`]s.

use rust_decimal::Decimal;

use pulsefit_core::{CartItem, CartSession, CurrencyCode, Price};

use crate::intent::CartIntent;

/// Authoritative client-side cart snapshot.
///
/// Never serialized: snapshots only cross in-process watch channels. The
/// wire shapes live in [`crate::store`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    /// Cart lines in insertion order (meaningful for display only).
    pub items: Vec<CartItem>,
    /// Whether the cart drawer is visible. Purely presentational.
    pub is_open: bool,
    /// True while a remote load is in flight.
    pub loading: bool,
    /// Last user-facing synchronization failure, cleared on next success.
    pub error: Option<String>,
    /// Handle to the remote cart record, if one has been established.
    pub session: Option<CartSession>,
}

impl CartState {
    /// Total quantity across all lines (for the cart badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals. Uses the first line's currency; an empty cart
    /// reports zero in the default currency.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or(CurrencyCode::default(), |i| i.price.currency_code);
        let amount = self
            .items
            .iter()
            .map(|i| i.price.amount * Decimal::from(i.quantity))
            .sum();
        Price::new(amount, currency)
    }

    /// Apply one intent. Infallible: intents that reference absent lines
    /// are no-ops, never errors.
    pub fn apply(&mut self, intent: CartIntent) {
        match intent {
            CartIntent::AddItem(incoming) => self.add_item(incoming),
            CartIntent::RemoveItem(id) => self.items.retain(|i| i.id != id),
            CartIntent::UpdateQuantity { id, size, quantity } => {
                // Clamped here rather than left to the caller, so a direct
                // dispatch with 0 cannot produce a zero-quantity line.
                let quantity = quantity.max(1);
                if let Some(item) = self
                    .items
                    .iter_mut()
                    .find(|i| i.id == id && i.size == size)
                {
                    item.quantity = quantity;
                }
            }
            CartIntent::ClearCart => {
                self.items.clear();
                self.error = None;
            }
            CartIntent::ToggleCart => self.is_open = !self.is_open,
            CartIntent::CompleteCheckout => {
                self.items.clear();
                self.error = None;
                self.session = None;
            }
            CartIntent::SetSession(session) => self.session = session,
            CartIntent::SetError(error) => self.error = error,
            CartIntent::SetLoading(loading) => self.loading = loading,
            CartIntent::Hydrate(items) => self.items = items,
        }
    }

    fn add_item(&mut self, incoming: CartItem) {
        match self.items.iter_mut().find(|i| i.same_variant(&incoming)) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(incoming.quantity);
            }
            None => self.items.push(incoming),
        }
    }
}
