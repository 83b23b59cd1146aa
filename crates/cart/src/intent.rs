//! Mutation intents accepted by the cart.
//!
//! Every change to [`crate::state::CartState`] flows through exactly one of
//! these variants, matched exhaustively by the reducer. The first six are
//! the user-facing surface; the remaining variants are bookkeeping used by
//! the reconciliation logic and are not meant to be dispatched by UI code.

use pulsefit_core::{CartItem, CartSession, LineId};

/// A single cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartIntent {
    /// Add an item. If a line with the same `(product, size)` pair exists,
    /// its quantity is incremented by the incoming quantity; otherwise a new
    /// line is appended. Always succeeds against local state.
    AddItem(CartItem),

    /// Remove the line with the given ID. No-op if absent.
    RemoveItem(LineId),

    /// Set the quantity of the line matching `(id, size)`. Quantity is
    /// clamped to a minimum of 1; removal is an explicit `RemoveItem`.
    UpdateQuantity {
        id: LineId,
        size: Option<String>,
        quantity: u32,
    },

    /// Empty the item list and clear any error. Keeps the remote session
    /// handle; the remote line set is left untouched (an empty cart is
    /// never pushed).
    ClearCart,

    /// Flip cart-drawer visibility. Purely presentational.
    ToggleCart,

    /// Checkout finished: empty the items, clear any error, and drop the
    /// session handle, all in one state transition. Watchers never observe
    /// an emptied cart that still carries the retired session.
    CompleteCheckout,

    /// Bookkeeping: attach or drop the remote session handle.
    SetSession(Option<CartSession>),

    /// Bookkeeping: set or clear the user-facing sync error.
    SetError(Option<String>),

    /// Bookkeeping: mark a remote load as in flight or settled.
    SetLoading(bool),

    /// Bookkeeping: replace the item list with freshly hydrated remote state.
    Hydrate(Vec<CartItem>),
}
