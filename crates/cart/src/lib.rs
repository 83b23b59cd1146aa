//! Pulsefit Cart - client-side cart state and remote synchronization.
//!
//! Owns the authoritative in-memory cart, applies mutations optimistically,
//! and keeps the hosted platform's cart record eventually consistent with
//! local state under retries, debounced writes, and identity transitions.
//!
//! # Example
//!
//! ```rust,no_run
//! use pulsefit_cart::{CartSynchronizer, IdentityProvider, SyncConfig};
//! use pulsefit_cart::store::memory::InMemoryStore;
//! use pulsefit_core::UserId;
//!
//! # async fn demo() {
//! let identity = IdentityProvider::new();
//! let store = InMemoryStore::new();
//! let cart = CartSynchronizer::spawn(
//!     SyncConfig::default(),
//!     identity.subscribe(),
//!     store.clone(),
//!     store,
//! );
//!
//! identity.sign_in(UserId::new("usr_1"));
//! // ... dispatch cart edits; reads go through cart.state() / cart.watch()
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod identity;
pub mod intent;
mod retry;
pub mod state;
pub mod store;
pub mod sync;

pub use config::{ConfigError, PlatformConfig, SyncConfig};
pub use identity::{IdentityProvider, IdentityWatch};
pub use intent::CartIntent;
pub use state::CartState;
pub use store::{Product, ProductCatalog, RemoteCartStore, StoreError};
pub use sync::CartSynchronizer;
