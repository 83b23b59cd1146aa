//! Scripted shopping session against an in-memory store.
//!
//! Exercises the full engine end to end on a real clock: sign-in triggers a
//! remote load, edits are applied optimistically and saved after the
//! debounce window, sign-out clears local state. With `--fail-first N` the
//! store rejects the first N remote calls so the retry/backoff path is
//! visible in the logs.

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::info;

use pulsefit_cart::store::Product;
use pulsefit_cart::store::memory::InMemoryStore;
use pulsefit_cart::{CartSynchronizer, ConfigError, IdentityProvider, SyncConfig};
use pulsefit_core::{CurrencyCode, Price, ProductId, UserId};

/// Errors that can occur while running the simulation.
#[derive(Debug, Error)]
pub enum SimulateError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

fn seed_catalog(store: &InMemoryStore) -> Vec<Product> {
    let products = vec![
        Product {
            id: ProductId::new("prd_band"),
            title: "Resistance Band Set".to_string(),
            price: Price::from_cents(2450, CurrencyCode::USD),
            image: Some("https://cdn.pulsefit.app/products/band.jpg".to_string()),
        },
        Product {
            id: ProductId::new("prd_mat"),
            title: "Pro Training Mat".to_string(),
            price: Price::from_cents(3900, CurrencyCode::USD),
            image: Some("https://cdn.pulsefit.app/products/mat.jpg".to_string()),
        },
        Product {
            id: ProductId::new("prd_tee"),
            title: "Pulsefit Training Tee".to_string(),
            price: Price::from_cents(1800, CurrencyCode::USD),
            image: None,
        },
    ];
    for product in &products {
        store.insert_product(product.clone());
    }
    products
}

fn log_state(cart: &CartSynchronizer, label: &str) {
    let state = cart.state();
    info!(
        label,
        lines = state.items.len(),
        count = state.item_count(),
        subtotal = %state.subtotal().display(),
        loading = state.loading,
        error = state.error.as_deref().unwrap_or("-"),
        session = state.session.as_ref().map_or("-", |s| s.id.as_str()),
        "cart"
    );
}

/// Run the scripted session.
///
/// # Errors
///
/// Returns `SimulateError` if the sync configuration fails to load.
pub async fn run(fail_first: u32) -> Result<(), SimulateError> {
    let config = SyncConfig::from_env()?;
    let debounce = config.debounce;

    let identity = IdentityProvider::new();
    let store = InMemoryStore::new();
    let products = seed_catalog(&store);
    let band = products[0].clone();
    let mat = products[1].clone();
    if fail_first > 0 {
        info!(fail_first, "injecting remote failures");
        store.fail_next(fail_first);
    }

    let cart = CartSynchronizer::spawn(config, identity.subscribe(), store.clone(), store.clone());

    info!("signing in");
    identity.sign_in(UserId::new("usr_demo"));
    sleep(Duration::from_millis(500)).await;
    log_state(&cart, "after sign-in");

    info!("adding items");
    cart.add_product(&band, Some("M".to_string()), 1);
    cart.add_product(&band, Some("M".to_string()), 1); // merges into one line
    cart.add_product(&mat, None, 1);
    sleep(Duration::from_millis(100)).await;
    log_state(&cart, "after adds");

    if let Some(line) = cart.state().items.first().cloned() {
        info!(line = %line.id, "bumping quantity");
        cart.update_quantity(line.id, line.size, line.quantity + 1);
    }

    // Let the debounced save (and any retries) land.
    sleep(debounce + Duration::from_secs(4)).await;
    log_state(&cart, "after save window");
    info!(
        saves = store.call_count("replace_items"),
        "remote saves performed"
    );

    info!("signing out");
    identity.sign_out();
    sleep(Duration::from_millis(100)).await;
    log_state(&cart, "after sign-out");

    Ok(())
}
