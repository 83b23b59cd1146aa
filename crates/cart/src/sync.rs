//! The cart synchronization engine.
//!
//! # Architecture
//!
//! A [`CartSynchronizer`] handle is cheaply cloneable and hands intents to a
//! single background task that owns the [`CartState`]. The task reacts to
//! three kinds of events:
//!
//! - dispatched intents, applied synchronously and optimistically (the UI
//!   never waits on the network to see an edit),
//! - identity transitions from the [`IdentityWatch`] feed (sign-out clears
//!   the cart with no remote I/O; sign-in triggers a remote load), and
//! - timer firings: the save debounce deadline and retry backoff delays.
//!
//! Remote loads and saves run in spawned tasks so the engine stays
//! responsive, and report back through an internal event channel. Every
//! identity transition bumps a generation counter; results that arrive
//! carrying a stale generation are logged and discarded, which is what
//! makes switching accounts mid-retry safe.
//!
//! Saves are debounced: each item change restarts a quiet-period timer and
//! only the last scheduled deadline fires. An empty cart is never saved,
//! and no save is scheduled while a load is in flight, so a slow load can
//! never be overwritten by stale pre-load items.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use pulsefit_core::{CartItem, CartSession, LineId, UserId};

use crate::config::SyncConfig;
use crate::error::{SAVE_FAILED_MESSAGE, load_failure_message};
use crate::identity::IdentityWatch;
use crate::intent::CartIntent;
use crate::retry::retry_linear;
use crate::state::CartState;
use crate::store::{Product, ProductCatalog, RemoteCartStore, StoreError};

/// Handle to the cart engine.
///
/// Constructed once at application start and passed by clone to whatever
/// needs to read or mutate the cart. Dropping every handle stops the
/// background task.
#[derive(Clone)]
pub struct CartSynchronizer {
    inner: Arc<SynchronizerInner>,
}

struct SynchronizerInner {
    intents: mpsc::UnboundedSender<CartIntent>,
    state: watch::Receiver<CartState>,
}

impl CartSynchronizer {
    /// Spawn the engine on the current tokio runtime.
    #[must_use]
    pub fn spawn<S, C>(config: SyncConfig, identity: IdentityWatch, store: S, catalog: C) -> Self
    where
        S: RemoteCartStore,
        C: ProductCatalog,
    {
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(CartState::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let engine = Engine {
            config,
            store,
            catalog,
            identity,
            identity_live: true,
            intents: intents_rx,
            events_tx,
            events_rx,
            state_tx,
            state: CartState::default(),
            current_user: None,
            generation: 0,
            save_deadline: None,
            save_in_flight: false,
            dirty_while_saving: false,
        };
        tokio::spawn(engine.run());

        Self {
            inner: Arc::new(SynchronizerInner {
                intents: intents_tx,
                state: state_rx,
            }),
        }
    }

    /// Dispatch a raw intent. Never blocks and never fails the caller; if
    /// the engine has stopped the intent is dropped with a warning.
    pub fn dispatch(&self, intent: CartIntent) {
        if self.inner.intents.send(intent).is_err() {
            warn!("cart engine stopped; dropping intent");
        }
    }

    /// Add an already-built cart line.
    pub fn add_item(&self, item: CartItem) {
        self.dispatch(CartIntent::AddItem(item));
    }

    /// Add a catalog product, denormalizing title/price/image onto the line.
    pub fn add_product(&self, product: &Product, size: Option<String>, quantity: u32) {
        self.dispatch(CartIntent::AddItem(product.to_cart_item(size, quantity)));
    }

    /// Remove a line. No-op if absent.
    pub fn remove_item(&self, id: LineId) {
        self.dispatch(CartIntent::RemoveItem(id));
    }

    /// Set the quantity of the line matching `(id, size)`.
    pub fn update_quantity(&self, id: LineId, size: Option<String>, quantity: u32) {
        self.dispatch(CartIntent::UpdateQuantity { id, size, quantity });
    }

    /// Empty the cart, keeping the remote session handle.
    pub fn clear_cart(&self) {
        self.dispatch(CartIntent::ClearCart);
    }

    /// Flip cart-drawer visibility.
    pub fn toggle_cart(&self) {
        self.dispatch(CartIntent::ToggleCart);
    }

    /// Checkout finished: empty the cart and drop the session handle in one
    /// published transition. The platform retires the remote record on its
    /// side.
    pub fn complete_checkout(&self) {
        self.dispatch(CartIntent::CompleteCheckout);
    }

    /// Snapshot of the current cart state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes (for reactive rendering).
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<CartState> {
        self.inner.state.clone()
    }
}

/// Result of a spawned load or save task, tagged with the generation that
/// started it.
enum SyncEvent {
    Loaded {
        generation: u64,
        session: CartSession,
        items: Vec<CartItem>,
    },
    LoadFailed {
        generation: u64,
        error: StoreError,
    },
    Saved {
        generation: u64,
    },
    SaveFailed {
        generation: u64,
        error: StoreError,
    },
}

struct Engine<S, C> {
    config: SyncConfig,
    store: S,
    catalog: C,
    identity: IdentityWatch,
    identity_live: bool,
    intents: mpsc::UnboundedReceiver<CartIntent>,
    events_tx: mpsc::UnboundedSender<SyncEvent>,
    events_rx: mpsc::UnboundedReceiver<SyncEvent>,
    state_tx: watch::Sender<CartState>,
    state: CartState,
    current_user: Option<UserId>,
    generation: u64,
    save_deadline: Option<Instant>,
    save_in_flight: bool,
    dirty_while_saving: bool,
}

impl<S: RemoteCartStore, C: ProductCatalog> Engine<S, C> {
    async fn run(mut self) {
        // A user may already be signed in when the engine starts.
        let initial = self.identity.borrow_and_update().clone();
        if initial.is_some() {
            self.on_identity_change(initial);
        }

        loop {
            let deadline = self.save_deadline;
            tokio::select! {
                intent = self.intents.recv() => match intent {
                    Some(intent) => self.on_intent(intent),
                    None => break, // every handle dropped
                },
                changed = self.identity.changed(), if self.identity_live => match changed {
                    Ok(()) => {
                        let user = self.identity.borrow_and_update().clone();
                        self.on_identity_change(user);
                    }
                    Err(_) => {
                        debug!("identity feed closed; no further sign-in/out transitions");
                        self.identity_live = false;
                    }
                },
                Some(event) = self.events_rx.recv() => self.on_event(event),
                () = sleep_until_opt(deadline) => self.on_save_deadline(),
            }
        }
        debug!("cart engine stopped");
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    fn on_intent(&mut self, intent: CartIntent) {
        let is_user_edit = matches!(
            intent,
            CartIntent::AddItem(_)
                | CartIntent::RemoveItem(_)
                | CartIntent::UpdateQuantity { .. }
                | CartIntent::ClearCart
                | CartIntent::CompleteCheckout
        );
        let items_before = self.state.items.clone();
        self.state.apply(intent);
        if is_user_edit && self.state.items != items_before {
            self.schedule_save();
        }
        self.publish_state();
    }

    fn on_identity_change(&mut self, user: Option<UserId>) {
        // Everything still in flight belongs to the previous identity.
        self.generation += 1;
        self.save_deadline = None;
        self.save_in_flight = false;
        self.dirty_while_saving = false;
        self.current_user = user;

        match self.current_user.clone() {
            None => {
                info!("signed out; clearing cart locally");
                self.state.apply(CartIntent::ClearCart);
                self.state.apply(CartIntent::SetSession(None));
                self.state.apply(CartIntent::SetLoading(false));
                self.publish_state();
            }
            Some(user) => {
                info!(user = %user, "signed in; loading remote cart");
                self.state.apply(CartIntent::SetLoading(true));
                self.publish_state();
                self.spawn_load(user);
            }
        }
    }

    fn schedule_save(&mut self) {
        if self.current_user.is_none() {
            debug!("not scheduling save: signed out");
            return;
        }
        if self.state.loading {
            debug!("not scheduling save: load in flight");
            return;
        }
        if self.state.items.is_empty() {
            // Never replace the remote line set with emptiness; clearing
            // happens through checkout or the platform's own lifecycle.
            self.save_deadline = None;
            debug!("not scheduling save: cart empty");
            return;
        }
        if self.save_in_flight {
            self.dirty_while_saving = true;
            return;
        }
        self.save_deadline = Some(Instant::now() + self.config.debounce);
    }

    fn on_save_deadline(&mut self) {
        self.save_deadline = None;
        let Some(user) = self.current_user.clone() else {
            return;
        };
        if self.state.loading {
            debug!("skipping save: load in flight");
            return;
        }
        if self.state.items.is_empty() {
            debug!("skipping save: cart empty");
            return;
        }
        if self.save_in_flight {
            self.dirty_while_saving = true;
            return;
        }

        self.save_in_flight = true;
        let store = self.store.clone();
        let events = self.events_tx.clone();
        let generation = self.generation;
        let attempts = self.config.retry_attempts;
        let base_delay = self.config.retry_base_delay;
        let items = self.state.items.clone();
        tokio::spawn(async move {
            let result = retry_linear(attempts, base_delay, "cart save", || {
                let store = store.clone();
                let user = user.clone();
                let items = items.clone();
                async move { store.replace_items(&user, &items).await }
            })
            .await;
            let event = match result {
                Ok(()) => SyncEvent::Saved { generation },
                Err(error) => SyncEvent::SaveFailed { generation, error },
            };
            let _ = events.send(event);
        });
    }

    fn spawn_load(&self, user: UserId) {
        let store = self.store.clone();
        let catalog = self.catalog.clone();
        let events = self.events_tx.clone();
        let generation = self.generation;
        let attempts = self.config.retry_attempts;
        let base_delay = self.config.retry_base_delay;
        tokio::spawn(async move {
            let result = retry_linear(attempts, base_delay, "cart load", || {
                let store = store.clone();
                let catalog = catalog.clone();
                let user = user.clone();
                async move { load_once(&store, &catalog, &user).await }
            })
            .await;
            let event = match result {
                Ok((session, items)) => SyncEvent::Loaded {
                    generation,
                    session,
                    items,
                },
                Err(error) => SyncEvent::LoadFailed { generation, error },
            };
            let _ = events.send(event);
        });
    }

    fn on_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Loaded {
                generation,
                session,
                items,
            } => {
                if generation != self.generation {
                    debug!("discarding load result from a previous identity");
                    return;
                }
                debug!(lines = items.len(), "remote cart loaded");
                self.state.apply(CartIntent::SetSession(Some(session)));
                self.state.apply(CartIntent::Hydrate(items));
                self.state.apply(CartIntent::SetError(None));
                self.state.apply(CartIntent::SetLoading(false));
                self.publish_state();
            }
            SyncEvent::LoadFailed { generation, error } => {
                if generation != self.generation {
                    debug!("discarding load failure from a previous identity");
                    return;
                }
                warn!(%error, "cart load failed after retries; keeping local items");
                self.state
                    .apply(CartIntent::SetError(Some(load_failure_message(&error).to_string())));
                self.state.apply(CartIntent::SetLoading(false));
                self.publish_state();
            }
            SyncEvent::Saved { generation } => {
                if generation != self.generation {
                    debug!("discarding save result from a previous identity");
                    return;
                }
                self.save_in_flight = false;
                debug!("remote cart saved");
                self.state.apply(CartIntent::SetError(None));
                self.publish_state();
                if std::mem::take(&mut self.dirty_while_saving) {
                    self.schedule_save();
                }
            }
            SyncEvent::SaveFailed { generation, error } => {
                if generation != self.generation {
                    debug!("discarding save failure from a previous identity");
                    return;
                }
                self.save_in_flight = false;
                warn!(%error, "cart save failed after retries; local edits kept");
                self.state
                    .apply(CartIntent::SetError(Some(SAVE_FAILED_MESSAGE.to_string())));
                self.publish_state();
                if std::mem::take(&mut self.dirty_while_saving) {
                    self.schedule_save();
                }
            }
        }
    }
}

/// One full load attempt: reachability probe, fetch-or-create the cart
/// record, list its lines, and hydrate them through the catalog. Lines
/// whose product no longer resolves are dropped silently.
async fn load_once<S: RemoteCartStore, C: ProductCatalog>(
    store: &S,
    catalog: &C,
    user: &UserId,
) -> Result<(CartSession, Vec<CartItem>), StoreError> {
    store.ping().await?;

    let record = match store.get_active_cart(user).await? {
        Some(record) => record,
        None => {
            debug!(user = %user, "no active remote cart; creating one");
            store.create_cart(user).await?
        }
    };

    let lines = store.list_items(&record.id).await?;
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        match catalog.product(&line.product_id).await? {
            Some(product) => items.push(product.hydrate_line(line)),
            None => debug!(product = %line.product_id, "dropping line with unresolvable product"),
        }
    }

    Ok((record.into_session(), items))
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
