//! Cart store: line items scoped to a single vendor.
//!
//! The cart holds at most one vendor at a time. Adding an item from a
//! different vendor silently replaces the entire cart with the new single
//! item - no prompt, no merge. That is a deliberate product simplification,
//! not an accident; see the tests pinning it.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tiffin_core::{CartLineId, CurrencyCode, Price};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::{CartItem, OrderTotals, Vendor};
use crate::storage::{OfflineStore, keys};

/// Immutable view of the cart published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub vendor: Option<Vendor>,
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
}

impl CartSnapshot {
    fn empty() -> Self {
        let zero = Price::zero(CurrencyCode::default());
        Self {
            vendor: None,
            items: Vec::new(),
            totals: OrderTotals {
                subtotal: zero,
                delivery_fee: zero,
                total: zero,
            },
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Cart state container.
///
/// Cheap to clone; all clones share state. Every mutation recomputes the
/// totals, publishes a snapshot, and (when constructed with persistence)
/// writes the snapshot under the `cart-storage` key.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: Mutex<CartSnapshot>,
    tx: watch::Sender<CartSnapshot>,
    persistence: Option<OfflineStore>,
}

impl CartStore {
    /// Create an empty, non-persisted cart store.
    #[must_use]
    pub fn new() -> Self {
        Self::build(CartSnapshot::empty(), None)
    }

    /// Create a cart store that hydrates from and persists to `offline`.
    ///
    /// A corrupt or absent persisted blob falls back to an empty cart.
    #[must_use]
    pub fn with_persistence(offline: OfflineStore) -> Self {
        let initial = match offline.get::<CartSnapshot>(keys::CART) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => CartSnapshot::empty(),
            Err(e) => {
                warn!(error = %e, "Failed to hydrate cart, starting empty");
                CartSnapshot::empty()
            }
        };
        Self::build(initial, Some(offline))
    }

    fn build(initial: CartSnapshot, persistence: Option<OfflineStore>) -> Self {
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            inner: Arc::new(CartStoreInner {
                state: Mutex::new(initial),
                tx,
                persistence,
            }),
        }
    }

    /// Add an item from `vendor` to the cart.
    ///
    /// If the cart currently belongs to a different vendor, its contents are
    /// replaced with this single item. If a line for the same product already
    /// exists, its quantity is incremented instead of appending a duplicate.
    /// A zero-quantity item is ignored; lines always hold a positive
    /// quantity.
    pub fn add_item(&self, item: CartItem, vendor: Vendor) {
        if item.quantity == 0 {
            debug!(product_id = %item.product_id, "Ignoring zero-quantity add");
            return;
        }
        self.mutate(|state| {
            let same_vendor = state.vendor.as_ref().is_some_and(|v| v.id == vendor.id);
            if !same_vendor && !state.items.is_empty() {
                debug!(vendor = %vendor.id, "Cart switched vendors, replacing contents");
                state.items.clear();
            }
            state.vendor = Some(vendor);

            if let Some(line) = state
                .items
                .iter_mut()
                .find(|l| l.product_id == item.product_id)
            {
                line.quantity += item.quantity;
            } else {
                state.items.push(item);
            }
        });
    }

    /// Remove the line with `id`. Removing an absent line is a no-op.
    pub fn remove_item(&self, id: CartLineId) {
        self.mutate(|state| {
            state.items.retain(|l| l.id != id);
        });
    }

    /// Set the quantity of the line with `id`. A quantity of zero removes
    /// the line.
    pub fn update_quantity(&self, id: CartLineId, quantity: u32) {
        self.mutate(|state| {
            if quantity == 0 {
                state.items.retain(|l| l.id != id);
            } else if let Some(line) = state.items.iter_mut().find(|l| l.id == id) {
                line.quantity = quantity;
            }
        });
    }

    /// Replace the cart's vendor without touching the items.
    ///
    /// Used when vendor details (open state, fees) are refreshed from the
    /// backend while the cart is live.
    pub fn set_vendor(&self, vendor: Vendor) {
        self.mutate(|state| {
            state.vendor = Some(vendor);
        });
    }

    /// Empty the cart and clear the vendor.
    pub fn clear(&self) {
        self.mutate(|state| {
            state.items.clear();
        });
    }

    /// Whether checkout is currently allowed.
    ///
    /// True iff the cart is non-empty, the subtotal meets the vendor's
    /// minimum order, the vendor is open, and every line is available.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        let state = self.snapshot();
        let Some(vendor) = &state.vendor else {
            return false;
        };
        !state.items.is_empty()
            && vendor.is_open
            && state.totals.subtotal.amount >= vendor.minimum_order.amount
            && state.items.iter().all(|l| l.is_available)
    }

    /// Current snapshot of the cart.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner
            .state
            .lock()
            .map_or_else(|p| p.into_inner().clone(), |s| s.clone())
    }

    /// Subscribe to cart snapshots. The receiver observes the current value
    /// immediately and every mutation after.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Apply a mutation, recompute derived fields, publish, persist.
    fn mutate(&self, f: impl FnOnce(&mut CartSnapshot)) {
        let snapshot = {
            let mut state = match self.inner.state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            f(&mut state);

            // An emptied cart no longer belongs to any vendor.
            if state.items.is_empty() {
                state.vendor = None;
            }
            state.totals = compute_totals(&state);
            state.clone()
        };

        // Publish even with no receivers; send_replace never fails.
        self.inner.tx.send_replace(snapshot.clone());

        if let Some(offline) = &self.inner.persistence
            && let Err(e) = offline.set(keys::CART, &snapshot)
        {
            warn!(error = %e, "Failed to persist cart snapshot");
        }
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Recompute subtotal, delivery fee, and total from the lines and vendor.
fn compute_totals(state: &CartSnapshot) -> OrderTotals {
    let currency = state
        .items
        .first()
        .map_or_else(CurrencyCode::default, |l| l.price.currency_code);

    let subtotal = state
        .items
        .iter()
        .fold(Price::zero(currency), |acc, l| acc + l.line_total());

    let delivery_fee = if state.items.is_empty() {
        Price::zero(currency)
    } else {
        state
            .vendor
            .as_ref()
            .map_or_else(|| Price::zero(currency), |v| v.delivery_fee)
    };

    OrderTotals {
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
    }
}
