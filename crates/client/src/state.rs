//! Application state shared across UI screens.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::storage::OfflineStore;
use crate::stores::{CartStore, OrdersStore};
use crate::tracking::{MockTrackingService, TrackingConfig};

/// Application state shared across all screens.
///
/// Cheaply cloneable via `Arc`; hand a clone to anything that needs the
/// stores or services. Construction wires persistence through every store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    offline: OfflineStore,
    cart: CartStore,
    orders: OrdersStore,
    tracking: MockTrackingService,
    api: ApiClient,
}

impl AppState {
    /// Create application state with file-backed offline storage under
    /// `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let offline = OfflineStore::on_disk(&config.data_dir)?;
        Ok(Self::with_offline(config, offline))
    }

    /// Create application state over an explicit offline store. Used by
    /// tests with an in-memory backend.
    #[must_use]
    pub fn with_offline(config: ClientConfig, offline: OfflineStore) -> Self {
        let cart = CartStore::with_persistence(offline.clone());
        let orders = OrdersStore::with_persistence(offline.clone());
        let tracking = MockTrackingService::new(TrackingConfig {
            tick: config.tracking_tick,
            ..TrackingConfig::default()
        });
        let api = ApiClient::with_persistence(&config, offline.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                offline,
                cart,
                orders,
                tracking,
                api,
            }),
        }
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the offline storage layer.
    #[must_use]
    pub fn offline(&self) -> &OfflineStore {
        &self.inner.offline
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the orders store.
    #[must_use]
    pub fn orders(&self) -> &OrdersStore {
        &self.inner.orders
    }

    /// Get a reference to the mock tracking service.
    #[must_use]
    pub fn tracking(&self) -> &MockTrackingService {
        &self.inner.tracking
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}
