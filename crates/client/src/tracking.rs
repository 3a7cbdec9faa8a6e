//! Mock live order tracking.
//!
//! This is explicitly a simulation, not a transport: a per-order timer task
//! fabricates GPS positions and walks the order status forward, fanning the
//! updates out to the subscriber. There is no socket, no reconnection logic,
//! and no ordering guarantee beyond timer order. The UI treats it exactly
//! like it would treat a real tracking feed, which is the point.
//!
//! A subscription stops itself once the status reaches a terminal state
//! (`delivered` / `cancelled` / `refunded`); dropping or stopping the handle
//! tears the timer down early.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tiffin_core::{OrderId, OrderStatus};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{GeoPoint, TrackingUpdate};

/// Tuning for the tracking simulation.
///
/// Defaults match the production feel (one update every few seconds); tests
/// shrink the tick to milliseconds.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Interval between fabricated updates.
    pub tick: Duration,
    /// How many ticks the order spends in each status before advancing.
    pub ticks_per_stage: u32,
    /// Where the simulated courier starts (the vendor).
    pub origin: GeoPoint,
    /// Where the simulated courier is heading (the customer).
    pub destination: GeoPoint,
    /// ETA shown on the first update; counts down with progress.
    pub initial_eta_minutes: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(3),
            ticks_per_stage: 3,
            origin: GeoPoint {
                lat: 37.7749,
                lng: -122.4194,
            },
            destination: GeoPoint {
                lat: 37.7849,
                lng: -122.4094,
            },
            initial_eta_minutes: 30,
        }
    }
}

/// Factory for per-order tracking subscriptions.
#[derive(Debug, Clone)]
pub struct MockTrackingService {
    config: TrackingConfig,
}

impl MockTrackingService {
    /// Create a service with the given simulation tuning.
    #[must_use]
    pub const fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    /// Start fabricating updates for `order_id`, beginning at
    /// `initial_status`.
    ///
    /// The first update arrives within one tick. The spawned task ends after
    /// emitting a terminal status, or as soon as the subscription is dropped.
    #[must_use]
    pub fn subscribe(
        &self,
        order_id: OrderId,
        initial_status: OrderStatus,
    ) -> TrackingSubscription {
        let (tx, rx) = mpsc::channel(16);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            run_simulation(order_id, initial_status, config, tx).await;
        });

        debug!(order_id = %order_id, "Tracking subscription started");
        TrackingSubscription {
            order_id,
            updates: rx,
            task,
        }
    }
}

/// Handle to a running per-order tracking simulation.
///
/// Receive updates via [`recv`](Self::recv). Dropping the handle closes the
/// channel and the timer task exits on its next tick; [`stop`](Self::stop)
/// tears it down immediately (the `clearInterval` of this world).
#[derive(Debug)]
pub struct TrackingSubscription {
    order_id: OrderId,
    updates: mpsc::Receiver<TrackingUpdate>,
    task: JoinHandle<()>,
}

impl TrackingSubscription {
    /// The order this subscription follows.
    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Wait for the next fabricated update.
    ///
    /// Returns `None` once the simulation has ended (terminal status
    /// reached or subscription stopped).
    pub async fn recv(&mut self) -> Option<TrackingUpdate> {
        self.updates.recv().await
    }

    /// Stop the simulation immediately.
    pub fn stop(self) {
        self.task.abort();
        debug!(order_id = %self.order_id, "Tracking subscription stopped");
    }
}

/// Status progression the simulation walks, in order.
const ROUTE: [OrderStatus; 9] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::ReadyForPickup,
    OrderStatus::TaskerAssigned,
    OrderStatus::PickedUp,
    OrderStatus::InTransit,
    OrderStatus::Arriving,
    OrderStatus::Delivered,
];

/// Index of `status` along [`ROUTE`]; terminal non-delivered statuses map to
/// the end of the route.
fn route_index(status: OrderStatus) -> usize {
    ROUTE
        .iter()
        .position(|s| *s == status)
        .unwrap_or(ROUTE.len() - 1)
}

/// The status one stage further along the route.
fn advance(status: OrderStatus) -> OrderStatus {
    if status.is_terminal() {
        return status;
    }
    let next = (route_index(status) + 1).min(ROUTE.len() - 1);
    ROUTE.get(next).copied().unwrap_or(OrderStatus::Delivered)
}

async fn run_simulation(
    order_id: OrderId,
    initial_status: OrderStatus,
    config: TrackingConfig,
    tx: mpsc::Sender<TrackingUpdate>,
) {
    let mut interval = tokio::time::interval(config.tick);
    let mut status = initial_status;
    let mut ticks_in_stage = 0_u32;

    loop {
        // First tick completes immediately, so subscribers get an update
        // right away.
        interval.tick().await;

        let update = fabricate_update(order_id, status, &config);
        if tx.send(update).await.is_err() {
            // Subscriber went away
            break;
        }

        if status.is_terminal() {
            debug!(order_id = %order_id, status = %status, "Tracking simulation finished");
            break;
        }

        ticks_in_stage += 1;
        if ticks_in_stage >= config.ticks_per_stage {
            status = advance(status);
            ticks_in_stage = 0;
        }
    }
}

/// Build one synthetic update: position interpolated along the route with
/// GPS jitter, ETA scaled down by progress.
fn fabricate_update(
    order_id: OrderId,
    status: OrderStatus,
    config: &TrackingConfig,
) -> TrackingUpdate {
    #[allow(clippy::cast_precision_loss)]
    let progress = route_index(status) as f64 / (ROUTE.len() - 1) as f64;

    let mut rng = rand::rng();
    let jitter_lat = rng.random_range(-0.0005..0.0005);
    let jitter_lng = rng.random_range(-0.0005..0.0005);

    let position = GeoPoint {
        lat: config.origin.lat + (config.destination.lat - config.origin.lat) * progress
            + jitter_lat,
        lng: config.origin.lng + (config.destination.lng - config.origin.lng) * progress
            + jitter_lng,
    };

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let eta_minutes = (f64::from(config.initial_eta_minutes) * (1.0 - progress)).round() as u32;

    TrackingUpdate {
        order_id,
        status,
        position,
        eta_minutes,
        recorded_at: Utc::now(),
    }
}
